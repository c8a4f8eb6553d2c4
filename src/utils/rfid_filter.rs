use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Tune these based on real headcounts.
const FILTER_CAPACITY: usize = 50_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static RFID_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn normalize(tag: &str) -> String {
    tag.trim().to_string()
}

/// Check if a tag might be registered (false positives possible)
pub fn might_exist(tag: &str) -> bool {
    let tag = normalize(tag);
    RFID_FILTER
        .read()
        .expect("rfid filter poisoned")
        .contains(&tag)
}

/// Insert a single tag into the filter
pub fn insert(tag: &str) {
    let tag = normalize(tag);
    RFID_FILTER
        .write()
        .expect("rfid filter poisoned")
        .add(&tag);
}

/// Remove a tag from the filter
pub fn remove(tag: &str) {
    let tag = normalize(tag);
    RFID_FILTER
        .write()
        .expect("rfid filter poisoned")
        .remove(&tag);
}

/// Warm up the tag filter using streaming + batching
pub async fn warmup_rfid_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (String,)>("SELECT rfid_tag FROM employees").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (tag,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&tag));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("RFID filter warmup complete: {} tags", total);
    Ok(())
}

/// Insert a batch of normalized tags
fn insert_batch(tags: &[String]) {
    let mut filter = RFID_FILTER.write().expect("rfid filter poisoned");

    for tag in tags {
        filter.add(tag);
    }
}
