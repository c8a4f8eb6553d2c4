use crate::model::schedule::Schedule;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

const ACTIVE_KEY: &str = "active";

/// The single active schedule, cached for a short TTL. Scans hit this on
/// every request; schedule mutations invalidate it.
static SCHEDULE_CACHE: Lazy<Cache<String, Schedule>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(4)
        .time_to_live(Duration::from_secs(60))
        .build()
});

/// Fetch the active schedule, cache first.
pub async fn active_schedule(pool: &MySqlPool) -> Result<Option<Schedule>, sqlx::Error> {
    if let Some(schedule) = SCHEDULE_CACHE.get(ACTIVE_KEY).await {
        return Ok(Some(schedule));
    }

    let schedule =
        sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE is_active = TRUE LIMIT 1")
            .fetch_optional(pool)
            .await?;

    if let Some(ref schedule) = schedule {
        SCHEDULE_CACHE
            .insert(ACTIVE_KEY.to_string(), schedule.clone())
            .await;
    }

    Ok(schedule)
}

/// Drop the cached entry after any schedule mutation.
pub async fn invalidate() {
    SCHEDULE_CACHE.invalidate(ACTIVE_KEY).await;
}
