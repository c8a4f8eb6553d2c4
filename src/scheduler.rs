use crate::config::Config;
use crate::engine::pipeline;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use sqlx::MySqlPool;
use tracing::{error, info};

fn next_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    if now.time() < at {
        now.date().and_time(at)
    } else {
        (now.date() + Duration::days(1)).and_time(at)
    }
}

/// Once-daily pending-summary initializer. Sleeps until the configured
/// local wall-clock time, pre-creates summaries for every active
/// employee, and repeats. The underlying insert is idempotent, so an
/// extra run for the same date is harmless.
pub fn spawn_daily_initializer(pool: MySqlPool, config: Config) {
    actix_web::rt::spawn(async move {
        loop {
            let now = config.now_local();
            let run_at = next_run(now, config.summary_init_time);
            let wait = (run_at - now)
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(0));

            info!(run_at = %run_at, "daily summary initializer sleeping");
            actix_web::rt::time::sleep(wait).await;

            let today = config.now_local().date();
            match pipeline::initialize_all_pending(&pool, today).await {
                Ok(stats) => info!(
                    created = stats.created,
                    skipped = stats.skipped,
                    failed = stats.failed,
                    %today,
                    "daily summary initializer run complete"
                ),
                Err(e) => error!(error = %e, %today, "daily summary initializer run failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn runs_later_today_when_still_before_the_mark() {
        let at = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        assert_eq!(next_run(dt(29, 0, 15), at), dt(29, 1, 30));
    }

    #[test]
    fn rolls_to_tomorrow_once_past_the_mark() {
        let at = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        assert_eq!(next_run(dt(29, 1, 30), at), dt(30, 1, 30));
        assert_eq!(next_run(dt(29, 23, 59), at), dt(30, 1, 30));
    }
}
