use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    /// Fixed operational timezone, whole hours east of UTC.
    /// Every date/time derivation in the system uses this offset.
    pub utc_offset_hours: i32,

    /// Same-field rescans closer than this are treated as bounces.
    pub scan_cooldown_minutes: i64,

    /// Local wall-clock time at which pending summaries are pre-created.
    pub summary_init_time: NaiveTime,

    /// Dates counted as holidays when deriving day_type.
    pub holidays: Vec<NaiveDate>,

    // Rate limiting
    pub rate_scan_per_min: u32,
    pub rate_admin_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),

            utc_offset_hours: env::var("UTC_OFFSET_HOURS")
                .unwrap_or_else(|_| "8".to_string()) // Asia/Manila
                .parse()
                .unwrap(),
            scan_cooldown_minutes: env::var("SCAN_COOLDOWN_MINUTES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap(),
            summary_init_time: NaiveTime::parse_from_str(
                &env::var("SUMMARY_INIT_TIME").unwrap_or_else(|_| "01:30".to_string()),
                "%H:%M",
            )
            .expect("SUMMARY_INIT_TIME must be HH:MM"),
            holidays: env::var("HOLIDAYS")
                .unwrap_or_else(|_| "2025-01-01,2025-12-25".to_string())
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                        .expect("HOLIDAYS must be comma-separated YYYY-MM-DD dates")
                })
                .collect(),

            rate_scan_per_min: env::var("RATE_SCAN_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_admin_per_min: env::var("RATE_ADMIN_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }

    /// Current date-time in the configured operational timezone.
    pub fn now_local(&self) -> NaiveDateTime {
        let offset = FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
        Utc::now().with_timezone(&offset).naive_local()
    }
}
