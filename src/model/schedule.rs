use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One shift configuration. At most one schedule is active at any time;
/// activation deactivates every other row in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Default shift",
        "morning_in": "08:00:00",
        "morning_out": "12:00:00",
        "afternoon_in": "13:00:00",
        "afternoon_out": "17:00:00",
        "evening_in": null,
        "evening_out": null,
        "scan_allowance_minutes": 30,
        "late_minutes": 15,
        "is_active": true
    })
)]
pub struct Schedule {
    pub id: u64,

    #[schema(example = "Default shift")]
    pub name: String,

    #[schema(example = "08:00:00", value_type = String, format = "time")]
    pub morning_in: NaiveTime,

    #[schema(example = "12:00:00", value_type = String, format = "time")]
    pub morning_out: NaiveTime,

    #[schema(example = "13:00:00", value_type = String, format = "time")]
    pub afternoon_in: NaiveTime,

    #[schema(example = "17:00:00", value_type = String, format = "time")]
    pub afternoon_out: NaiveTime,

    #[schema(value_type = String, format = "time", nullable = true)]
    pub evening_in: Option<NaiveTime>,

    #[schema(value_type = String, format = "time", nullable = true)]
    pub evening_out: Option<NaiveTime>,

    /// Symmetric half-width of the accept window around each nominal time.
    #[schema(example = 30)]
    pub scan_allowance_minutes: i32,

    /// Grace period after a nominal IN time before a scan counts as late.
    #[schema(example = 15)]
    pub late_minutes: i32,

    #[schema(example = true)]
    pub is_active: bool,
}
