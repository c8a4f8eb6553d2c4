use crate::model::attendance::AttendanceStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Per-segment completion mark on a daily summary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum SegmentMark {
    #[sqlx(rename = "✓")]
    #[serde(rename = "✓")]
    #[strum(serialize = "✓")]
    Done,
    #[sqlx(rename = "x")]
    #[serde(rename = "x")]
    #[strum(serialize = "x")]
    Pending,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum SummaryStatus {
    Pending,
    Absent,
    Present,
    Late,
}

impl From<AttendanceStatus> for SummaryStatus {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Absent => SummaryStatus::Absent,
            AttendanceStatus::Present => SummaryStatus::Present,
            AttendanceStatus::Late => SummaryStatus::Late,
        }
    }
}

/// Aggregate projection of one employee's attendance for one date.
/// Unique on (employee_id, date). Marks only ever move from x to ✓ within
/// a day; `is_manual_edit` freezes the row against automatic updates.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceSummary {
    pub id: u64,
    pub employee_id: u64,

    #[schema(example = "2025-08-29", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "✓")]
    pub morning_status: SegmentMark,
    #[schema(example = "x")]
    pub afternoon_status: SegmentMark,
    #[schema(example = "x")]
    pub evening_status: SegmentMark,

    #[schema(example = "Present")]
    pub final_status: SummaryStatus,

    #[schema(example = 4.0)]
    pub total_work_hours: f64,

    pub is_manual_edit: bool,

    #[schema(example = "Auto-initialized", nullable = true)]
    pub remarks: Option<String>,
}
