use crate::engine::classify::ScanField;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum DayType {
    Regular,
    Weekend,
    Holiday,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum AttendanceStatus {
    Absent,
    Present,
    Late,
}

/// One row per (employee, calendar date). Scan fields hold the time-of-day
/// of the accepted scan, or NULL while the segment is still open.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,

    #[schema(example = "2025-08-29", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "08:02:00", value_type = String, format = "time", nullable = true)]
    pub morning_in: Option<NaiveTime>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub lunch_out: Option<NaiveTime>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub afternoon_in: Option<NaiveTime>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub afternoon_out: Option<NaiveTime>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub evening_in: Option<NaiveTime>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub evening_out: Option<NaiveTime>,

    #[schema(example = "Regular")]
    pub day_type: DayType,

    #[schema(example = "Present")]
    pub status: AttendanceStatus,

    #[schema(example = 8.0)]
    pub work_hours: f64,
}

impl Attendance {
    pub fn scan_time(&self, field: ScanField) -> Option<NaiveTime> {
        match field {
            ScanField::MorningIn => self.morning_in,
            ScanField::LunchOut => self.lunch_out,
            ScanField::AfternoonIn => self.afternoon_in,
            ScanField::AfternoonOut => self.afternoon_out,
            ScanField::EveningIn => self.evening_in,
            ScanField::EveningOut => self.evening_out,
        }
    }

    pub fn set_scan_time(&mut self, field: ScanField, time: NaiveTime) {
        match field {
            ScanField::MorningIn => self.morning_in = Some(time),
            ScanField::LunchOut => self.lunch_out = Some(time),
            ScanField::AfternoonIn => self.afternoon_in = Some(time),
            ScanField::AfternoonOut => self.afternoon_out = Some(time),
            ScanField::EveningIn => self.evening_in = Some(time),
            ScanField::EveningOut => self.evening_out = Some(time),
        }
    }
}
