use crate::model::schedule::Schedule;
use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
pub enum ScanDirection {
    #[strum(serialize = "IN")]
    In,
    #[strum(serialize = "OUT")]
    Out,
}

/// The attendance column a scan lands in. Variant order is the window
/// precedence: when tolerance windows overlap, the earliest segment wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
pub enum ScanField {
    MorningIn,
    LunchOut,
    AfternoonIn,
    AfternoonOut,
    EveningIn,
    EveningOut,
}

impl ScanField {
    pub fn direction(self) -> ScanDirection {
        match self {
            ScanField::MorningIn | ScanField::AfternoonIn | ScanField::EveningIn => {
                ScanDirection::In
            }
            ScanField::LunchOut | ScanField::AfternoonOut | ScanField::EveningOut => {
                ScanDirection::Out
            }
        }
    }
}

/// True when `scan` falls inside the inclusive window
/// [nominal - allowance, nominal + allowance].
fn within_window(scan: NaiveTime, nominal: NaiveTime, allowance_minutes: i32) -> bool {
    let scan_secs = scan.num_seconds_from_midnight() as i64;
    let nominal_secs = nominal.num_seconds_from_midnight() as i64;
    (scan_secs - nominal_secs).abs() <= allowance_minutes as i64 * 60
}

/// Map a time-of-day onto the schedule's shift segments.
///
/// Windows are tested in fixed precedence (morning-in, lunch-out,
/// afternoon-in, afternoon-out, then the evening pair when configured);
/// the first matching window wins. Returns None for a time that matches
/// no window, which callers must surface as an out-of-window rejection.
pub fn classify(scan_time: NaiveTime, schedule: &Schedule) -> Option<(ScanDirection, ScanField)> {
    let allowance = schedule.scan_allowance_minutes;

    let mut windows: Vec<(NaiveTime, ScanField)> = vec![
        (schedule.morning_in, ScanField::MorningIn),
        (schedule.morning_out, ScanField::LunchOut),
        (schedule.afternoon_in, ScanField::AfternoonIn),
        (schedule.afternoon_out, ScanField::AfternoonOut),
    ];
    if let Some(evening_in) = schedule.evening_in {
        windows.push((evening_in, ScanField::EveningIn));
    }
    if let Some(evening_out) = schedule.evening_out {
        windows.push((evening_out, ScanField::EveningOut));
    }

    windows
        .into_iter()
        .find(|(nominal, _)| within_window(scan_time, *nominal, allowance))
        .map(|(_, field)| (field.direction(), field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn schedule() -> Schedule {
        Schedule {
            id: 1,
            name: "Default shift".to_string(),
            morning_in: t(8, 0),
            morning_out: t(12, 0),
            afternoon_in: t(13, 0),
            afternoon_out: t(17, 0),
            evening_in: None,
            evening_out: None,
            scan_allowance_minutes: 30,
            late_minutes: 15,
            is_active: true,
        }
    }

    #[test]
    fn times_inside_each_window_map_to_expected_fields() {
        let s = schedule();
        assert_eq!(
            classify(t(8, 10), &s),
            Some((ScanDirection::In, ScanField::MorningIn))
        );
        assert_eq!(
            classify(t(11, 45), &s),
            Some((ScanDirection::Out, ScanField::LunchOut))
        );
        assert_eq!(
            classify(t(13, 25), &s),
            Some((ScanDirection::In, ScanField::AfternoonIn))
        );
        assert_eq!(
            classify(t(16, 40), &s),
            Some((ScanDirection::Out, ScanField::AfternoonOut))
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let s = schedule();
        assert_eq!(
            classify(t(7, 30), &s),
            Some((ScanDirection::In, ScanField::MorningIn))
        );
        assert_eq!(
            classify(t(8, 30), &s),
            Some((ScanDirection::In, ScanField::MorningIn))
        );
        assert_eq!(classify(t(7, 29), &s), None);
        assert_eq!(classify(t(8, 31), &s), None);
    }

    #[test]
    fn unconfigured_times_are_rejected() {
        let s = schedule();
        assert_eq!(classify(t(3, 0), &s), None);
        assert_eq!(classify(t(10, 0), &s), None);
        assert_eq!(classify(t(22, 0), &s), None);
    }

    #[test]
    fn overlapping_windows_resolve_by_precedence() {
        // 90-minute allowance makes morning-out and afternoon-in overlap
        // around 12:30; the earlier segment must win.
        let mut s = schedule();
        s.scan_allowance_minutes = 90;
        assert_eq!(
            classify(t(12, 30), &s),
            Some((ScanDirection::Out, ScanField::LunchOut))
        );
    }

    #[test]
    fn evening_windows_only_match_when_configured() {
        let mut s = schedule();
        assert_eq!(classify(t(18, 0), &s), None);

        s.evening_in = Some(t(18, 0));
        s.evening_out = Some(t(21, 0));
        assert_eq!(
            classify(t(18, 10), &s),
            Some((ScanDirection::In, ScanField::EveningIn))
        );
        assert_eq!(
            classify(t(20, 45), &s),
            Some((ScanDirection::Out, ScanField::EveningOut))
        );
    }
}
