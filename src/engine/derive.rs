use crate::model::attendance::{Attendance, AttendanceStatus, DayType};
use crate::model::schedule::Schedule;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

pub fn day_type(date: NaiveDate, holidays: &[NaiveDate]) -> DayType {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => DayType::Weekend,
        _ if holidays.contains(&date) => DayType::Holiday,
        _ => DayType::Regular,
    }
}

fn is_late(scan: Option<NaiveTime>, nominal: Option<NaiveTime>, grace_minutes: i32) -> bool {
    match (scan, nominal) {
        (Some(scan), Some(nominal)) => {
            (scan - nominal).num_minutes() > grace_minutes as i64
        }
        _ => false,
    }
}

/// Absent iff no IN field is set. Late iff any IN present is strictly past
/// its nominal time plus the grace period. Present otherwise.
pub fn derive_status(record: &Attendance, schedule: &Schedule) -> AttendanceStatus {
    let any_in = record.morning_in.is_some()
        || record.afternoon_in.is_some()
        || record.evening_in.is_some();

    if !any_in {
        return AttendanceStatus::Absent;
    }

    let grace = schedule.late_minutes;
    let late = is_late(record.morning_in, Some(schedule.morning_in), grace)
        || is_late(record.afternoon_in, Some(schedule.afternoon_in), grace)
        || is_late(record.evening_in, schedule.evening_in, grace);

    if late {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

fn pair_minutes(time_in: Option<NaiveTime>, time_out: Option<NaiveTime>) -> i64 {
    match (time_in, time_out) {
        (Some(start), Some(end)) => (end - start).num_minutes().max(0),
        _ => 0,
    }
}

/// Sum of the matched IN/OUT pairs, in hours rounded to 2 decimal places.
/// A pair with only one side recorded contributes nothing.
pub fn work_hours(record: &Attendance) -> f64 {
    let minutes = pair_minutes(record.morning_in, record.lunch_out)
        + pair_minutes(record.afternoon_in, record.afternoon_out)
        + pair_minutes(record.evening_in, record.evening_out);

    (minutes as f64 / 60.0 * 100.0).round() / 100.0
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

    fn record() -> Attendance {
        Attendance {
            id: 1,
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 8, 29).unwrap(),
            morning_in: None,
            lunch_out: None,
            afternoon_in: None,
            afternoon_out: None,
            evening_in: None,
            evening_out: None,
            day_type: DayType::Regular,
            status: AttendanceStatus::Absent,
            work_hours: 0.0,
        }
    }

    #[test]
    fn saturday_is_weekend_regardless_of_holidays() {
        let saturday = NaiveDate::from_ymd_opt(2025, 8, 30).unwrap();
        assert_eq!(day_type(saturday, &[]), DayType::Weekend);
        assert_eq!(day_type(saturday, &[saturday]), DayType::Weekend);
    }

    #[test]
    fn configured_holiday_beats_regular() {
        let christmas = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        assert_eq!(day_type(christmas, &[christmas]), DayType::Holiday);

        let friday = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        assert_eq!(day_type(friday, &[christmas]), DayType::Regular);
    }

    #[test]
    fn no_in_scan_means_absent() {
        let mut rec = record();
        assert_eq!(derive_status(&rec, &schedule()), AttendanceStatus::Absent);

        // an OUT on its own does not flip the status
        rec.lunch_out = Some(t(12, 0));
        assert_eq!(derive_status(&rec, &schedule()), AttendanceStatus::Absent);
    }

    #[test]
    fn scan_within_grace_is_present() {
        let mut rec = record();
        rec.morning_in = Some(t(8, 10));
        assert_eq!(derive_status(&rec, &schedule()), AttendanceStatus::Present);

        // exactly at nominal + grace is still on time
        rec.morning_in = Some(t(8, 15));
        assert_eq!(derive_status(&rec, &schedule()), AttendanceStatus::Present);
    }

    #[test]
    fn scan_past_grace_is_late() {
        let mut rec = record();
        rec.morning_in = Some(t(8, 20));
        assert_eq!(derive_status(&rec, &schedule()), AttendanceStatus::Late);
    }

    #[test]
    fn one_late_in_marks_the_whole_day_late() {
        let mut rec = record();
        rec.morning_in = Some(t(8, 0));
        rec.afternoon_in = Some(t(13, 40));
        assert_eq!(derive_status(&rec, &schedule()), AttendanceStatus::Late);
    }

    #[test]
    fn full_day_totals_eight_hours() {
        let mut rec = record();
        rec.morning_in = Some(t(8, 0));
        rec.lunch_out = Some(t(12, 0));
        rec.afternoon_in = Some(t(13, 0));
        rec.afternoon_out = Some(t(17, 0));
        assert_eq!(work_hours(&rec), 8.00);
    }

    #[test]
    fn unmatched_pairs_contribute_nothing() {
        let mut rec = record();
        rec.morning_in = Some(t(8, 0));
        assert_eq!(work_hours(&rec), 0.0);

        rec.lunch_out = Some(t(12, 0));
        rec.afternoon_in = Some(t(13, 0));
        assert_eq!(work_hours(&rec), 4.0);
    }

    #[test]
    fn partial_hours_round_to_two_decimals() {
        let mut rec = record();
        rec.morning_in = Some(t(8, 0));
        rec.lunch_out = Some(t(11, 50));
        // 230 minutes
        assert_eq!(work_hours(&rec), 3.83);
    }
}
