use chrono::NaiveTime;

/// Bounce suppression. A scan is a duplicate when the same field already
/// holds a time and the new scan arrives strictly within the cooldown of
/// it. Only the field the scan would populate is checked.
pub fn is_duplicate(
    existing: Option<NaiveTime>,
    scan_time: NaiveTime,
    cooldown_minutes: i64,
) -> bool {
    match existing {
        Some(previous) => (scan_time - previous).num_minutes().abs() < cooldown_minutes,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn empty_field_is_never_a_duplicate() {
        assert!(!is_duplicate(None, t(8, 0), 5));
    }

    #[test]
    fn rescan_within_cooldown_is_a_duplicate() {
        assert!(is_duplicate(Some(t(8, 0)), t(8, 3), 5));
        // also when the clock runs backwards between scans
        assert!(is_duplicate(Some(t(8, 3)), t(8, 0), 5));
    }

    #[test]
    fn rescan_at_or_past_cooldown_is_accepted() {
        assert!(!is_duplicate(Some(t(8, 0)), t(8, 5), 5));
        assert!(!is_duplicate(Some(t(8, 0)), t(8, 20), 5));
    }
}
