use crate::config::Config;
use crate::engine::classify::classify;
use crate::engine::derive::{day_type, derive_status, work_hours};
use crate::engine::error::ScanError;
use crate::engine::guard::is_duplicate;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::employee::{Employee, EmployeeStatus};
use crate::model::summary::{AttendanceSummary, SegmentMark};
use crate::utils::{rfid_filter, schedule_cache};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::{debug, error, info, warn};

/// Result of one accepted scan: the mutated day record and the summary
/// reconciled from it, both committed in the same transaction.
pub struct ScanOutcome {
    pub employee: Employee,
    pub attendance: Attendance,
    pub summary: AttendanceSummary,
}

/// Process one RFID scan end to end.
///
/// The (employee_id, date) attendance row is created and mutated under a
/// row lock, so two near-simultaneous scans for the same employee are
/// serialized; scans for different employees proceed in parallel. Any
/// rejection rolls the transaction back and leaves no partial write.
pub async fn record_scan(
    pool: &MySqlPool,
    config: &Config,
    rfid_tag: &str,
    scanned_at: NaiveDateTime,
) -> Result<ScanOutcome, ScanError> {
    let tag = rfid_tag.trim();

    // Cheap pre-check; false positives fall through to the DB lookup.
    if !rfid_filter::might_exist(tag) {
        debug!(tag, "rfid tag rejected by filter");
        return Err(ScanError::UnknownTag);
    }

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE rfid_tag = ?")
        .bind(tag)
        .fetch_optional(pool)
        .await?
        .ok_or(ScanError::UnknownTag)?;

    let schedule = schedule_cache::active_schedule(pool)
        .await?
        .ok_or(ScanError::NoActiveSchedule)?;

    let date = scanned_at.date();
    // scans are recorded at minute granularity
    let time = scanned_at
        .time()
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or_else(|| scanned_at.time());

    let (direction, field) = classify(time, &schedule).ok_or(ScanError::OutOfWindow)?;
    debug!(employee_id = employee.id, %direction, ?field, %time, "scan classified");

    let mut tx = pool.begin().await?;

    // Resolve-or-create under the (employee_id, date) unique key, then
    // lock the row so classification + mutation + reconciliation behave
    // as one read-modify-write per employee-day.
    sqlx::query(
        r#"
        INSERT IGNORE INTO attendances (employee_id, date, day_type, status, work_hours)
        VALUES (?, ?, ?, ?, 0)
        "#,
    )
    .bind(employee.id)
    .bind(date)
    .bind(day_type(date, &config.holidays))
    .bind(AttendanceStatus::Absent)
    .execute(&mut *tx)
    .await?;

    let mut attendance = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendances WHERE employee_id = ? AND date = ? FOR UPDATE",
    )
    .bind(employee.id)
    .bind(date)
    .fetch_one(&mut *tx)
    .await?;

    if is_duplicate(attendance.scan_time(field), time, config.scan_cooldown_minutes) {
        // dropping the transaction rolls back the row created above
        warn!(employee_id = employee.id, ?field, "duplicate scan suppressed");
        return Err(ScanError::DuplicateScan);
    }

    attendance.set_scan_time(field, time);
    attendance.status = derive_status(&attendance, &schedule);
    attendance.work_hours = work_hours(&attendance);

    sqlx::query(
        r#"
        UPDATE attendances
        SET morning_in = ?, lunch_out = ?, afternoon_in = ?, afternoon_out = ?,
            evening_in = ?, evening_out = ?, status = ?, work_hours = ?
        WHERE id = ?
        "#,
    )
    .bind(attendance.morning_in)
    .bind(attendance.lunch_out)
    .bind(attendance.afternoon_in)
    .bind(attendance.afternoon_out)
    .bind(attendance.evening_in)
    .bind(attendance.evening_out)
    .bind(attendance.status)
    .bind(attendance.work_hours)
    .bind(attendance.id)
    .execute(&mut *tx)
    .await?;

    let summary = reconcile(&mut tx, &attendance).await?;

    tx.commit().await?;

    info!(
        employee_id = employee.id,
        ?field,
        status = %attendance.status,
        work_hours = attendance.work_hours,
        "attendance recorded"
    );

    Ok(ScanOutcome {
        employee,
        attendance,
        summary,
    })
}

/// Project the day record into the summary marks. Marks are monotonic:
/// reconciliation only ever flips x to ✓, never back.
pub fn project(summary: &mut AttendanceSummary, attendance: &Attendance) {
    if attendance.morning_in.is_some() {
        summary.morning_status = SegmentMark::Done;
    }
    if attendance.afternoon_in.is_some() {
        summary.afternoon_status = SegmentMark::Done;
    }
    if attendance.evening_in.is_some() {
        summary.evening_status = SegmentMark::Done;
    }
    summary.final_status = attendance.status.into();
    summary.total_work_hours = attendance.work_hours;
}

/// Locate-or-create the (employee_id, date) summary and sync it with the
/// given attendance record, inside the caller's transaction. A manually
/// edited summary is left exactly as the human set it.
pub async fn reconcile(
    tx: &mut Transaction<'_, MySql>,
    attendance: &Attendance,
) -> Result<AttendanceSummary, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT IGNORE INTO attendance_summaries
            (employee_id, date, morning_status, afternoon_status, evening_status,
             final_status, total_work_hours, is_manual_edit)
        VALUES (?, ?, 'x', 'x', 'x', 'Pending', 0, FALSE)
        "#,
    )
    .bind(attendance.employee_id)
    .bind(attendance.date)
    .execute(&mut **tx)
    .await?;

    let mut summary = sqlx::query_as::<_, AttendanceSummary>(
        "SELECT * FROM attendance_summaries WHERE employee_id = ? AND date = ? FOR UPDATE",
    )
    .bind(attendance.employee_id)
    .bind(attendance.date)
    .fetch_one(&mut **tx)
    .await?;

    if summary.is_manual_edit {
        debug!(summary_id = summary.id, "summary is manually edited, projection skipped");
        return Ok(summary);
    }

    project(&mut summary, attendance);

    sqlx::query(
        r#"
        UPDATE attendance_summaries
        SET morning_status = ?, afternoon_status = ?, evening_status = ?,
            final_status = ?, total_work_hours = ?
        WHERE id = ?
        "#,
    )
    .bind(summary.morning_status)
    .bind(summary.afternoon_status)
    .bind(summary.evening_status)
    .bind(summary.final_status)
    .bind(summary.total_work_hours)
    .bind(summary.id)
    .execute(&mut **tx)
    .await?;

    Ok(summary)
}

#[derive(Debug, Default)]
pub struct InitStats {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Pre-create pending summaries for every Active employee missing one on
/// `date`. Idempotent: the (employee_id, date) unique key makes reruns
/// no-ops for rows that already exist. A failure for one employee is
/// logged and the loop continues.
pub async fn initialize_all_pending(
    pool: &MySqlPool,
    date: NaiveDate,
) -> Result<InitStats, sqlx::Error> {
    let employee_ids: Vec<(u64,)> =
        sqlx::query_as("SELECT id FROM employees WHERE status = ?")
            .bind(EmployeeStatus::Active)
            .fetch_all(pool)
            .await?;

    info!(total = employee_ids.len(), %date, "starting pending summary initialization");

    let mut stats = InitStats::default();

    for (employee_id,) in employee_ids {
        let result = sqlx::query(
            r#"
            INSERT IGNORE INTO attendance_summaries
                (employee_id, date, morning_status, afternoon_status, evening_status,
                 final_status, total_work_hours, is_manual_edit, remarks)
            VALUES (?, ?, 'x', 'x', 'x', 'Pending', 0, FALSE, 'Auto-initialized')
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .execute(pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => stats.created += 1,
            Ok(_) => stats.skipped += 1,
            Err(e) => {
                error!(error = %e, employee_id, "failed to initialize summary");
                stats.failed += 1;
            }
        }
    }

    info!(
        created = stats.created,
        skipped = stats.skipped,
        failed = stats.failed,
        %date,
        "pending summary initialization finished"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::DayType;
    use crate::model::summary::SummaryStatus;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn attendance() -> Attendance {
        Attendance {
            id: 1,
            employee_id: 7,
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

    fn pending_summary() -> AttendanceSummary {
        AttendanceSummary {
            id: 1,
            employee_id: 7,
            date: NaiveDate::from_ymd_opt(2025, 8, 29).unwrap(),
            morning_status: SegmentMark::Pending,
            afternoon_status: SegmentMark::Pending,
            evening_status: SegmentMark::Pending,
            final_status: SummaryStatus::Pending,
            total_work_hours: 0.0,
            is_manual_edit: false,
            remarks: None,
        }
    }

    #[test]
    fn projection_marks_groups_with_an_in_scan() {
        let mut rec = attendance();
        rec.morning_in = Some(t(8, 0));
        rec.status = AttendanceStatus::Present;
        rec.work_hours = 0.0;

        let mut summary = pending_summary();
        project(&mut summary, &rec);

        assert_eq!(summary.morning_status, SegmentMark::Done);
        assert_eq!(summary.afternoon_status, SegmentMark::Pending);
        assert_eq!(summary.evening_status, SegmentMark::Pending);
        assert_eq!(summary.final_status, SummaryStatus::Present);
    }

    #[test]
    fn marks_never_revert_to_pending() {
        // morning already ✓, then a reconciliation driven by a record
        // whose morning field is unset must not clear it
        let mut summary = pending_summary();
        summary.morning_status = SegmentMark::Done;

        let mut rec = attendance();
        rec.afternoon_in = Some(t(13, 5));
        rec.status = AttendanceStatus::Present;

        project(&mut summary, &rec);

        assert_eq!(summary.morning_status, SegmentMark::Done);
        assert_eq!(summary.afternoon_status, SegmentMark::Done);
    }

    #[test]
    fn projection_copies_status_and_hours() {
        let mut rec = attendance();
        rec.morning_in = Some(t(8, 20));
        rec.lunch_out = Some(t(12, 0));
        rec.status = AttendanceStatus::Late;
        rec.work_hours = 3.67;

        let mut summary = pending_summary();
        project(&mut summary, &rec);

        assert_eq!(summary.final_status, SummaryStatus::Late);
        assert_eq!(summary.total_work_hours, 3.67);
    }
}

// These exercise the transactional paths against a disposable MySQL.
// They need DATABASE_URL; run with `cargo test -- --ignored`.
#[cfg(test)]
mod db_tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn config() -> Config {
        Config {
            database_url: String::new(),
            server_addr: String::new(),
            utc_offset_hours: 8,
            scan_cooldown_minutes: 5,
            summary_init_time: t(1, 30),
            holidays: Vec::new(),
            rate_scan_per_min: 120,
            rate_admin_per_min: 1000,
            api_prefix: "/api".to_string(),
        }
    }

    async fn seed_employee(pool: &MySqlPool, tag: &str) -> u64 {
        sqlx::query(
            "INSERT INTO employees (rfid_tag, first_name, last_name, email, status) \
             VALUES (?, 'Test', 'User', CONCAT(?, '@test.local'), 'Active')",
        )
        .bind(tag)
        .bind(tag)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_id()
    }

    async fn seed_active_schedule(pool: &MySqlPool) {
        sqlx::query(
            "INSERT INTO schedules \
             (name, morning_in, morning_out, afternoon_in, afternoon_out, \
              scan_allowance_minutes, late_minutes, is_active) \
             VALUES ('Default shift', '08:00', '12:00', '13:00', '17:00', 30, 15, TRUE)",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn initialize_all_pending_rerun_creates_nothing(pool: MySqlPool) {
        seed_employee(&pool, "AA00BB01").await;
        seed_employee(&pool, "AA00BB02").await;
        let date = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();

        let first = initialize_all_pending(&pool, date).await.unwrap();
        assert_eq!(first.created, 2);
        assert_eq!(first.failed, 0);

        let second = initialize_all_pending(&pool, date).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 2);

        let rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendance_summaries WHERE date = ?")
                .bind(date)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(rows, 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn duplicate_scan_rolls_back_without_a_partial_write(pool: MySqlPool) {
        schedule_cache::invalidate().await;
        seed_active_schedule(&pool).await;
        let employee_id = seed_employee(&pool, "AA00BB03").await;
        rfid_filter::insert("AA00BB03");

        let day = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        let accepted = record_scan(
            &pool,
            &config(),
            "AA00BB03",
            day.and_time(t(8, 0)),
        )
        .await
        .unwrap();
        assert_eq!(accepted.attendance.morning_in, Some(t(8, 0)));

        let rejected = record_scan(&pool, &config(), "AA00BB03", day.and_time(t(8, 2))).await;
        assert!(matches!(rejected, Err(ScanError::DuplicateScan)));

        // the rejected scan must leave record and summary exactly as committed
        let after = sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendances WHERE employee_id = ? AND date = ?",
        )
        .bind(employee_id)
        .bind(day)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(after.morning_in, Some(t(8, 0)));
        assert_eq!(after.status, accepted.attendance.status);

        let summaries: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendance_summaries WHERE employee_id = ?")
                .bind(employee_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(summaries, 1);
    }
}
