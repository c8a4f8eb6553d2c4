use crate::config::Config;
use crate::model::summary::{AttendanceSummary, SegmentMark, SummaryStatus};
use crate::utils::db_utils::{build_update_sql, execute_update, require_known_fields};
use actix_web::error::{ErrorBadRequest, ErrorInternalServerError};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

/// Summary row joined with the employee's name.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct SummaryRow {
    pub id: u64,
    pub employee_id: u64,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub morning_status: SegmentMark,
    pub afternoon_status: SegmentMark,
    pub evening_status: SegmentMark,
    pub final_status: SummaryStatus,
    pub total_work_hours: f64,
    pub is_manual_edit: bool,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SummaryQuery {
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryListResponse {
    pub data: Vec<SummaryRow>,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Daily summaries for a date (defaults to today)
#[utoipa::path(
    get,
    path = "/api/attendance/summaries",
    params(
        ("date", Query, description = "Date (YYYY-MM-DD), defaults to today"),
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated summaries for the date", body = SummaryListResponse)
    ),
    tag = "Summary"
)]
pub async fn list_for_date(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date.unwrap_or_else(|| config.now_local().date());
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(15).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance_summaries WHERE date = ?")
            .bind(date)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to count summaries");
                ErrorInternalServerError("Database error")
            })?;

    let rows = sqlx::query_as::<_, SummaryRow>(
        "SELECT s.id, s.employee_id, e.first_name, e.last_name, s.date, \
         s.morning_status, s.afternoon_status, s.evening_status, s.final_status, \
         s.total_work_hours, s.is_manual_edit, s.remarks \
         FROM attendance_summaries s \
         JOIN employees e ON e.id = s.employee_id \
         WHERE s.date = ? ORDER BY e.last_name, e.first_name LIMIT ? OFFSET ?",
    )
    .bind(date)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch summaries");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(SummaryListResponse {
        data: rows,
        date,
        page,
        per_page,
        total,
    }))
}

#[derive(Serialize, ToSchema)]
pub struct DailyCell {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub day_of_week: String,
    pub is_weekend: bool,
    pub status: String,
    pub morning: String,
    pub afternoon: String,
    pub evening: String,
    pub work_hours: f64,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlySummary {
    pub days_present: u32,
    pub days_absent: u32,
    pub days_late: u32,
    pub total_work_hours: f64,
    pub attendance_rate: f64,
    pub daily_records: Vec<DailyCell>,
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// Build the per-day grid for one employee's month. Weekends are marked
/// but not counted against attendance; a weekday without a summary (or
/// one still Pending) counts as absent.
pub fn monthly_grid(year: i32, month: u32, summaries: &[AttendanceSummary]) -> MonthlySummary {
    let mut result = MonthlySummary {
        days_present: 0,
        days_absent: 0,
        days_late: 0,
        total_work_hours: 0.0,
        attendance_rate: 0.0,
        daily_records: Vec::new(),
    };

    let mut workdays = 0u32;

    for day in 1..=days_in_month(year, month) {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let day_of_week = date.weekday().to_string();

        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            result.daily_records.push(DailyCell {
                date,
                day_of_week,
                is_weekend: true,
                status: "Weekend".to_string(),
                morning: "-".to_string(),
                afternoon: "-".to_string(),
                evening: "-".to_string(),
                work_hours: 0.0,
            });
            continue;
        }

        workdays += 1;
        let summary = summaries.iter().find(|s| s.date == date);

        match summary {
            Some(summary) => {
                match summary.final_status {
                    SummaryStatus::Present => result.days_present += 1,
                    SummaryStatus::Late => result.days_late += 1,
                    SummaryStatus::Absent | SummaryStatus::Pending => result.days_absent += 1,
                }
                result.total_work_hours += summary.total_work_hours;

                result.daily_records.push(DailyCell {
                    date,
                    day_of_week,
                    is_weekend: false,
                    status: summary.final_status.to_string(),
                    morning: summary.morning_status.to_string(),
                    afternoon: summary.afternoon_status.to_string(),
                    evening: summary.evening_status.to_string(),
                    work_hours: summary.total_work_hours,
                });
            }
            None => {
                result.days_absent += 1;
                result.daily_records.push(DailyCell {
                    date,
                    day_of_week,
                    is_weekend: false,
                    status: "Absent".to_string(),
                    morning: "x".to_string(),
                    afternoon: "x".to_string(),
                    evening: "x".to_string(),
                    work_hours: 0.0,
                });
            }
        }
    }

    if workdays > 0 {
        let attended = (result.days_present + result.days_late) as f64;
        result.attendance_rate = (attended / workdays as f64 * 100.0 * 100.0).round() / 100.0;
    }

    result
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MonthlyQuery {
    pub employee_id: u64,
    pub year: i32,
    pub month: u32,
}

/// Monthly attendance grid for one employee
#[utoipa::path(
    get,
    path = "/api/attendance/summaries/monthly",
    params(
        ("employee_id", Query, description = "Employee ID"),
        ("year", Query, description = "Year"),
        ("month", Query, description = "Month (1-12)")
    ),
    responses(
        (status = 200, description = "Per-day grid with monthly totals", body = MonthlySummary),
        (status = 400, description = "Invalid month")
    ),
    tag = "Summary"
)]
pub async fn monthly(
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthlyQuery>,
) -> actix_web::Result<impl Responder> {
    if !(1..=12).contains(&query.month) {
        return Err(ErrorBadRequest("month must be 1-12"));
    }

    let summaries = sqlx::query_as::<_, AttendanceSummary>(
        "SELECT * FROM attendance_summaries \
         WHERE employee_id = ? AND YEAR(date) = ? AND MONTH(date) = ?",
    )
    .bind(query.employee_id)
    .bind(query.year)
    .bind(query.month)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = query.employee_id, "Failed to fetch monthly summaries");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(monthly_grid(query.year, query.month, &summaries)))
}

const MANUAL_EDIT_FIELDS: [&str; 6] = [
    "morning_status",
    "afternoon_status",
    "evening_status",
    "final_status",
    "total_work_hours",
    "remarks",
];

/// Manual summary override
#[utoipa::path(
    put,
    path = "/api/attendance/summaries/{id}",
    params(
        ("id", Path, description = "Summary ID")
    ),
    responses(
        (status = 200, description = "Summary updated and frozen against reconciliation", body = Object, example = json!({
            "message": "Summary updated successfully"
        })),
        (status = 400, description = "Unknown field in payload"),
        (status = 404, description = "Summary not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Summary"
)]
pub async fn manual_edit(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let summary_id = path.into_inner();

    require_known_fields(&body, &MANUAL_EDIT_FIELDS)?;

    // the flag is what freezes the row against automatic reconciliation
    let mut payload = body.into_inner();
    payload["is_manual_edit"] = Value::Bool(true);

    let update = build_update_sql("attendance_summaries", &payload, "id", summary_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| {
            error!(error = %e, summary_id, "Failed to apply manual summary edit");
            ErrorInternalServerError("Database error")
        })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Summary not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Summary updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(date: NaiveDate, status: SummaryStatus, hours: f64) -> AttendanceSummary {
        AttendanceSummary {
            id: 1,
            employee_id: 1,
            date,
            morning_status: SegmentMark::Done,
            afternoon_status: SegmentMark::Pending,
            evening_status: SegmentMark::Pending,
            final_status: status,
            total_work_hours: hours,
            is_manual_edit: false,
            remarks: None,
        }
    }

    #[test]
    fn weekends_are_marked_and_not_counted() {
        // August 2025: 21 weekdays, 10 weekend days
        let grid = monthly_grid(2025, 8, &[]);
        assert_eq!(grid.daily_records.len(), 31);
        let weekend_days = grid.daily_records.iter().filter(|c| c.is_weekend).count();
        assert_eq!(weekend_days, 10);
        assert_eq!(grid.days_absent, 21);
        assert_eq!(grid.attendance_rate, 0.0);
    }

    #[test]
    fn counts_and_rate_follow_final_status() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 8, day).unwrap();
        let summaries = vec![
            summary(d(4), SummaryStatus::Present, 8.0),
            summary(d(5), SummaryStatus::Late, 7.5),
            summary(d(6), SummaryStatus::Absent, 0.0),
            summary(d(7), SummaryStatus::Pending, 0.0),
        ];

        let grid = monthly_grid(2025, 8, &summaries);
        assert_eq!(grid.days_present, 1);
        assert_eq!(grid.days_late, 1);
        // 2 explicit (Absent + Pending) + 17 uncovered weekdays
        assert_eq!(grid.days_absent, 19);
        assert_eq!(grid.total_work_hours, 15.5);
        // 2 of 21 workdays attended
        assert_eq!(grid.attendance_rate, 9.52);
    }

    #[test]
    fn missing_weekday_renders_pending_marks() {
        let grid = monthly_grid(2025, 8, &[]);
        let monday = grid
            .daily_records
            .iter()
            .find(|c| c.date == NaiveDate::from_ymd_opt(2025, 8, 4).unwrap())
            .unwrap();
        assert_eq!(monday.status, "Absent");
        assert_eq!(monday.morning, "x");
    }
}
