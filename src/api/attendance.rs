use crate::config::Config;
use crate::engine::error::ScanError;
use crate::engine::pipeline;
use crate::events::{AttendanceBroadcaster, AttendanceUpdated};
use crate::model::attendance::{AttendanceStatus, DayType};
use actix_web::error::ErrorInternalServerError;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ScanRequest {
    #[schema(example = "04A2B9C1")]
    pub rfid_tag: String,
}

/// Attendance row joined with the employee's name, as listed in the UI.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRow {
    pub id: u64,
    pub employee_id: u64,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "time", nullable = true)]
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
    pub day_type: DayType,
    pub status: AttendanceStatus,
    pub work_hours: f64,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRow>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

const ATTENDANCE_COLUMNS: &str = "a.id, a.employee_id, e.first_name, e.last_name, a.date, \
     a.morning_in, a.lunch_out, a.afternoon_in, a.afternoon_out, a.evening_in, a.evening_out, \
     a.day_type, a.status, a.work_hours";

/// Scan ingestion endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan accepted, record and summary updated", body = Object, example = json!({
            "message": "Attendance recorded successfully for John"
        })),
        (status = 400, description = "Scan rejected: out of window or duplicate", body = Object, example = json!({
            "error": "Restricted to scan. Your scan time does not match the schedule."
        })),
        (status = 404, description = "RFID tag not registered"),
        (status = 503, description = "No active schedule"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn scan(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    broadcaster: web::Data<AttendanceBroadcaster>,
    payload: web::Json<ScanRequest>,
) -> Result<impl Responder, ScanError> {
    let now = config.now_local();

    let outcome =
        pipeline::record_scan(pool.get_ref(), config.get_ref(), &payload.rfid_tag, now).await?;

    broadcaster.publish(AttendanceUpdated::new(
        outcome.employee.clone(),
        outcome.attendance.clone(),
        outcome.summary.clone(),
        now,
    ));

    Ok(HttpResponse::Ok().json(json!({
        "message": format!(
            "Attendance recorded successfully for {}",
            outcome.employee.first_name
        ),
        "attendance": outcome.attendance,
        "summary": outcome.summary,
        "formatted_datetime": now.format("%Y-%m-%dT%H:%M:%S").to_string(),
    })))
}

/// Live stream of committed scans as server-sent events. Dashboards
/// subscribe here instead of polling the list endpoints.
#[utoipa::path(
    get,
    path = "/api/attendance/events",
    responses(
        (status = 200, description = "text/event-stream of attendance update events")
    ),
    tag = "Attendance"
)]
pub async fn events(broadcaster: web::Data<AttendanceBroadcaster>) -> impl Responder {
    let rx = broadcaster.subscribe();

    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let Ok(data) = serde_json::to_string(&event) else {
                        continue;
                    };
                    let chunk = web::Bytes::from(format!("data: {}\n\n", data));
                    return Some((Ok::<_, actix_web::Error>(chunk), rx));
                }
                // a slow consumer skips what it missed and keeps listening
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .streaming(stream)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TodayQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Today's attendance rows
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated attendance for today", body = AttendanceListResponse)
    ),
    tag = "Attendance"
)]
pub async fn list_today(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<TodayQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;
    let today = config.now_local().date();

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendances WHERE date = ?")
        .bind(today)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count today's attendance");
            ErrorInternalServerError("Database error")
        })?;

    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendances a \
         JOIN employees e ON e.id = a.employee_id \
         WHERE a.date = ? ORDER BY a.id DESC LIMIT ? OFFSET ?"
    );

    let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(today)
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch today's attendance");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: rows,
        page,
        per_page,
        total,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Filterable attendance history
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("month", Query, description = "Filter by month (1-12)"),
        ("year", Query, description = "Filter by year"),
        ("start_date", Query, description = "Range start (YYYY-MM-DD)"),
        ("end_date", Query, description = "Range end (YYYY-MM-DD)"),
        ("status", Query, description = "Absent | Present | Late | all"),
        ("search", Query, description = "Search by employee name")
    ),
    responses(
        (status = 200, description = "Paginated attendance history", body = AttendanceListResponse),
        (status = 400, description = "Invalid filter")
    ),
    tag = "Attendance"
)]
pub async fn history(
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(month) = query.month {
        if !(1..=12).contains(&month) {
            return Err(actix_web::error::ErrorBadRequest("month must be 1-12"));
        }
        conditions.push("MONTH(a.date) = ?");
        bindings.push(month.to_string());
    }

    if let Some(year) = query.year {
        conditions.push("YEAR(a.date) = ?");
        bindings.push(year.to_string());
    }

    if let Some(start_date) = query.start_date {
        conditions.push("a.date >= ?");
        bindings.push(start_date.to_string());
    }

    if let Some(end_date) = query.end_date {
        conditions.push("a.date <= ?");
        bindings.push(end_date.to_string());
    }

    if let Some(status) = &query.status {
        if !status.eq_ignore_ascii_case("all") {
            let known = ["Absent", "Present", "Late"]
                .iter()
                .find(|s| s.eq_ignore_ascii_case(status));
            match known {
                Some(s) => {
                    conditions.push("a.status = ?");
                    bindings.push(s.to_string());
                }
                None => {
                    return Err(actix_web::error::ErrorBadRequest(
                        "status must be Absent, Present, Late or all",
                    ));
                }
            }
        }
    }

    if let Some(search) = &query.search {
        conditions
            .push("(CONCAT(LOWER(e.first_name), ' ', LOWER(e.last_name)) LIKE ? OR LOWER(e.first_name) LIKE ? OR LOWER(e.last_name) LIKE ?)");
        let like = format!("%{}%", search.to_lowercase());
        bindings.push(like.clone());
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!(
        "SELECT COUNT(*) FROM attendances a JOIN employees e ON e.id = a.employee_id {}",
        where_clause
    );
    debug!(sql = %count_sql, bindings = ?bindings, "Counting attendance history");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count attendance history");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendances a \
         JOIN employees e ON e.id = a.employee_id {} \
         ORDER BY a.date DESC, a.id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, "Fetching attendance history");

    let mut data_query = sqlx::query_as::<_, AttendanceRow>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let rows = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch attendance history");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: rows,
        page,
        per_page,
        total,
    }))
}
