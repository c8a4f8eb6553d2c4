use crate::model::schedule::Schedule;
use crate::utils::db_utils::{build_update_sql, execute_update, require_known_fields};
use crate::utils::schedule_cache;
use actix_web::error::{ErrorBadRequest, ErrorInternalServerError};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateSchedule {
    #[schema(example = "Default shift")]
    pub name: String,
    #[schema(example = "08:00")]
    pub morning_in: String,
    #[schema(example = "12:00")]
    pub morning_out: String,
    #[schema(example = "13:00")]
    pub afternoon_in: String,
    #[schema(example = "17:00")]
    pub afternoon_out: String,
    #[schema(example = "18:00", nullable = true)]
    pub evening_in: Option<String>,
    #[schema(example = "21:00", nullable = true)]
    pub evening_out: Option<String>,
    #[schema(example = 30)]
    pub scan_allowance_minutes: i32,
    #[schema(example = 15)]
    pub late_minutes: i32,
    #[schema(example = false)]
    pub is_active: Option<bool>,
}

/// Fields a generic update may touch. `is_active` is deliberately
/// absent: activation must go through /activate, which deactivates the
/// rest of the table in the same transaction.
const SCHEDULE_UPDATE_FIELDS: [&str; 9] = [
    "name",
    "morning_in",
    "morning_out",
    "afternoon_in",
    "afternoon_out",
    "evening_in",
    "evening_out",
    "scan_allowance_minutes",
    "late_minutes",
];

fn parse_time(value: &str) -> actix_web::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ErrorBadRequest(format!("Invalid time: {}", value)))
}

/// List schedules
#[utoipa::path(
    get,
    path = "/api/schedule",
    responses(
        (status = 200, description = "All configured schedules", body = [Schedule])
    ),
    tag = "Schedule"
)]
pub async fn list_schedules(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let schedules = sqlx::query_as::<_, Schedule>("SELECT * FROM schedules ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch schedules");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(schedules))
}

/// Create schedule
#[utoipa::path(
    post,
    path = "/api/schedule",
    request_body = CreateSchedule,
    responses(
        (status = 200, description = "Schedule created", body = Object, example = json!({
            "message": "Created successfully"
        })),
        (status = 400, description = "Invalid time value"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule"
)]
pub async fn create_schedule(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSchedule>,
) -> actix_web::Result<impl Responder> {
    let morning_in = parse_time(&payload.morning_in)?;
    let morning_out = parse_time(&payload.morning_out)?;
    let afternoon_in = parse_time(&payload.afternoon_in)?;
    let afternoon_out = parse_time(&payload.afternoon_out)?;
    let evening_in = payload.evening_in.as_deref().map(parse_time).transpose()?;
    let evening_out = payload.evening_out.as_deref().map(parse_time).transpose()?;
    let activate = payload.is_active.unwrap_or(false);

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        ErrorInternalServerError("Database error")
    })?;

    // creating an already-active schedule displaces the current one
    // inside the same transaction, so there is never a window with two
    if activate {
        sqlx::query("UPDATE schedules SET is_active = FALSE")
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to deactivate schedules");
                ErrorInternalServerError("Database error")
            })?;
    }

    sqlx::query(
        r#"
        INSERT INTO schedules
            (name, morning_in, morning_out, afternoon_in, afternoon_out,
             evening_in, evening_out, scan_allowance_minutes, late_minutes, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(morning_in)
    .bind(morning_out)
    .bind(afternoon_in)
    .bind(afternoon_out)
    .bind(evening_in)
    .bind(evening_out)
    .bind(payload.scan_allowance_minutes)
    .bind(payload.late_minutes)
    .bind(activate)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create schedule");
        ErrorInternalServerError("Database error")
    })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit schedule creation");
        ErrorInternalServerError("Database error")
    })?;

    schedule_cache::invalidate().await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Created successfully"
    })))
}

/// Activate schedule
#[utoipa::path(
    put,
    path = "/api/schedule/{id}/activate",
    params(
        ("id", Path, description = "Schedule ID")
    ),
    responses(
        (status = 200, description = "Schedule activated", body = Object, example = json!({
            "message": "Schedule activated successfully"
        })),
        (status = 404, description = "Schedule not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule"
)]
pub async fn activate_schedule(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let schedule_id = path.into_inner();

    // deactivate-all-then-activate-one as a single atomic swap
    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        ErrorInternalServerError("Database error")
    })?;

    sqlx::query("UPDATE schedules SET is_active = FALSE")
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to deactivate schedules");
            ErrorInternalServerError("Database error")
        })?;

    let result = sqlx::query("UPDATE schedules SET is_active = TRUE WHERE id = ?")
        .bind(schedule_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, schedule_id, "Failed to activate schedule");
            ErrorInternalServerError("Database error")
        })?;

    if result.rows_affected() == 0 {
        // rollback on drop keeps the previous active schedule in place
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Schedule not found"
        })));
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, schedule_id, "Failed to commit schedule activation");
        ErrorInternalServerError("Database error")
    })?;

    schedule_cache::invalidate().await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Schedule activated successfully"
    })))
}

/// Update schedule
#[utoipa::path(
    put,
    path = "/api/schedule/{id}",
    params(
        ("id", Path, description = "Schedule ID")
    ),
    responses(
        (status = 200, description = "Schedule updated", body = Object, example = json!({
            "message": "Updated successfully"
        })),
        (status = 400, description = "Unknown field in payload"),
        (status = 404, description = "Schedule not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule"
)]
pub async fn update_schedule(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<serde_json::Value>,
) -> actix_web::Result<impl Responder> {
    let schedule_id = path.into_inner();

    require_known_fields(&body, &SCHEDULE_UPDATE_FIELDS)?;

    let update = build_update_sql("schedules", &body, "id", schedule_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    schedule_cache::invalidate().await;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Schedule not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Updated successfully"
    })))
}

/// Delete schedule
#[utoipa::path(
    delete,
    path = "/api/schedule/{id}",
    params(
        ("id", Path, description = "Schedule ID")
    ),
    responses(
        (status = 200, description = "Schedule deleted", body = Object, example = json!({
            "message": "Deleted successfully"
        })),
        (status = 404, description = "Schedule not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule"
)]
pub async fn delete_schedule(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let schedule_id = path.into_inner();

    let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
        .bind(schedule_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, schedule_id, "Failed to delete schedule");
            ErrorInternalServerError("Database error")
        })?;

    schedule_cache::invalidate().await;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Schedule not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_cannot_touch_is_active() {
        // flipping is_active here would bypass the deactivate-all swap
        // and leave two schedules active at once
        let payload = json!({"is_active": true});
        assert!(require_known_fields(&payload, &SCHEDULE_UPDATE_FIELDS).is_err());

        let mixed = json!({"name": "Night shift", "is_active": true});
        assert!(require_known_fields(&mixed, &SCHEDULE_UPDATE_FIELDS).is_err());
    }

    #[test]
    fn plain_field_updates_are_accepted() {
        let payload = json!({"name": "Night shift", "late_minutes": 10, "evening_in": "18:00"});
        assert!(require_known_fields(&payload, &SCHEDULE_UPDATE_FIELDS).is_ok());
    }
}
