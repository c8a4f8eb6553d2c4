use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::json;

/// Outcomes of scan processing that are surfaced to the caller instead of
/// mutating any state. Persistence failures abort the whole scan; the
/// transaction rollback guarantees no partial write.
#[derive(Debug, Display)]
pub enum ScanError {
    #[display(fmt = "RFID tag is not registered.")]
    UnknownTag,

    #[display(fmt = "Restricted to scan. Your scan time does not match the schedule.")]
    OutOfWindow,

    #[display(fmt = "Duplicate scan detected. Please wait before scanning again.")]
    DuplicateScan,

    #[display(fmt = "No schedule is currently active. Ask an administrator to activate one.")]
    NoActiveSchedule,

    #[display(fmt = "database error: {}", _0)]
    Persistence(sqlx::Error),
}

impl From<sqlx::Error> for ScanError {
    fn from(e: sqlx::Error) -> Self {
        ScanError::Persistence(e)
    }
}

impl ResponseError for ScanError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScanError::UnknownTag => StatusCode::NOT_FOUND,
            ScanError::OutOfWindow | ScanError::DuplicateScan => StatusCode::BAD_REQUEST,
            ScanError::NoActiveSchedule => StatusCode::SERVICE_UNAVAILABLE,
            ScanError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            // a bounce is a warning, not an error, to the kiosk UI
            ScanError::DuplicateScan => json!({ "warning": self.to_string() }),
            ScanError::Persistence(_) => json!({ "error": "Internal Server Error" }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
