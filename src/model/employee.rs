use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Resigned,
    Banned,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "rfid_tag": "04A2B9C1",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "contact_number": "+639171234567",
        "hire_date": "2024-01-01",
        "status": "Active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "04A2B9C1")]
    pub rfid_tag: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+639171234567", nullable = true)]
    pub contact_number: Option<String>,

    #[schema(
        example = "2024-01-01",
        value_type = String,
        format = "date",
        nullable = true
    )]
    pub hire_date: Option<NaiveDate>,

    #[schema(example = "Active")]
    pub status: EmployeeStatus,
}
