use crate::api::attendance::{
    AttendanceListResponse, AttendanceRow, HistoryQuery, ScanRequest, TodayQuery,
};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::schedule::CreateSchedule;
use crate::api::summary::{
    DailyCell, MonthlyQuery, MonthlySummary, SummaryListResponse, SummaryQuery, SummaryRow,
};
use crate::model::attendance::{Attendance, AttendanceStatus, DayType};
use crate::model::employee::{Employee, EmployeeStatus};
use crate::model::schedule::Schedule;
use crate::model::summary::{AttendanceSummary, SegmentMark, SummaryStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RFID Attendance API",
        version = "1.0.0",
        description = r#"
## RFID Attendance Tracking Service

Employees scan an RFID tag; the server classifies the scan against the
active work schedule, updates the day's attendance record, and keeps a
per-employee daily summary in sync.

### 🔹 Key Features
- **Scan ingestion**
  - Window classification, duplicate suppression, lateness derivation
- **Attendance**
  - Today view and filterable history
- **Daily summaries**
  - Per-segment ✓/x marks, monthly grids, manual overrides
- **Schedules**
  - Shift windows with tolerance; single-active activation

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::scan,
        crate::api::attendance::list_today,
        crate::api::attendance::history,
        crate::api::attendance::events,

        crate::api::summary::list_for_date,
        crate::api::summary::monthly,
        crate::api::summary::manual_edit,

        crate::api::schedule::list_schedules,
        crate::api::schedule::create_schedule,
        crate::api::schedule::activate_schedule,
        crate::api::schedule::update_schedule,
        crate::api::schedule::delete_schedule,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            ScanRequest,
            TodayQuery,
            HistoryQuery,
            AttendanceRow,
            AttendanceListResponse,
            SummaryQuery,
            SummaryRow,
            SummaryListResponse,
            MonthlyQuery,
            MonthlySummary,
            DailyCell,
            CreateSchedule,
            Schedule,
            CreateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeStatus,
            EmployeeListResponse,
            Attendance,
            AttendanceStatus,
            DayType,
            AttendanceSummary,
            SegmentMark,
            SummaryStatus
        )
    ),
    tags(
        (name = "Attendance", description = "Scan ingestion and attendance views"),
        (name = "Summary", description = "Daily summary APIs"),
        (name = "Schedule", description = "Shift schedule management APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;
