use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::model::summary::AttendanceSummary;
use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Emitted once per committed scan, after the attendance row and its
/// summary are both persisted. Live-UI broadcasters subscribe to this;
/// nothing in the scan pipeline depends on anyone listening.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceUpdated {
    pub event_id: String,
    pub employee: Employee,
    pub attendance: Attendance,
    pub summary: AttendanceSummary,
    pub timestamp: NaiveDateTime,
}

impl AttendanceUpdated {
    pub fn new(
        employee: Employee,
        attendance: Attendance,
        summary: AttendanceSummary,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            employee,
            attendance,
            summary,
            timestamp,
        }
    }
}

#[derive(Clone)]
pub struct AttendanceBroadcaster {
    tx: broadcast::Sender<AttendanceUpdated>,
}

impl AttendanceBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fire-and-forget; a send with no subscribers is not an error.
    pub fn publish(&self, event: AttendanceUpdated) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AttendanceUpdated> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{AttendanceStatus, DayType};
    use crate::model::employee::EmployeeStatus;
    use crate::model::summary::{SegmentMark, SummaryStatus};
    use chrono::{NaiveDate, NaiveTime};

    fn event() -> AttendanceUpdated {
        let date = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        AttendanceUpdated::new(
            Employee {
                id: 1,
                rfid_tag: "04A2B9C1".to_string(),
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                email: "john@email.com".to_string(),
                contact_number: None,
                hire_date: None,
                status: EmployeeStatus::Active,
            },
            Attendance {
                id: 1,
                employee_id: 1,
                date,
                morning_in: Some(NaiveTime::from_hms_opt(8, 0, 0).unwrap()),
                lunch_out: None,
                afternoon_in: None,
                afternoon_out: None,
                evening_in: None,
                evening_out: None,
                day_type: DayType::Regular,
                status: AttendanceStatus::Present,
                work_hours: 0.0,
            },
            AttendanceSummary {
                id: 1,
                employee_id: 1,
                date,
                morning_status: SegmentMark::Done,
                afternoon_status: SegmentMark::Pending,
                evening_status: SegmentMark::Pending,
                final_status: SummaryStatus::Present,
                total_work_hours: 0.0,
                is_manual_edit: false,
                remarks: None,
            },
            date.and_hms_opt(8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn subscribers_receive_published_events() {
        let broadcaster = AttendanceBroadcaster::new(4);
        let mut rx = broadcaster.subscribe();

        let sent = event();
        let event_id = sent.event_id.clone();
        broadcaster.publish(sent);

        let received = rx.try_recv().unwrap();
        assert_eq!(received.event_id, event_id);
        assert_eq!(received.employee.id, 1);
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let broadcaster = AttendanceBroadcaster::new(4);
        broadcaster.publish(event());
    }
}
