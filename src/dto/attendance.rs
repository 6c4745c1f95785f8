use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    pub employee_id: i64,
    pub status: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkAttendanceRequest {
    pub work_date: NaiveDate,
    #[serde(default)]
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkAttendanceSaved {
    pub success: bool,
    pub saved: u64,
}
