//! Row types for the scheduling tables. Field names match the remote columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use occupancy_engine::calendar::ExamPeriod;
use occupancy_engine::RoomBooking;

pub const ROOMS_TABLE: &str = "tbl_rooms";
pub const BUILDINGS_TABLE: &str = "tbl_buildings";
pub const EXAM_DETAILS_TABLE: &str = "tbl_examdetails";
pub const EXAM_PERIOD_TABLE: &str = "tbl_examperiod";
pub const TERM_TABLE: &str = "tbl_term";
pub const APPROVAL_TABLE: &str = "tbl_scheduleapproval";
pub const NOTIFICATIONS_TABLE: &str = "tbl_notifications";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    pub room_name: String,
    pub room_type: String,
    #[serde(default)]
    pub room_capacity: Option<i64>,
    #[serde(default)]
    pub building_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub building_id: String,
    pub building_name: String,
}

/// One scheduled exam. Rows still being drafted may lack times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDetail {
    pub examdetails_id: i64,
    pub room_id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub section_name: Option<String>,
    #[serde(default)]
    pub exam_date: Option<String>,
    #[serde(default)]
    pub exam_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exam_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub examperiod_id: Option<i64>,
    #[serde(default)]
    pub exam_category: Option<String>,
    #[serde(default)]
    pub academic_year: Option<String>,
}

impl ExamDetail {
    /// The room booking this exam represents, if both times are set.
    pub fn to_booking(&self) -> Option<RoomBooking> {
        let (start, end) = (self.exam_start_time?, self.exam_end_time?);
        let label = match (&self.course_id, &self.section_name) {
            (Some(course), Some(section)) => Some(format!("{course} {section}")),
            (Some(course), None) => Some(course.clone()),
            (None, Some(section)) => Some(section.clone()),
            (None, None) => None,
        };
        Some(RoomBooking {
            room_id: self.room_id.clone(),
            start,
            end,
            label,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term_id: i64,
    pub term_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schedule submitted to a dean for approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleApproval {
    pub request_id: Uuid,
    pub dean_user_id: i64,
    #[serde(default)]
    pub dean_college: Option<String>,
    #[serde(default)]
    pub submitted_by: Option<i64>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    // A null status column reads as pending.
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: ApprovalStatus,
    #[serde(default)]
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub file_url: Option<String>,
}

fn status_or_pending<'de, D>(deserializer: D) -> Result<ApprovalStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<ApprovalStatus>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Fields the scheduler provides when sending a schedule to the dean.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewApprovalRequest {
    pub dean_user_id: i64,
    pub dean_college: Option<String>,
    pub submitted_by: Option<i64>,
    pub remarks: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub sender_id: Option<i64>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub receiver_id: Option<i64>,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub request_id: Option<Uuid>,
    #[serde(default, deserialize_with = "bool_or_false")]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn bool_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(Option::unwrap_or_default)
}
