//! Timesheet Model

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::employee::EmployeeInfo;
use crate::response::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimesheetStatus {
    Draft,
    Submitted,
    Approved,
    Denied,
}

impl TimesheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
        }
    }

    /// Only drafts and denied timesheets can be edited by their owner
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Denied)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntryResponse {
    pub id: i64,
    pub work_date: NaiveDate,
    pub hours_worked: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntryRequest {
    pub work_date: NaiveDate,
    pub hours_worked: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerInfo {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetResponse {
    pub id: i64,
    pub employee: EmployeeInfo,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub total_hours: Decimal,
    pub status: TimesheetStatus,
    #[serde(default)]
    pub submitted_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub reviewed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub reviewed_by: Option<ReviewerInfo>,
    #[serde(default)]
    pub denial_reason: Option<String>,
    #[serde(default)]
    pub entries: Vec<TimesheetEntryResponse>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Row in the manager's team timesheet list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetListResponse {
    pub id: i64,
    pub employee_name: String,
    pub employee_id: String,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub total_hours: Decimal,
    pub status: TimesheetStatus,
    #[serde(default)]
    pub submitted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTimesheetRequest {
    pub entries: Vec<TimesheetEntryRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenyTimesheetRequest {
    pub reason: String,
}

/// Filters for the manager's team timesheet list
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamTimesheetParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TimesheetStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl TeamTimesheetParams {
    /// Query string pairs; the server lists submitted timesheets oldest first by default
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "status",
                self.status
                    .unwrap_or(TimesheetStatus::Submitted)
                    .as_str()
                    .to_string(),
            ),
            ("page", self.page.unwrap_or(0).to_string()),
            ("size", self.size.unwrap_or(20).to_string()),
            (
                "sort",
                self.sort.clone().unwrap_or_else(|| "submittedAt".to_string()),
            ),
            (
                "direction",
                self.direction.unwrap_or_default().as_str().to_string(),
            ),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerStatistics {
    pub direct_reports_count: u32,
    pub pending_timesheets_count: u32,
}
