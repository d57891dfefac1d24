//! Query keys
//!
//! Roots without arguments double as invalidation prefixes, e.g.
//! [`team_timesheets_all`] matches every page of [`team_timesheets`].

use chrono::NaiveDate;
use shared::models::{EmployeeSearchParams, TeamTimesheetParams};

use crate::query::QueryKey;

// Employee self-service
pub fn dashboard() -> QueryKey {
    QueryKey::new("dashboard")
}

pub fn personal_info() -> QueryKey {
    QueryKey::new("personalInfo")
}

pub fn pay_info() -> QueryKey {
    QueryKey::new("payInfo")
}

pub fn contact_info() -> QueryKey {
    QueryKey::new("contactInfo")
}

pub fn profile() -> QueryKey {
    QueryKey::new("profile")
}

// Timesheets
pub fn current_timesheet() -> QueryKey {
    QueryKey::new("currentTimesheet")
}

pub fn timesheet(id: i64) -> QueryKey {
    QueryKey::new("timesheet").with(id)
}

pub fn timesheet_history() -> QueryKey {
    QueryKey::new("timesheetHistory")
}

// Employee payroll
pub fn employee_payroll_history() -> QueryKey {
    QueryKey::new("employeePayrollHistory")
}

pub fn employee_payroll(id: i64) -> QueryKey {
    QueryKey::new("employeePayroll").with(id)
}

// Manager
pub fn direct_reports() -> QueryKey {
    QueryKey::new("directReports")
}

pub fn team_timesheets_all() -> QueryKey {
    QueryKey::new("teamTimesheets")
}

pub fn team_timesheets(params: &TeamTimesheetParams) -> QueryKey {
    team_timesheets_all().with_json(params)
}

pub fn pending_timesheets_count() -> QueryKey {
    QueryKey::new("pendingTimesheetsCount")
}

pub fn manager_statistics() -> QueryKey {
    QueryKey::new("managerStatistics")
}

// Admin
pub fn all_employees_all() -> QueryKey {
    QueryKey::new("allEmployees")
}

pub fn all_employees(params: &EmployeeSearchParams) -> QueryKey {
    all_employees_all().with_json(params)
}

pub fn employee(id: i64) -> QueryKey {
    QueryKey::new("employee").with(id)
}

pub fn active_managers() -> QueryKey {
    QueryKey::new("activeManagers")
}

pub fn employee_statistics() -> QueryKey {
    QueryKey::new("employeeStatistics")
}

pub fn payroll_preview(week_start: NaiveDate) -> QueryKey {
    QueryKey::new("payrollPreview").with(week_start)
}

pub fn payroll(id: i64) -> QueryKey {
    QueryKey::new("payroll").with(id)
}

pub fn payroll_history_all() -> QueryKey {
    QueryKey::new("payrollHistory")
}

pub fn payroll_history(start: NaiveDate, end: NaiveDate) -> QueryKey {
    payroll_history_all().with(start).with(end)
}

pub fn current_week_status() -> QueryKey {
    QueryKey::new("currentWeekStatus")
}

// Auth
pub fn requires_password_reset() -> QueryKey {
    QueryKey::new("requiresPasswordReset")
}
