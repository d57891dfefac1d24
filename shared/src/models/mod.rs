//! HRMS domain models
//!
//! Wire types for the employee, timesheet and payroll endpoints.

pub mod employee;
pub mod payroll;
pub mod role;
pub mod timesheet;

pub use employee::{
    Address, ContactInfoResponse, CreateEmployeeRequest, CreateEmployeeResponse,
    DashboardResponse, DashboardStats, EmployeeInfo, EmployeeListResponse, EmployeeResponse,
    EmployeeSearchParams, EmployeeStatistics, ManagerInfo, PayFrequency, PayInfoRequest,
    PayInfoResponse, PaymentMethod, RecentActivityItem, UpdateContactInfoRequest,
    UpdateEmployeePersonalInfoRequest, UpdatePayInfoRequest,
};
pub use payroll::{
    EmployeePayrollInfo, PayPeriodInfo, PayrollPreviewResponse, PayrollResponse, PayrollStatus,
    PayrollWeekStatus, RunPayrollRequest, RunPayrollResponse,
};
pub use role::{ParseRoleError, Role, RoleSet};
pub use timesheet::{
    DenyTimesheetRequest, ManagerStatistics, ReviewerInfo, TeamTimesheetParams,
    TimesheetEntryRequest, TimesheetEntryResponse, TimesheetListResponse, TimesheetResponse,
    TimesheetStatus, UpdateTimesheetRequest,
};
