//! Payroll Model
//!
//! Amounts are computed server-side; the client only displays them.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::employee::EmployeeInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollStatus {
    Preview,
    Processed,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollResponse {
    pub id: i64,
    pub employee: EmployeeInfo,
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    pub gross_pay: Decimal,
    pub net_pay: Decimal,
    pub tax_deduction: Decimal,
    pub other_deductions: Decimal,
    pub bonus: Decimal,
    pub status: PayrollStatus,
    #[serde(default)]
    pub processed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub processed_by: Option<String>,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPeriodInfo {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayrollInfo {
    pub employee_id: String,
    pub name: String,
    pub hours_worked: Decimal,
    pub gross_pay: Decimal,
    pub tax_deduction: Decimal,
    pub other_deductions: Decimal,
    pub bonus: Decimal,
    pub net_pay: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollPreviewResponse {
    pub pay_period: PayPeriodInfo,
    #[serde(default)]
    pub employees: Vec<EmployeePayrollInfo>,
    pub total_gross_pay: Decimal,
    pub total_net_pay: Decimal,
    pub employee_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPayrollRequest {
    pub week_start_date: NaiveDate,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPayrollResponse {
    pub message: String,
    pub processed_count: u32,
    pub total_amount: Decimal,
    pub processed_at: NaiveDateTime,
}

/// Payroll state of the current week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollWeekStatus {
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub employee_count: u32,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    pub processed: bool,
    #[serde(default)]
    pub message: Option<String>,
}
