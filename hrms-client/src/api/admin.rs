//! Administrator endpoints: employee records and payroll runs

use chrono::NaiveDate;
use serde::de::IgnoredAny;
use shared::models::{
    CreateEmployeeRequest, CreateEmployeeResponse, EmployeeListResponse, EmployeeResponse,
    EmployeeSearchParams, EmployeeStatistics, PayrollPreviewResponse, PayrollResponse,
    PayrollWeekStatus, RunPayrollRequest, RunPayrollResponse, UpdateEmployeePersonalInfoRequest,
    UpdatePayInfoRequest,
};
use shared::{MessageResponse, PageResponse};

use super::{ServiceContext, keys};
use crate::error::ClientResult;
use crate::query::QueryOptions;

#[derive(Clone)]
pub struct AdminEmployeeService {
    ctx: ServiceContext,
}

impl AdminEmployeeService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Paged employee list; defaults to 20 per page sorted by last name
    pub async fn list(
        &self,
        params: &EmployeeSearchParams,
    ) -> ClientResult<PageResponse<EmployeeListResponse>> {
        self.ctx
            .query(
                keys::all_employees(params),
                QueryOptions::stale_minutes(2),
                "/admin/employees".into(),
                params.to_query(),
            )
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<EmployeeResponse> {
        self.ctx
            .query(
                keys::employee(id),
                QueryOptions::stale_minutes(5),
                format!("/admin/employees/{id}"),
                Vec::new(),
            )
            .await
    }

    /// Create an employee; the response carries the temporary password
    pub async fn create(&self, request: CreateEmployeeRequest) -> ClientResult<CreateEmployeeResponse> {
        let api = self.ctx.api.clone();
        let created: CreateEmployeeResponse = self
            .ctx
            .queries
            .mutate(&[keys::all_employees_all()], || {
                api.post::<CreateEmployeeResponse, _>("/admin/employees", &request)
            })
            .await?;
        tracing::info!(id = created.id, employee_id = %created.employee_id, "Employee created");
        Ok(created)
    }

    pub async fn update_personal_info(
        &self,
        id: i64,
        request: UpdateEmployeePersonalInfoRequest,
    ) -> ClientResult<MessageResponse> {
        let api = self.ctx.api.clone();
        let path = format!("/admin/employees/{id}/personal-info");
        self.ctx
            .queries
            .mutate(&[keys::employee(id), keys::all_employees_all()], || {
                api.put::<MessageResponse, _>(&path, &request)
            })
            .await
    }

    pub async fn update_pay_info(
        &self,
        id: i64,
        request: UpdatePayInfoRequest,
    ) -> ClientResult<MessageResponse> {
        let api = self.ctx.api.clone();
        let path = format!("/admin/employees/{id}/pay-info");
        self.ctx
            .queries
            .mutate(&[keys::employee(id)], || api.put::<MessageResponse, _>(&path, &request))
            .await
    }

    /// Active managers, for assigning reports
    pub async fn active_managers(&self) -> ClientResult<Vec<EmployeeResponse>> {
        self.ctx
            .query(
                keys::active_managers(),
                QueryOptions::stale_minutes(10),
                "/admin/employees/managers".into(),
                Vec::new(),
            )
            .await
    }

    pub async fn statistics(&self) -> ClientResult<EmployeeStatistics> {
        self.ctx
            .query(
                keys::employee_statistics(),
                QueryOptions::stale_minutes(5),
                "/admin/employees/statistics/count-by-role".into(),
                Vec::new(),
            )
            .await
    }
}

#[derive(Clone)]
pub struct AdminPayrollService {
    ctx: ServiceContext,
}

impl AdminPayrollService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// What a payroll run for the week would pay out
    pub async fn preview(&self, week_start: NaiveDate) -> ClientResult<PayrollPreviewResponse> {
        self.ctx
            .query(
                keys::payroll_preview(week_start),
                QueryOptions::stale_minutes(1),
                "/admin/payroll/preview".into(),
                vec![("weekStartDate", week_start.to_string())],
            )
            .await
    }

    pub async fn run(&self, request: RunPayrollRequest) -> ClientResult<RunPayrollResponse> {
        let api = self.ctx.api.clone();
        tracing::info!(week_start = %request.week_start_date, "Running payroll");
        let response: RunPayrollResponse = self
            .ctx
            .queries
            .mutate(&[keys::payroll_history_all(), keys::current_week_status()], || {
                api.post::<RunPayrollResponse, _>("/admin/payroll/run", &request)
            })
            .await?;
        tracing::info!(processed = response.processed_count, "Payroll run complete");
        Ok(response)
    }

    pub async fn get(&self, id: i64) -> ClientResult<PayrollResponse> {
        self.ctx
            .query(
                keys::payroll(id),
                QueryOptions::stale_minutes(5),
                format!("/admin/payroll/{id}"),
                Vec::new(),
            )
            .await
    }

    pub async fn history(&self, start: NaiveDate, end: NaiveDate) -> ClientResult<Vec<PayrollResponse>> {
        self.ctx
            .query(
                keys::payroll_history(start, end),
                QueryOptions::stale_minutes(5),
                "/admin/payroll/history".into(),
                vec![("startDate", start.to_string()), ("endDate", end.to_string())],
            )
            .await
    }

    pub async fn mark_paid(&self, id: i64) -> ClientResult<()> {
        let api = self.ctx.api.clone();
        let path = format!("/admin/payroll/{id}/mark-paid");
        self.ctx
            .queries
            .mutate(&[keys::payroll(id), keys::payroll_history_all()], || {
                api.patch_empty::<IgnoredAny>(&path)
            })
            .await?;
        tracing::info!(payroll_id = id, "Payroll marked as paid");
        Ok(())
    }

    pub async fn current_week_status(&self) -> ClientResult<PayrollWeekStatus> {
        self.ctx
            .query(
                keys::current_week_status(),
                QueryOptions::stale_minutes(2),
                "/admin/payroll/current-week".into(),
                Vec::new(),
            )
            .await
    }
}
