// hrms-client/src/api/manager.rs
// 经理服务 - 下属、团队工时审批

use shared::models::{
    DenyTimesheetRequest, EmployeeResponse, ManagerStatistics, TeamTimesheetParams,
    TimesheetListResponse, TimesheetResponse,
};
use shared::{MessageResponse, PageResponse};

use super::{ServiceContext, keys};
use crate::error::{ClientError, ClientResult};
use crate::query::{QueryKey, QueryOptions};

#[derive(Clone)]
pub struct ManagerService {
    ctx: ServiceContext,
}

impl ManagerService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn direct_reports(&self) -> ClientResult<Vec<EmployeeResponse>> {
        self.ctx
            .query(
                keys::direct_reports(),
                QueryOptions::stale_minutes(5),
                "/manager/employees".into(),
                Vec::new(),
            )
            .await
    }

    /// Timesheets of direct reports, submitted ones oldest first by default
    pub async fn team_timesheets(
        &self,
        params: &TeamTimesheetParams,
    ) -> ClientResult<PageResponse<TimesheetListResponse>> {
        self.ctx
            .query(
                keys::team_timesheets(params),
                QueryOptions::stale_minutes(2),
                "/manager/timesheets".into(),
                params.to_query(),
            )
            .await
    }

    /// One report's timesheet; not cached
    pub async fn timesheet(&self, id: i64) -> ClientResult<TimesheetResponse> {
        self.ctx
            .api
            .get(&format!("/manager/timesheets/{id}"))
            .await
    }

    pub async fn pending_count(&self) -> ClientResult<u64> {
        self.ctx
            .query(
                keys::pending_timesheets_count(),
                QueryOptions::stale_minutes(1),
                "/manager/timesheets/pending/count".into(),
                Vec::new(),
            )
            .await
    }

    pub async fn statistics(&self) -> ClientResult<ManagerStatistics> {
        self.ctx
            .query(
                keys::manager_statistics(),
                QueryOptions::stale_minutes(5),
                "/manager/statistics".into(),
                Vec::new(),
            )
            .await
    }

    pub async fn approve(&self, id: i64) -> ClientResult<MessageResponse> {
        let api = self.ctx.api.clone();
        let path = format!("/manager/timesheets/{id}/approve");
        tracing::info!(timesheet_id = id, "Approving timesheet");
        self.ctx
            .queries
            .mutate(&review_invalidations(), || api.post_empty::<MessageResponse>(&path))
            .await
    }

    /// Deny with a reason; blank reasons are rejected before any request
    pub async fn deny(&self, id: i64, reason: impl Into<String>) -> ClientResult<MessageResponse> {
        let request = DenyTimesheetRequest {
            reason: reason.into(),
        };
        if request.reason.trim().is_empty() {
            return Err(ClientError::Validation {
                status: 400,
                message: "A reason is required to deny a timesheet".into(),
                field_errors: [("reason".to_string(), "must not be blank".to_string())].into(),
            });
        }

        let api = self.ctx.api.clone();
        let path = format!("/manager/timesheets/{id}/deny");
        tracing::info!(timesheet_id = id, "Denying timesheet");
        self.ctx
            .queries
            .mutate(&review_invalidations(), || api.post::<MessageResponse, _>(&path, &request))
            .await
    }
}

fn review_invalidations() -> [QueryKey; 3] {
    [
        keys::team_timesheets_all(),
        keys::pending_timesheets_count(),
        keys::manager_statistics(),
    ]
}
