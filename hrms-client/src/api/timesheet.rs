//! Employee timesheet endpoints

use shared::MessageResponse;
use shared::models::{TimesheetResponse, UpdateTimesheetRequest};

use super::{ServiceContext, keys};
use crate::error::ClientResult;
use crate::query::QueryOptions;

#[derive(Clone)]
pub struct TimesheetService {
    ctx: ServiceContext,
}

impl TimesheetService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// This week's timesheet, created server-side on first access
    pub async fn current(&self) -> ClientResult<TimesheetResponse> {
        self.ctx
            .query(
                keys::current_timesheet(),
                QueryOptions::stale_minutes(2),
                "/employee/timesheet/current".into(),
                Vec::new(),
            )
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<TimesheetResponse> {
        self.ctx
            .query(
                keys::timesheet(id),
                QueryOptions::stale_minutes(5),
                format!("/employee/timesheet/{id}"),
                Vec::new(),
            )
            .await
    }

    pub async fn history(&self) -> ClientResult<Vec<TimesheetResponse>> {
        self.ctx
            .query(
                keys::timesheet_history(),
                QueryOptions::stale_minutes(5),
                "/employee/timesheet/history".into(),
                Vec::new(),
            )
            .await
    }

    /// Replace the entries of a draft or denied timesheet
    pub async fn update(
        &self,
        id: i64,
        request: UpdateTimesheetRequest,
    ) -> ClientResult<TimesheetResponse> {
        let api = self.ctx.api.clone();
        let path = format!("/employee/timesheet/{id}");
        self.ctx
            .queries
            .mutate(
                &[keys::current_timesheet(), keys::timesheet(id), keys::timesheet_history()],
                || api.put::<TimesheetResponse, _>(&path, &request),
            )
            .await
    }

    /// Send a timesheet to the manager for approval
    pub async fn submit(&self, id: i64) -> ClientResult<MessageResponse> {
        let api = self.ctx.api.clone();
        let path = format!("/employee/timesheet/{id}/submit");
        tracing::info!(timesheet_id = id, "Submitting timesheet");
        self.ctx
            .queries
            .mutate(&[keys::current_timesheet(), keys::timesheet_history()], || {
                api.post_empty::<MessageResponse>(&path)
            })
            .await
    }
}
