//! Employee self-service endpoints (all roles)

use shared::MessageResponse;
use shared::models::{
    ContactInfoResponse, DashboardResponse, EmployeeResponse, PayInfoResponse,
    UpdateContactInfoRequest,
};

use super::{ServiceContext, keys};
use crate::error::ClientResult;
use crate::query::QueryOptions;

#[derive(Clone)]
pub struct EmployeeService {
    ctx: ServiceContext,
}

impl EmployeeService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn dashboard(&self) -> ClientResult<DashboardResponse> {
        self.ctx
            .query(keys::dashboard(), QueryOptions::stale_minutes(5), "/employee/dashboard".into(), Vec::new())
            .await
    }

    pub async fn personal_info(&self) -> ClientResult<EmployeeResponse> {
        self.ctx
            .query(
                keys::personal_info(),
                QueryOptions::stale_minutes(10),
                "/employee/personal-info".into(),
                Vec::new(),
            )
            .await
    }

    pub async fn pay_info(&self) -> ClientResult<PayInfoResponse> {
        self.ctx
            .query(keys::pay_info(), QueryOptions::stale_minutes(10), "/employee/pay-info".into(), Vec::new())
            .await
    }

    pub async fn contact_info(&self) -> ClientResult<ContactInfoResponse> {
        self.ctx
            .query(
                keys::contact_info(),
                QueryOptions::stale_minutes(10),
                "/employee/contact-info".into(),
                Vec::new(),
            )
            .await
    }

    pub async fn profile(&self) -> ClientResult<EmployeeResponse> {
        self.ctx
            .query(keys::profile(), QueryOptions::stale_minutes(10), "/employee/profile".into(), Vec::new())
            .await
    }

    pub async fn update_contact_info(
        &self,
        request: UpdateContactInfoRequest,
    ) -> ClientResult<MessageResponse> {
        let api = self.ctx.api.clone();
        self.ctx
            .queries
            .mutate(&[keys::contact_info()], || {
                api.put::<MessageResponse, _>("/employee/contact-info", &request)
            })
            .await
    }
}
