//! Employee payroll (own pay statements)

use shared::models::PayrollResponse;

use super::{ServiceContext, keys};
use crate::error::ClientResult;
use crate::query::QueryOptions;

#[derive(Clone)]
pub struct PayrollService {
    ctx: ServiceContext,
}

impl PayrollService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn history(&self) -> ClientResult<Vec<PayrollResponse>> {
        self.ctx
            .query(
                keys::employee_payroll_history(),
                QueryOptions::stale_minutes(10),
                "/employee/payroll/history".into(),
                Vec::new(),
            )
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<PayrollResponse> {
        self.ctx
            .query(
                keys::employee_payroll(id),
                QueryOptions::stale_minutes(10),
                format!("/employee/payroll/{id}"),
                Vec::new(),
            )
            .await
    }
}
