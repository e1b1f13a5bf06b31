pub mod access;
pub mod application_service;
pub mod contract_service;
pub mod dispute_service;
pub mod error;
pub mod job_service;
pub mod rating_service;

#[cfg(test)]
pub mod test_support;

use uuid::Uuid;

use crate::{db::MarketStore, dtos::marketdtos::UserSummaryDto};

pub(crate) async fn user_summary(
    db_client: &dyn MarketStore,
    user_id: Uuid,
) -> Result<Option<UserSummaryDto>, sqlx::Error> {
    let user = db_client.get_user(Some(user_id), None).await?;
    Ok(user.as_ref().map(UserSummaryDto::from_user))
}
