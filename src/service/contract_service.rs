// service/contract_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::MarketStore,
    models::{
        marketmodel::*,
        usermodel::{User, UserRole},
    },
    service::{
        access::{require_role, CLIENT_ONLY, PARTICIPANTS},
        error::ServiceError,
    },
};

#[derive(Debug, Clone)]
pub struct ContractService {
    db_client: Arc<dyn MarketStore>,
}

impl ContractService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    /// Active contracts where the caller is the client or the freelancer,
    /// depending on their role.
    pub async fn list_active_contracts(
        &self,
        principal: &User,
    ) -> Result<Vec<Contract>, ServiceError> {
        require_role(principal, PARTICIPANTS)?;

        let contracts = match principal.role {
            UserRole::Client => self.db_client.get_active_contracts(Some(principal.id), None).await?,
            _ => self.db_client.get_active_contracts(None, Some(principal.id)).await?,
        };
        Ok(contracts)
    }

    pub async fn complete_contract(
        &self,
        contract_id: Uuid,
        client: &User,
    ) -> Result<Contract, ServiceError> {
        self.close(contract_id, client, ContractStatus::Completed).await
    }

    pub async fn terminate_contract(
        &self,
        contract_id: Uuid,
        client: &User,
    ) -> Result<Contract, ServiceError> {
        self.close(contract_id, client, ContractStatus::Cancelled).await
    }

    async fn close(
        &self,
        contract_id: Uuid,
        client: &User,
        status: ContractStatus,
    ) -> Result<Contract, ServiceError> {
        require_role(client, CLIENT_ONLY)?;

        let contract = self
            .db_client
            .get_contract_by_id(contract_id)
            .await?
            .ok_or(ServiceError::ContractNotFound(contract_id))?;

        if contract.client_id != client.id {
            return Err(ServiceError::UnauthorizedContractAccess(client.id, contract_id));
        }
        if contract.status != ContractStatus::Active {
            return Err(ServiceError::InvalidContractStatus(contract_id, contract.status));
        }

        let closed = self
            .db_client
            .close_contract(contract_id, status)
            .await?
            .ok_or(ServiceError::InvalidContractStatus(contract_id, contract.status))?;

        if let Some(job_status) = status.closing_job_status() {
            if self
                .db_client
                .update_job_status(closed.job_id, job_status)
                .await?
                .is_none()
            {
                tracing::warn!(
                    "Contract {} closed but its job {} no longer exists",
                    contract_id,
                    closed.job_id
                );
            }
        }

        tracing::info!(
            "Contract {} closed as '{}' by client {}",
            contract_id,
            status.to_str(),
            client.id
        );
        Ok(closed)
    }
}
