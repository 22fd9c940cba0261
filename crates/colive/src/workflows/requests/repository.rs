use super::domain::{MaintenanceRequest, TransferRequest};
use crate::ids::{MaintenanceId, TransferId};
use crate::storage::RepositoryError;

pub trait RequestRepository: Send + Sync {
    fn insert_maintenance(&self, request: MaintenanceRequest) -> Result<MaintenanceRequest, RepositoryError>;
    fn update_maintenance(&self, request: MaintenanceRequest) -> Result<(), RepositoryError>;
    fn fetch_maintenance(&self, id: &MaintenanceId) -> Result<Option<MaintenanceRequest>, RepositoryError>;
    fn insert_transfer(&self, request: TransferRequest) -> Result<TransferRequest, RepositoryError>;
    fn update_transfer(&self, request: TransferRequest) -> Result<(), RepositoryError>;
    fn fetch_transfer(&self, id: &TransferId) -> Result<Option<TransferRequest>, RepositoryError>;
}
