//! Maintenance and chapter-transfer requests; each feeds the admin todo board.

mod domain;
mod repository;
mod router;
mod service;

pub use domain::{
    MaintenanceRequest, MaintenanceStatus, NewMaintenanceRequest, NewTransferRequest,
    TransferDecision, TransferRequest, TransferStatus,
};
pub use repository::RequestRepository;
pub use router::request_router;
pub use service::{RequestError, RequestService};

#[cfg(test)]
mod tests;
