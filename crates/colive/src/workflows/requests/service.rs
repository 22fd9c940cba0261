use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    MaintenanceRequest, MaintenanceStatus, NewMaintenanceRequest, NewTransferRequest,
    TransferDecision, TransferRequest, TransferStatus,
};
use super::repository::RequestRepository;
use crate::ids::{ChapterId, MaintenanceId, TransferId, UserId};
use crate::storage::RepositoryError;
use crate::workflows::applications::ChapterRepository;
use crate::workflows::onboarding::ColiverRepository;
use crate::workflows::todos::{TodoBoard, TodoRepository};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("the maintenance request must be confirmed by the requester")]
    Unconfirmed,
    #[error("the transfer conditions must be acknowledged")]
    NotAcknowledged,
    #[error("the requested chapter must differ from the current chapter")]
    SameChapter,
    #[error("the stay at the requested chapter must end after it starts")]
    InvalidDates,
    #[error("chapter {0} does not exist")]
    UnknownChapter(ChapterId),
    #[error("request not found")]
    NotFound,
    #[error("request was already resolved")]
    AlreadyResolved,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Maintenance and chapter-transfer requests raised by colivers.
pub struct RequestService<S> {
    repository: Arc<S>,
    todos: TodoBoard<S>,
}

impl<S> RequestService<S>
where
    S: RequestRepository + ChapterRepository + ColiverRepository + TodoRepository + 'static,
{
    pub fn new(repository: Arc<S>) -> Self {
        let todos = TodoBoard::new(Arc::clone(&repository));
        Self { repository, todos }
    }

    pub fn create_maintenance(
        &self,
        request: NewMaintenanceRequest,
    ) -> Result<MaintenanceRequest, RequestError> {
        if !request.user_confirmation {
            return Err(RequestError::Unconfirmed);
        }

        let stored = self.repository.insert_maintenance(MaintenanceRequest {
            id: MaintenanceId::generate(),
            title: request.title,
            description: request.description,
            created_by: request.user_id,
            status: MaintenanceStatus::Pending,
            manager_notes: None,
            user_confirmation: true,
            created_at: Utc::now(),
            completed_at: None,
        })?;

        let requester = self.requester_name(&stored.created_by)?;
        self.todos.maintenance_pending(&stored, &requester)?;
        info!(request_id = %stored.id, "maintenance request created");
        Ok(stored)
    }

    pub fn complete_maintenance(
        &self,
        id: &MaintenanceId,
        manager_notes: Option<String>,
    ) -> Result<MaintenanceRequest, RequestError> {
        let mut request = self
            .repository
            .fetch_maintenance(id)?
            .ok_or(RequestError::NotFound)?;
        if request.status == MaintenanceStatus::Completed {
            return Err(RequestError::AlreadyResolved);
        }

        request.status = MaintenanceStatus::Completed;
        request.completed_at = Some(Utc::now());
        if manager_notes.is_some() {
            request.manager_notes = manager_notes;
        }
        self.repository.update_maintenance(request.clone())?;
        self.todos.maintenance_completed(&request)?;
        info!(request_id = %request.id, "maintenance request completed");
        Ok(request)
    }

    pub fn create_transfer(&self, request: NewTransferRequest) -> Result<TransferRequest, RequestError> {
        if !request.acknowledgment {
            return Err(RequestError::NotAcknowledged);
        }
        if request.current_chapter == request.requested_chapter {
            return Err(RequestError::SameChapter);
        }
        if request.end_date <= request.start_date {
            return Err(RequestError::InvalidDates);
        }
        let from = self.chapter_name(&request.current_chapter)?;
        let to = self.chapter_name(&request.requested_chapter)?;

        let now = Utc::now();
        let stored = self.repository.insert_transfer(TransferRequest {
            id: TransferId::generate(),
            user_id: request.user_id,
            current_chapter: request.current_chapter,
            requested_chapter: request.requested_chapter,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            status: TransferStatus::Pending,
            admin_notes: None,
            acknowledgment: true,
            created_at: now,
            updated_at: now,
        })?;

        let requester = self.requester_name(&stored.user_id)?;
        self.todos.transfer_pending(&stored, &requester, &from, &to)?;
        info!(request_id = %stored.id, from = %from, to = %to, "transfer request created");
        Ok(stored)
    }

    pub fn decide_transfer(
        &self,
        id: &TransferId,
        decision: TransferDecision,
        admin_notes: Option<String>,
    ) -> Result<TransferRequest, RequestError> {
        let mut request = self
            .repository
            .fetch_transfer(id)?
            .ok_or(RequestError::NotFound)?;
        if request.status != TransferStatus::Pending {
            return Err(RequestError::AlreadyResolved);
        }

        request.status = match decision {
            TransferDecision::Approve => TransferStatus::Approved,
            TransferDecision::Reject => TransferStatus::Rejected,
        };
        if admin_notes.is_some() {
            request.admin_notes = admin_notes;
        }
        request.updated_at = Utc::now();
        self.repository.update_transfer(request.clone())?;

        let requester = self.requester_name(&request.user_id)?;
        let from = self.chapter_name(&request.current_chapter)?;
        let to = self.chapter_name(&request.requested_chapter)?;
        self.todos.transfer_decided(&request, &requester, &from, &to)?;
        info!(request_id = %request.id, status = ?request.status, "transfer request decided");
        Ok(request)
    }

    fn chapter_name(&self, id: &ChapterId) -> Result<String, RequestError> {
        self.repository
            .chapter(id)?
            .map(|chapter| chapter.name)
            .ok_or_else(|| RequestError::UnknownChapter(id.clone()))
    }

    fn requester_name(&self, user: &UserId) -> Result<String, RepositoryError> {
        Ok(self
            .repository
            .latest_coliver_for_user(user)?
            .map(|coliver| coliver.full_name())
            .unwrap_or_else(|| user.to_string()))
    }
}
