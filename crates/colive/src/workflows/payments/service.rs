use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::domain::{Payment, PaymentLedger, PaymentStatus, ProofSubmission};
use super::repository::PaymentRepository;
use crate::ids::{PaymentId, UserId};
use crate::storage::RepositoryError;
use crate::workflows::onboarding::ColiverRepository;
use crate::workflows::todos::{TodoBoard, TodoRepository};

/// Proof submission and admin review of coliver payments.
pub struct PaymentService<S> {
    repository: Arc<S>,
    todos: TodoBoard<S>,
}

impl<S> PaymentService<S>
where
    S: PaymentRepository + TodoRepository + ColiverRepository + 'static,
{
    pub fn new(repository: Arc<S>) -> Self {
        let todos = TodoBoard::new(Arc::clone(&repository));
        Self { repository, todos }
    }

    pub fn get(&self, id: &PaymentId) -> Result<Payment, PaymentError> {
        self.repository
            .fetch_payment(id)?
            .ok_or(PaymentError::NotFound)
    }

    pub fn submit_proof(
        &self,
        id: &PaymentId,
        user: &UserId,
        proof: ProofSubmission,
    ) -> Result<Payment, PaymentError> {
        let mut payment = self.get(id)?;
        if &payment.user_id != user {
            return Err(PaymentError::Forbidden);
        }
        if !payment.accepts_proof() {
            return Err(PaymentError::ProofNotAccepted(payment.status));
        }

        let transaction_id = proof.transaction_id.trim().to_string();
        if transaction_id.is_empty() {
            return Err(PaymentError::MissingTransactionId);
        }

        payment.payment_method = Some(proof.payment_method);
        payment.transaction_id = Some(transaction_id.clone());
        payment.proof_path = proof.proof_path;
        payment.user_notes = proof.user_notes;
        payment.status = PaymentStatus::ProofSubmitted;
        payment.updated_at = Utc::now();

        match self.repository.update_payment(payment.clone()) {
            Ok(()) => {}
            Err(RepositoryError::Conflict) => {
                return Err(PaymentError::DuplicateTransactionId(transaction_id))
            }
            Err(other) => return Err(other.into()),
        }
        info!(payment_id = %payment.id, "payment proof submitted");

        let name = self.coliver_name(&payment.user_id)?;
        self.todos.payment_needs_review(&payment, &name)?;
        Ok(payment)
    }

    pub fn approve(&self, id: &PaymentId, admin_notes: Option<String>) -> Result<Payment, PaymentError> {
        let mut payment = self.get(id)?;
        if matches!(payment.status, PaymentStatus::Approved | PaymentStatus::Cancelled) {
            return Err(PaymentError::InvalidTransition {
                status: payment.status,
                action: "approved",
            });
        }

        payment.status = PaymentStatus::Approved;
        if let Some(notes) = admin_notes {
            payment.admin_notes = notes;
        }
        payment.updated_at = Utc::now();
        self.repository.update_payment(payment.clone())?;

        let completed = self.todos.payment_approved(&payment)?;
        info!(payment_id = %payment.id, completed_todos = completed, "payment approved");
        Ok(payment)
    }

    pub fn reject(&self, id: &PaymentId, note: String) -> Result<Payment, PaymentError> {
        let mut payment = self.get(id)?;
        if !matches!(
            payment.status,
            PaymentStatus::Requested | PaymentStatus::ProofSubmitted
        ) {
            return Err(PaymentError::InvalidTransition {
                status: payment.status,
                action: "rejected",
            });
        }

        payment.status = PaymentStatus::Rejected;
        payment.rejection_note = note;
        payment.updated_at = Utc::now();
        self.repository.update_payment(payment.clone())?;
        warn!(payment_id = %payment.id, "payment proof rejected");
        Ok(payment)
    }

    pub fn ledger_for_user(&self, user: &UserId, today: NaiveDate) -> Result<PaymentLedger, PaymentError> {
        let payments = self.repository.payments_for_user(user)?;
        Ok(PaymentLedger::build(payments, today))
    }

    fn coliver_name(&self, user: &UserId) -> Result<String, RepositoryError> {
        Ok(self
            .repository
            .latest_coliver_for_user(user)?
            .map(|coliver| coliver.full_name())
            .unwrap_or_else(|| user.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment not found")]
    NotFound,
    #[error("payment belongs to another user")]
    Forbidden,
    #[error("payment is {} and does not accept proof", .0.label())]
    ProofNotAccepted(PaymentStatus),
    #[error("a transaction id is required")]
    MissingTransactionId,
    #[error("transaction id {0} is already used by another payment")]
    DuplicateTransactionId(String),
    #[error("payment is {} and cannot be {action}", .status.label())]
    InvalidTransition {
        status: PaymentStatus,
        action: &'static str,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
