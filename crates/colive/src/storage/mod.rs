//! Repository errors shared by every workflow, and the in-memory store backing them.

mod memory;

pub use memory::InMemoryStore;

use crate::workflows::applications::{
    ApplicationRepository, ChapterRepository, QuestionRepository,
};
use crate::workflows::onboarding::ColiverRepository;
use crate::workflows::payments::PaymentRepository;
use crate::workflows::requests::RequestRepository;
use crate::workflows::todos::TodoRepository;

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Every repository the workflows need, implemented by one backend.
pub trait ColivingStore:
    ApplicationRepository
    + ChapterRepository
    + QuestionRepository
    + ColiverRepository
    + PaymentRepository
    + TodoRepository
    + RequestRepository
{
}

impl<T> ColivingStore for T where
    T: ApplicationRepository
        + ChapterRepository
        + QuestionRepository
        + ColiverRepository
        + PaymentRepository
        + TodoRepository
        + RequestRepository
{
}
