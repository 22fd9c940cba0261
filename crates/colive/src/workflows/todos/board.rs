use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use super::domain::{TaskType, Todo};
use crate::ids::TodoId;
use crate::storage::RepositoryError;
use crate::workflows::applications::Application;
use crate::workflows::payments::Payment;
use crate::workflows::requests::{MaintenanceRequest, TransferRequest, TransferStatus};

/// Days an admin has to review a payment.
const PAYMENT_REVIEW_DAYS: i64 = 2;

pub trait TodoRepository: Send + Sync {
    fn insert_todo(&self, todo: Todo) -> Result<Todo, RepositoryError>;
    /// Inserts unless a todo of the same type and reference exists, pending or completed.
    fn insert_todo_once(&self, todo: Todo) -> Result<Option<Todo>, RepositoryError>;
    fn update_todo(&self, todo: Todo) -> Result<(), RepositoryError>;
    fn fetch_todo(&self, id: &TodoId) -> Result<Option<Todo>, RepositoryError>;
    fn todos(&self) -> Result<Vec<Todo>, RepositoryError>;
    fn todos_for(
        &self,
        task_type: TaskType,
        reference_id: &str,
    ) -> Result<Vec<Todo>, RepositoryError>;
}

/// Turns domain events into admin todos.
pub struct TodoBoard<T> {
    repository: Arc<T>,
}

impl<T> Clone for TodoBoard<T> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<T> TodoBoard<T>
where
    T: TodoRepository + 'static,
{
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }

    pub fn application_created(&self, application: &Application) -> Result<Todo, RepositoryError> {
        let name = application.details.full_name();
        let todo = Todo::new(
            TaskType::ApplicationReview,
            application.id.as_str(),
            format!("Review application: {name}"),
            format!(
                "New application from {name} ({}) for {} to {}.",
                application.details.email,
                application.details.date_join,
                application.details.date_leave
            ),
        )
        .for_coliver(name);
        self.repository.insert_todo(todo)
    }

    /// Raised when a payment is requested or its proof first arrives; at most once per payment.
    pub fn payment_needs_review(
        &self,
        payment: &Payment,
        coliver_name: &str,
    ) -> Result<Option<Todo>, RepositoryError> {
        let due = (Utc::now() + Duration::days(PAYMENT_REVIEW_DAYS)).date_naive();
        let todo = Todo::new(
            TaskType::PaymentReview,
            payment.id.as_str(),
            format!("Review payment: {}", payment.description),
            format!(
                "Review payment proof for {} KRW submitted by {coliver_name}",
                payment.amount
            ),
        )
        .for_coliver(coliver_name)
        .due_on(due);

        let created = self.repository.insert_todo_once(todo)?;
        if created.is_none() {
            debug!(payment_id = %payment.id, "payment review todo already exists");
        }
        Ok(created)
    }

    pub fn payment_approved(&self, payment: &Payment) -> Result<usize, RepositoryError> {
        self.complete_pending(TaskType::PaymentReview, payment.id.as_str())
    }

    pub fn maintenance_pending(
        &self,
        request: &MaintenanceRequest,
        requester: &str,
    ) -> Result<Option<Todo>, RepositoryError> {
        let todo = Todo::new(
            TaskType::MaintenanceReview,
            request.id.as_str(),
            format!("Review maintenance request: {}", request.title),
            format!(
                "Maintenance request from {requester}:\n\nTitle: {}\nDescription: {}\n\nPlease review and update the status accordingly.",
                request.title, request.description
            ),
        )
        .for_coliver(requester);
        self.repository.insert_todo_once(todo)
    }

    pub fn maintenance_completed(&self, request: &MaintenanceRequest) -> Result<usize, RepositoryError> {
        let reviews = self.complete_pending(TaskType::MaintenanceReview, request.id.as_str())?;
        let verifications =
            self.complete_pending(TaskType::MaintenanceVerification, request.id.as_str())?;
        Ok(reviews + verifications)
    }

    pub fn transfer_pending(
        &self,
        request: &TransferRequest,
        requester: &str,
        from_chapter: &str,
        to_chapter: &str,
    ) -> Result<Option<Todo>, RepositoryError> {
        let todo = Todo::new(
            TaskType::TransferReview,
            request.id.as_str(),
            format!("Review transfer request from {requester}"),
            format!(
                "Transfer request from {requester}:\nFrom: {from_chapter}\nTo: {to_chapter}\nEnd Date at Current Chapter: {}\nStart Date at New Chapter: {}\n\nReason: {}",
                request.end_date, request.start_date, request.reason
            ),
        )
        .for_coliver(requester)
        .due_on(request.start_date);
        self.repository.insert_todo_once(todo)
    }

    /// Closes the review; an approval also opens the follow-up admin todo.
    pub fn transfer_decided(
        &self,
        request: &TransferRequest,
        requester: &str,
        from_chapter: &str,
        to_chapter: &str,
    ) -> Result<Option<Todo>, RepositoryError> {
        self.complete_pending(TaskType::TransferReview, request.id.as_str())?;
        if request.status != TransferStatus::Approved {
            return Ok(None);
        }

        let todo = Todo::new(
            TaskType::TransferReview,
            format!("{}_admin", request.id),
            format!("Process chapter transfer for {requester}"),
            format!(
                "Administrative tasks for {requester}'s approved transfer:\n\n1. Create a booking at {to_chapter} from {start} to {end}.\n2. End the booking at {from_chapter} on {start} and add a new one from {end}.\n3. Move the coliver from {from_chapter} to {to_chapter} on {start}.",
                start = request.start_date,
                end = request.end_date,
            ),
        )
        .for_coliver(requester)
        .due_on(request.start_date);
        self.repository.insert_todo_once(todo)
    }

    pub fn mark_completed(&self, id: &TodoId) -> Result<Todo, RepositoryError> {
        let mut todo = self
            .repository
            .fetch_todo(id)?
            .ok_or(RepositoryError::NotFound)?;
        if todo.mark_completed() {
            self.repository.update_todo(todo.clone())?;
            info!(todo_id = %id, "todo completed");
        }
        Ok(todo)
    }

    pub fn pending(&self) -> Result<Vec<Todo>, RepositoryError> {
        let mut todos: Vec<Todo> = self
            .repository
            .todos()?
            .into_iter()
            .filter(Todo::is_pending)
            .collect();
        todos.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.created_at.cmp(&b.created_at)));
        Ok(todos)
    }

    pub fn list(&self) -> Result<Vec<Todo>, RepositoryError> {
        let mut todos = self.repository.todos()?;
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    fn complete_pending(&self, task_type: TaskType, reference_id: &str) -> Result<usize, RepositoryError> {
        let mut completed = 0;
        for mut todo in self.repository.todos_for(task_type, reference_id)? {
            if todo.mark_completed() {
                self.repository.update_todo(todo)?;
                completed += 1;
            }
        }
        if completed > 0 {
            debug!(reference_id, task = task_type.label(), completed, "completed todos");
        }
        Ok(completed)
    }
}
