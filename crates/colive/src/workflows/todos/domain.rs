use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::TodoId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    ApplicationReview,
    PaymentReview,
    TransferReview,
    MaintenanceReview,
    MaintenanceVerification,
    Other,
}

impl TaskType {
    pub const fn label(self) -> &'static str {
        match self {
            TaskType::ApplicationReview => "Application Review",
            TaskType::PaymentReview => "Payment Review",
            TaskType::TransferReview => "Transfer Review",
            TaskType::MaintenanceReview => "Maintenance Review",
            TaskType::MaintenanceVerification => "Maintenance Verification",
            TaskType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    Completed,
}

/// Admin work item raised by a domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub task_type: TaskType,
    pub status: TodoStatus,
    /// Identifier of the record that raised the todo.
    pub reference_id: String,
    pub coliver_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn new(
        task_type: TaskType,
        reference_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: TodoId::generate(),
            title: title.into(),
            description: description.into(),
            task_type,
            status: TodoStatus::Pending,
            reference_id: reference_id.into(),
            coliver_name: None,
            due_date: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn for_coliver(mut self, name: impl Into<String>) -> Self {
        self.coliver_name = Some(name.into());
        self
    }

    pub fn due_on(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == TodoStatus::Pending
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_pending() && self.due_date.is_some_and(|due| due < today)
    }

    /// Returns `false` if the todo was already completed.
    pub fn mark_completed(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = TodoStatus::Completed;
        self.completed_at = Some(Utc::now());
        true
    }
}
