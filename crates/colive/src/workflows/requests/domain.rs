use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChapterId, MaintenanceId, TransferId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: MaintenanceId,
    pub title: String,
    pub description: String,
    pub created_by: UserId,
    pub status: MaintenanceStatus,
    pub manager_notes: Option<String>,
    pub user_confirmation: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaintenanceRequest {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub user_confirmation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Approved,
    Rejected,
}

/// A coliver asking to move to another chapter mid-stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub id: TransferId,
    pub user_id: UserId,
    pub current_chapter: ChapterId,
    pub requested_chapter: ChapterId,
    /// First night at the requested chapter.
    pub start_date: NaiveDate,
    /// Last day at the current chapter.
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: TransferStatus,
    pub admin_notes: Option<String>,
    pub acknowledgment: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransferRequest {
    pub user_id: UserId,
    pub current_chapter: ChapterId,
    pub requested_chapter: ChapterId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub acknowledgment: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDecision {
    Approve,
    Reject,
}
