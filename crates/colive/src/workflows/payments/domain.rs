use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{PaymentId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Requested,
    ProofSubmitted,
    Approved,
    Rejected,
    Cancelled,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Requested => "Payment Requested",
            PaymentStatus::ProofSubmitted => "Pending Approval",
            PaymentStatus::Approved => "Approved",
            PaymentStatus::Rejected => "Rejected",
            PaymentStatus::Cancelled => "Archived",
        }
    }

    /// Statuses that still need something from the coliver.
    pub const fn is_outstanding(self) -> bool {
        matches!(self, PaymentStatus::Requested | PaymentStatus::Rejected)
    }
}

/// Amount a coliver owes, and the proof they sent for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub description: String,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub proof_path: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub admin_notes: String,
    #[serde(default)]
    pub rejection_note: String,
    #[serde(default)]
    pub user_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn requested(
        user_id: UserId,
        amount: Decimal,
        description: impl Into<String>,
        due_date: Option<NaiveDate>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::generate(),
            user_id,
            amount,
            description: description.into(),
            status: PaymentStatus::Requested,
            payment_method: None,
            transaction_id: None,
            proof_path: None,
            due_date,
            admin_notes: String::new(),
            rejection_note: String::new(),
            user_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| today > due)
    }

    pub fn accepts_proof(&self) -> bool {
        self.status.is_outstanding()
    }
}

/// What a coliver sends when they have paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSubmission {
    pub payment_method: String,
    pub transaction_id: String,
    #[serde(default)]
    pub proof_path: Option<String>,
    #[serde(default)]
    pub user_notes: String,
}

/// A coliver's payments grouped for their dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentLedger {
    pub overdue: Vec<Payment>,
    pub upcoming: Vec<Payment>,
    pub completed: Vec<Payment>,
}

impl PaymentLedger {
    pub fn build(payments: Vec<Payment>, today: NaiveDate) -> Self {
        let mut ledger = PaymentLedger::default();
        for payment in payments {
            match payment.status {
                status if status.is_outstanding() => {
                    if payment.is_overdue(today) {
                        ledger.overdue.push(payment);
                    } else {
                        ledger.upcoming.push(payment);
                    }
                }
                PaymentStatus::ProofSubmitted | PaymentStatus::Approved => {
                    ledger.completed.push(payment)
                }
                _ => {}
            }
        }

        ledger.overdue.sort_by_key(|payment| payment.due_date);
        ledger.upcoming.sort_by_key(|payment| payment.due_date);
        ledger
            .completed
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ledger
    }

    pub fn outstanding_total(&self) -> Decimal {
        self.overdue
            .iter()
            .chain(self.upcoming.iter())
            .fold(Decimal::ZERO, |acc, payment| acc + payment.amount)
    }
}
