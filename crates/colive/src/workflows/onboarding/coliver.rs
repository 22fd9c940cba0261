use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{ChapterId, ColiverId, UserId};
use crate::pricing::Chapter;
use crate::storage::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColiverStatus {
    #[default]
    Onboarding,
    Coliving,
    Application,
}

/// Resident record created once an application reaches onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coliver {
    pub id: ColiverId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
    pub chapter_id: Option<ChapterId>,
    /// Used instead of the chapter price only when greater than zero.
    pub manual_cost: Option<Decimal>,
    pub is_active: bool,
    pub status: ColiverStatus,
    pub created_at: DateTime<Utc>,
}

/// Identity under which repeated onboarding of the same stay resolves to one coliver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColiverKey {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
}

impl Coliver {
    pub fn key(&self) -> ColiverKey {
        ColiverKey {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            arrival_date: self.arrival_date,
            departure_date: self.departure_date,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn nights(&self) -> i64 {
        (self.departure_date - self.arrival_date).num_days().max(0)
    }

    /// Stay cost without member or guest adjustments.
    pub fn calculate_cost(&self, chapter: Option<&Chapter>) -> Decimal {
        if let Some(manual) = self.manual_cost.filter(|cost| *cost > Decimal::ZERO) {
            return manual;
        }
        match chapter {
            Some(chapter) => chapter.calculate_tiered_cost(self.nights()).round_dp(2),
            None => Decimal::ZERO,
        }
    }

    /// Whether a change from `previous` affects the amounts of its automatic payments.
    pub fn payment_fields_changed(&self, previous: &Coliver) -> bool {
        self.arrival_date != previous.arrival_date
            || self.departure_date != previous.departure_date
            || self.chapter_id != previous.chapter_id
            || self.manual_cost != previous.manual_cost
    }
}

pub trait ColiverRepository: Send + Sync {
    /// Insert `candidate` unless a coliver with the same key exists, in which case `refresh`
    /// is applied to the stored one. Returns the stored coliver and whether it was created.
    fn upsert_coliver(
        &self,
        candidate: Coliver,
        refresh: &dyn Fn(&mut Coliver),
    ) -> Result<(Coliver, bool), RepositoryError>;
    fn update_coliver(&self, coliver: Coliver) -> Result<(), RepositoryError>;
    fn fetch_coliver(&self, id: &ColiverId) -> Result<Option<Coliver>, RepositoryError>;
    fn colivers(&self) -> Result<Vec<Coliver>, RepositoryError>;
    fn latest_coliver_for_user(&self, user: &UserId) -> Result<Option<Coliver>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coliver(manual_cost: Option<Decimal>) -> Coliver {
        Coliver {
            id: ColiverId::from("col-1"),
            user_id: UserId::from("usr-1"),
            first_name: "Mina".to_string(),
            last_name: "Park".to_string(),
            email: "mina@example.com".to_string(),
            arrival_date: NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid"),
            departure_date: NaiveDate::from_ymd_opt(2025, 5, 11).expect("valid"),
            chapter_id: Some(ChapterId::from("chp-a")),
            manual_cost,
            is_active: true,
            status: ColiverStatus::Onboarding,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn zero_manual_cost_falls_back_to_chapter_price() {
        let chapter = Chapter::flat(ChapterId::from("chp-a"), "A", Decimal::from(10_000));
        assert_eq!(
            coliver(Some(Decimal::ZERO)).calculate_cost(Some(&chapter)),
            Decimal::from(100_000)
        );
        assert_eq!(
            coliver(Some(Decimal::from(5))).calculate_cost(Some(&chapter)),
            Decimal::from(5)
        );
        assert_eq!(coliver(None).calculate_cost(None), Decimal::ZERO);
    }

    #[test]
    fn detects_payment_relevant_changes() {
        let before = coliver(None);
        let mut after = before.clone();
        after.email = "new@example.com".to_string();
        assert!(!after.payment_fields_changed(&before));

        after.manual_cost = Some(Decimal::ONE);
        assert!(after.payment_fields_changed(&before));
    }
}
