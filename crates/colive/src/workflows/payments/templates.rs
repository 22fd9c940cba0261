use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{ColiverId, PaymentId, TemplateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountType {
    Fixed,
    #[default]
    TotalCost,
    PercentageCost,
}

/// Resolved amount rule of a correctly configured template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRule {
    Fixed(Decimal),
    TotalCost,
    PercentageOfCost(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueDateAnchor {
    #[default]
    Arrival,
    Departure,
    /// `days_offset` after arrival.
    CustomOffset,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template '{0}' is a fixed amount template without an amount")]
    MissingFixedAmount(String),
    #[error("template '{0}' is a percentage template without a percentage")]
    MissingPercentage(String),
    #[error("template '{title}' moves the due date {offset} days outside the calendar")]
    DueDateOutOfRange { title: String, offset: i64 },
}

/// Recipe for a payment requested from every onboarded coliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticPaymentTemplate {
    pub id: TemplateId,
    pub title: String,
    /// Supports `{coliver_name}`, `{chapter_name}`, `{arrival_date}`, `{departure_date}`.
    pub description_template: String,
    #[serde(default)]
    pub date_type: DueDateAnchor,
    #[serde(default)]
    pub days_offset: i64,
    #[serde(default)]
    pub amount_type: AmountType,
    #[serde(default)]
    pub fixed_amount: Option<Decimal>,
    #[serde(default)]
    pub percentage: Option<Decimal>,
    pub is_active: bool,
    pub applies_to_all_colivers: bool,
}

/// Coliver facts a template needs to produce a payment.
#[derive(Debug, Clone, Copy)]
pub struct PaymentContext<'a> {
    pub coliver_name: &'a str,
    pub chapter_name: Option<&'a str>,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub stay_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTerms {
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub description: String,
}

impl AutomaticPaymentTemplate {
    pub fn applies_automatically(&self) -> bool {
        self.is_active && self.applies_to_all_colivers
    }

    pub fn amount_rule(&self) -> Result<AmountRule, TemplateError> {
        match self.amount_type {
            AmountType::Fixed => self
                .fixed_amount
                .map(AmountRule::Fixed)
                .ok_or_else(|| TemplateError::MissingFixedAmount(self.title.clone())),
            AmountType::TotalCost => Ok(AmountRule::TotalCost),
            AmountType::PercentageCost => self
                .percentage
                .map(AmountRule::PercentageOfCost)
                .ok_or_else(|| TemplateError::MissingPercentage(self.title.clone())),
        }
    }

    pub fn calculate_amount(&self, stay_cost: Decimal) -> Result<Decimal, TemplateError> {
        let amount = match self.amount_rule()? {
            AmountRule::Fixed(amount) => amount,
            AmountRule::TotalCost => stay_cost,
            AmountRule::PercentageOfCost(percentage) => {
                stay_cost * percentage / Decimal::ONE_HUNDRED
            }
        };
        Ok(amount.round_dp(2))
    }

    pub fn calculate_due_date(
        &self,
        arrival: NaiveDate,
        departure: NaiveDate,
    ) -> Result<NaiveDate, TemplateError> {
        let base = match self.date_type {
            DueDateAnchor::Arrival | DueDateAnchor::CustomOffset => arrival,
            DueDateAnchor::Departure => departure,
        };
        let shift = Days::new(self.days_offset.unsigned_abs());
        let due = if self.days_offset < 0 {
            base.checked_sub_days(shift)
        } else {
            base.checked_add_days(shift)
        };
        due.ok_or_else(|| TemplateError::DueDateOutOfRange {
            title: self.title.clone(),
            offset: self.days_offset,
        })
    }

    pub fn describe(&self, context: &PaymentContext<'_>) -> String {
        self.description_template
            .replace("{coliver_name}", context.coliver_name)
            .replace("{chapter_name}", context.chapter_name.unwrap_or("No Chapter"))
            .replace("{arrival_date}", &context.arrival.format("%Y-%m-%d").to_string())
            .replace("{departure_date}", &context.departure.format("%Y-%m-%d").to_string())
    }

    pub fn terms_for(&self, context: &PaymentContext<'_>) -> Result<PaymentTerms, TemplateError> {
        Ok(PaymentTerms {
            amount: self.calculate_amount(context.stay_cost)?,
            due_date: self.calculate_due_date(context.arrival, context.departure)?,
            description: self.describe(context),
        })
    }
}

/// Links a template to the payment it produced for one coliver; unique per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticPayment {
    pub template_id: TemplateId,
    pub coliver_id: ColiverId,
    pub payment_id: PaymentId,
    pub created_at: DateTime<Utc>,
}
