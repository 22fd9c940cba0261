use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;

/// Whether the applicant has lived in a chapter before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberType {
    #[default]
    New,
    Returning,
}

impl MemberType {
    pub const fn label(self) -> &'static str {
        match self {
            MemberType::New => "new member",
            MemberType::Returning => "returning member",
        }
    }
}

/// Number of people sharing the booked room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GuestCount {
    #[default]
    One,
    Two,
}

impl TryFrom<u8> for GuestCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GuestCount::One),
            2 => Ok(GuestCount::Two),
            other => Err(format!("guests must be 1 or 2, got {other}")),
        }
    }
}

impl From<GuestCount> for u8 {
    fn from(value: GuestCount) -> Self {
        match value {
            GuestCount::One => 1,
            GuestCount::Two => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Discount,
    Increase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub label: String,
    /// Signed amount: discounts are negative.
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustedCost {
    pub base: Decimal,
    pub adjustments: Vec<Adjustment>,
    pub total: Decimal,
}

/// Returning-member discount and second-guest surcharge, applied in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingAdjustments {
    pub member_discount_percent: Decimal,
    pub guest_increase_percent: Decimal,
}

impl Default for PricingAdjustments {
    fn default() -> Self {
        Self::from(&PricingConfig::default())
    }
}

impl From<&PricingConfig> for PricingAdjustments {
    fn from(config: &PricingConfig) -> Self {
        Self {
            member_discount_percent: config.member_discount_percent,
            guest_increase_percent: config.guest_increase_percent,
        }
    }
}

impl PricingAdjustments {
    /// Rates archived invoices were issued with; they never follow the live settings.
    pub fn historical() -> Self {
        Self {
            member_discount_percent: Decimal::new(3, 0),
            guest_increase_percent: Decimal::new(20, 0),
        }
    }

    pub fn apply(&self, base: Decimal, member_type: MemberType, guests: GuestCount) -> AdjustedCost {
        let mut total = base.round_dp(2);
        let mut adjustments = Vec::new();

        if member_type == MemberType::Returning {
            let discount = percent_of(total, self.member_discount_percent);
            total -= discount;
            adjustments.push(Adjustment {
                kind: AdjustmentKind::Discount,
                label: format!(
                    "Returning Member Discount ({}%)",
                    self.member_discount_percent
                ),
                amount: -discount,
            });
        }

        if guests == GuestCount::Two {
            let increase = percent_of(total, self.guest_increase_percent);
            total += increase;
            adjustments.push(Adjustment {
                kind: AdjustmentKind::Increase,
                label: format!("Second Guest Increase ({}%)", self.guest_increase_percent),
                amount: increase,
            });
        }

        AdjustedCost {
            base: base.round_dp(2),
            adjustments,
            total: total.round_dp(2),
        }
    }
}

fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    (amount * percent / Decimal::ONE_HUNDRED).round_dp(2)
}
