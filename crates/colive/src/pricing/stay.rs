use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::adjustments::{Adjustment, GuestCount, MemberType, PricingAdjustments};
use super::chapter::{Chapter, PricingLine};

/// Inputs that determine what a stay costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayTerms {
    pub date_join: NaiveDate,
    pub date_leave: NaiveDate,
    pub member_type: MemberType,
    pub guests: GuestCount,
    /// Replaces the computed total when set.
    pub manual_cost: Option<Decimal>,
}

impl StayTerms {
    pub fn nights(&self) -> i64 {
        (self.date_leave - self.date_join).num_days().max(0)
    }
}

/// Full pricing picture for a stay at one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayPricing {
    pub tiers: Vec<PricingLine>,
    pub adjustments: Vec<Adjustment>,
    pub total_nights: i64,
    pub final_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_guest: Option<Decimal>,
    pub manual_override: bool,
}

impl StayPricing {
    pub fn empty() -> Self {
        Self {
            tiers: Vec::new(),
            adjustments: Vec::new(),
            total_nights: 0,
            final_total: Decimal::ZERO,
            per_guest: None,
            manual_override: false,
        }
    }
}

pub fn price_stay(chapter: &Chapter, terms: &StayTerms, rates: &PricingAdjustments) -> StayPricing {
    let quote = chapter.quote(terms.nights());
    let adjusted = rates.apply(quote.total, terms.member_type, terms.guests);

    let (final_total, manual_override) = match terms.manual_cost {
        Some(manual) => (manual.round_dp(2), true),
        None => (adjusted.total, false),
    };

    let per_guest = match terms.guests {
        GuestCount::Two => Some((final_total / Decimal::from(2)).round_dp(2)),
        GuestCount::One => None,
    };

    StayPricing {
        tiers: quote.lines,
        adjustments: adjusted.adjustments,
        total_nights: quote.nights,
        final_total,
        per_guest,
        manual_override,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ChapterId;

    fn terms(member_type: MemberType, guests: GuestCount) -> StayTerms {
        StayTerms {
            date_join: NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid"),
            date_leave: NaiveDate::from_ymd_opt(2025, 3, 11).expect("valid"),
            member_type,
            guests,
            manual_cost: None,
        }
    }

    #[test]
    fn prices_adjusted_stay_with_per_guest_split() {
        let chapter = Chapter::flat(ChapterId::from("chp-a"), "A", Decimal::from(10_000));
        let pricing = price_stay(
            &chapter,
            &terms(MemberType::Returning, GuestCount::Two),
            &PricingAdjustments::default(),
        );

        assert_eq!(pricing.total_nights, 10);
        assert_eq!(pricing.final_total, Decimal::from(116_400));
        assert_eq!(pricing.per_guest, Some(Decimal::from(58_200)));
        assert_eq!(pricing.adjustments.len(), 2);
    }

    #[test]
    fn manual_cost_overrides_total() {
        let chapter = Chapter::flat(ChapterId::from("chp-a"), "A", Decimal::from(10_000));
        let mut stay = terms(MemberType::New, GuestCount::One);
        stay.manual_cost = Some(Decimal::ZERO);

        let pricing = price_stay(&chapter, &stay, &PricingAdjustments::default());
        assert!(pricing.manual_override);
        assert_eq!(pricing.final_total, Decimal::ZERO);
        assert_eq!(pricing.tiers[0].subtotal, Decimal::from(100_000));
    }
}
