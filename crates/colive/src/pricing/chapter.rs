use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::ChapterId;

/// Length-of-stay band with its own nightly rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub name: String,
    pub duration_days: i64,
    pub price_per_night: Decimal,
    pub tier_order: u32,
}

/// A bookable house together with its rate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Legacy flat rate used when neither short-term nor tiered pricing applies.
    pub cost_per_night: Decimal,
    #[serde(default)]
    pub use_tiered_pricing: bool,
    #[serde(default)]
    pub use_short_term_pricing: bool,
    #[serde(default = "default_short_term_threshold")]
    pub short_term_threshold_days: i64,
    #[serde(default)]
    pub short_term_price_per_night: Decimal,
    #[serde(default)]
    pub tiers: Vec<PricingTier>,
}

fn default_short_term_threshold() -> i64 {
    7
}

/// Committed occupancy of a chapter over the half-open range `[start_date, end_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterBooking {
    pub chapter_id: ChapterId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ChapterBooking {
    pub fn overlaps(&self, join: NaiveDate, leave: NaiveDate) -> bool {
        self.start_date < leave && self.end_date > join
    }
}

/// One row of a pricing breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingLine {
    pub label: String,
    pub nights: i64,
    pub rate: Decimal,
    pub subtotal: Decimal,
}

/// Base cost of a stay before member or guest adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingQuote {
    pub nights: i64,
    pub lines: Vec<PricingLine>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("tier '{tier}' must cover at least one night")]
    EmptyTier { tier: String },
    #[error("tier '{tier}' has a negative nightly rate")]
    NegativeTierRate { tier: String },
    #[error("tier order {0} is used more than once")]
    DuplicateTierOrder(u32),
    #[error("{field} must not be negative")]
    NegativeRate { field: &'static str },
}

impl Chapter {
    /// Chapter priced only by the legacy flat rate.
    pub fn flat(id: ChapterId, name: impl Into<String>, cost_per_night: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            cost_per_night,
            use_tiered_pricing: false,
            use_short_term_pricing: false,
            short_term_threshold_days: default_short_term_threshold(),
            short_term_price_per_night: Decimal::ZERO,
            tiers: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        if self.cost_per_night.is_sign_negative() {
            return Err(PricingError::NegativeRate {
                field: "cost_per_night",
            });
        }
        if self.short_term_price_per_night.is_sign_negative() {
            return Err(PricingError::NegativeRate {
                field: "short_term_price_per_night",
            });
        }

        let mut seen = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            if tier.duration_days <= 0 {
                return Err(PricingError::EmptyTier {
                    tier: tier.name.clone(),
                });
            }
            if tier.price_per_night.is_sign_negative() {
                return Err(PricingError::NegativeTierRate {
                    tier: tier.name.clone(),
                });
            }
            if seen.contains(&tier.tier_order) {
                return Err(PricingError::DuplicateTierOrder(tier.tier_order));
            }
            seen.push(tier.tier_order);
        }

        Ok(())
    }

    fn short_term_applies(&self, nights: i64) -> bool {
        self.use_short_term_pricing
            && nights <= self.short_term_threshold_days
            && self.short_term_price_per_night > Decimal::ZERO
    }

    fn ordered_tiers(&self) -> Vec<&PricingTier> {
        let mut tiers: Vec<&PricingTier> = self.tiers.iter().collect();
        tiers.sort_by_key(|tier| tier.tier_order);
        tiers
    }

    /// Total cost and per-band breakdown for a stay of `nights`.
    pub fn quote(&self, nights: i64) -> PricingQuote {
        let nights = nights.max(0);

        let lines = if self.short_term_applies(nights) {
            vec![line(
                format!("Short-term Rate (≤{} days)", self.short_term_threshold_days),
                nights,
                self.short_term_price_per_night,
            )]
        } else if self.use_tiered_pricing && !self.tiers.is_empty() {
            self.tiered_lines(nights)
        } else {
            vec![line("Standard Rate".to_string(), nights, self.cost_per_night)]
        };

        let total = lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| (acc + line.subtotal).round_dp(2));

        PricingQuote {
            nights,
            lines,
            total,
        }
    }

    fn tiered_lines(&self, nights: i64) -> Vec<PricingLine> {
        let tiers = self.ordered_tiers();
        let mut lines = Vec::with_capacity(tiers.len() + 1);
        let mut remaining = nights;

        for tier in &tiers {
            if remaining <= 0 {
                break;
            }
            let in_tier = remaining.min(tier.duration_days);
            lines.push(line(tier.name.clone(), in_tier, tier.price_per_night));
            remaining -= in_tier;
        }

        if remaining > 0 {
            if let Some(last) = tiers.last() {
                lines.push(line(
                    format!("{} (Extended)", last.name),
                    remaining,
                    last.price_per_night,
                ));
            }
        }

        lines
    }

    pub fn calculate_tiered_cost(&self, nights: i64) -> Decimal {
        self.quote(nights).total
    }

    /// Nightly rate advertised in availability listings.
    pub fn display_rate(&self, nights: i64) -> Decimal {
        if self.short_term_applies(nights.max(0)) {
            return self.short_term_price_per_night;
        }
        if self.use_tiered_pricing {
            if let Some(first) = self.ordered_tiers().first() {
                return first.price_per_night;
            }
        }
        self.cost_per_night
    }
}

fn line(label: String, nights: i64, rate: Decimal) -> PricingLine {
    PricingLine {
        label,
        nights,
        rate,
        subtotal: (rate * Decimal::from(nights)).round_dp(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(name: &str, duration_days: i64, rate: i64, tier_order: u32) -> PricingTier {
        PricingTier {
            name: name.to_string(),
            duration_days,
            price_per_night: Decimal::from(rate),
            tier_order,
        }
    }

    fn tiered_chapter() -> Chapter {
        let mut chapter = Chapter::flat(ChapterId::from("chp-seoul"), "Seoul", Decimal::from(150_000));
        chapter.use_tiered_pricing = true;
        // Deliberately out of order: tiers are consumed by `tier_order`.
        chapter.tiers = vec![
            tier("Long-term", 999, 99_000, 3),
            tier("Short-term", 14, 119_000, 1),
            tier("Mid-term", 70, 109_000, 2),
        ];
        chapter
    }

    #[test]
    fn tiers_are_exhausted_in_order() {
        let quote = tiered_chapter().quote(90);

        let labels: Vec<&str> = quote.lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Short-term", "Mid-term", "Long-term"]);
        assert_eq!(quote.lines[0].subtotal, Decimal::from(1_666_000));
        assert_eq!(quote.lines[1].subtotal, Decimal::from(7_630_000));
        assert_eq!(quote.lines[2].nights, 6);
        assert_eq!(quote.lines[2].subtotal, Decimal::from(594_000));
        assert_eq!(quote.total, Decimal::from(9_890_000));
    }

    #[test]
    fn stops_once_nights_are_consumed() {
        let quote = tiered_chapter().quote(10);
        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.total, Decimal::from(1_190_000));
    }

    #[test]
    fn residual_nights_use_last_tier_rate() {
        let mut chapter = tiered_chapter();
        chapter.tiers = vec![tier("Intro", 14, 119_000, 1), tier("Settled", 30, 109_000, 2)];

        let quote = chapter.quote(50);

        let overflow = quote.lines.last().expect("overflow line");
        assert_eq!(overflow.label, "Settled (Extended)");
        assert_eq!(overflow.nights, 6);
        assert_eq!(overflow.rate, Decimal::from(109_000));
        assert_eq!(
            quote.total,
            Decimal::from(14 * 119_000 + 30 * 109_000 + 6 * 109_000)
        );
    }

    #[test]
    fn short_term_rate_takes_priority() {
        let mut chapter = tiered_chapter();
        chapter.use_short_term_pricing = true;
        chapter.short_term_threshold_days = 7;
        chapter.short_term_price_per_night = Decimal::from(140_000);

        for nights in 1..=7 {
            let quote = chapter.quote(nights);
            assert_eq!(quote.lines.len(), 1);
            assert_eq!(quote.total, Decimal::from(140_000 * nights));
        }
        assert_eq!(chapter.quote(7).lines[0].label, "Short-term Rate (≤7 days)");
        assert_eq!(chapter.quote(8).total, Decimal::from(8 * 119_000));
    }

    #[test]
    fn short_term_requires_positive_rate() {
        let mut chapter = tiered_chapter();
        chapter.use_short_term_pricing = true;
        chapter.short_term_price_per_night = Decimal::ZERO;

        assert_eq!(chapter.quote(3).total, Decimal::from(3 * 119_000));
    }

    #[test]
    fn falls_back_to_legacy_rate() {
        let mut chapter = tiered_chapter();
        chapter.use_tiered_pricing = false;

        let quote = chapter.quote(4);
        assert_eq!(quote.lines[0].label, "Standard Rate");
        assert_eq!(quote.total, Decimal::from(600_000));

        chapter.use_tiered_pricing = true;
        chapter.tiers.clear();
        assert_eq!(chapter.quote(4).total, Decimal::from(600_000));
    }

    #[test]
    fn fractional_rates_round_to_cents() {
        let chapter = Chapter::flat(ChapterId::from("chp-x"), "X", Decimal::new(333_335, 4));
        let quote = chapter.quote(3);
        assert_eq!(quote.total, Decimal::new(10000, 2));
    }

    #[test]
    fn display_rate_prefers_short_term_then_first_tier() {
        let mut chapter = tiered_chapter();
        assert_eq!(chapter.display_rate(30), Decimal::from(119_000));

        chapter.use_short_term_pricing = true;
        chapter.short_term_price_per_night = Decimal::from(140_000);
        assert_eq!(chapter.display_rate(5), Decimal::from(140_000));

        chapter.use_tiered_pricing = false;
        assert_eq!(chapter.display_rate(30), Decimal::from(150_000));
    }

    #[test]
    fn validate_rejects_empty_tiers() {
        let mut chapter = tiered_chapter();
        chapter.tiers.push(tier("Broken", 0, 1, 4));
        assert_eq!(
            chapter.validate(),
            Err(PricingError::EmptyTier {
                tier: "Broken".to_string()
            })
        );
    }

    #[test]
    fn booking_overlap_is_half_open() {
        let booking = ChapterBooking {
            chapter_id: ChapterId::from("chp-seoul"),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid"),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid"),
        };
        let date = |d| NaiveDate::from_ymd_opt(2024, 6, d).expect("valid");

        assert!(booking.overlaps(date(5), date(15)));
        assert!(!booking.overlaps(date(10), date(20)));
    }
}
