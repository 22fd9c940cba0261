//! Stay pricing: short-term overrides, tiered length-of-stay rates, the legacy flat
//! rate, and the member/guest adjustments layered on top.

mod adjustments;
mod chapter;
mod rate_sheet;
mod stay;

pub use adjustments::{
    AdjustedCost, Adjustment, AdjustmentKind, GuestCount, MemberType, PricingAdjustments,
};
pub use chapter::{Chapter, ChapterBooking, PricingError, PricingLine, PricingQuote, PricingTier};
pub use rate_sheet::{ChapterRateSheet, RateSheetError};
pub use stay::{price_stay, StayPricing, StayTerms};
