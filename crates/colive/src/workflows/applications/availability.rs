use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::StayNotice;
use crate::ids::ChapterId;
use crate::pricing::{
    price_stay, Chapter, ChapterBooking, GuestCount, MemberType, PricingAdjustments, StayPricing,
    StayTerms,
};

/// Dates and party details used to price every chapter at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRequest {
    pub date_join: NaiveDate,
    pub date_leave: NaiveDate,
    #[serde(default)]
    pub guests: GuestCount,
    #[serde(default)]
    pub member_type: MemberType,
}

impl StayRequest {
    fn terms(&self) -> StayTerms {
        StayTerms {
            date_join: self.date_join,
            date_leave: self.date_leave,
            member_type: self.member_type,
            guests: self.guests,
            manual_cost: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterOption {
    pub chapter_id: ChapterId,
    pub name: String,
    pub is_available: bool,
    pub nightly_rate: Decimal,
    pub nights: i64,
    pub pricing: StayPricing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityReport {
    pub nights: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<StayNotice>,
    pub options: Vec<ChapterOption>,
}

/// One option per chapter; booked chapters stay in the list flagged unavailable.
pub fn availability_matrix(
    chapters: &[Chapter],
    bookings: &[ChapterBooking],
    request: &StayRequest,
    rates: &PricingAdjustments,
) -> Vec<ChapterOption> {
    let terms = request.terms();
    let nights = terms.nights();

    chapters
        .iter()
        .map(|chapter| {
            let is_available = !bookings.iter().any(|booking| {
                booking.chapter_id == chapter.id
                    && booking.overlaps(request.date_join, request.date_leave)
            });

            ChapterOption {
                chapter_id: chapter.id.clone(),
                name: chapter.name.clone(),
                is_available,
                nightly_rate: chapter.display_rate(nights),
                nights,
                pricing: price_stay(chapter, &terms, rates),
            }
        })
        .collect()
}
