use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::chapter::{Chapter, PricingError, PricingTier};

#[derive(Debug)]
pub enum RateSheetError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRate { line: u64, value: String },
    UnknownChapter(String),
    Pricing { chapter: String, source: PricingError },
}

impl std::fmt::Display for RateSheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateSheetError::Io(err) => write!(f, "failed to read rate sheet: {}", err),
            RateSheetError::Csv(err) => write!(f, "invalid rate sheet CSV data: {}", err),
            RateSheetError::InvalidRate { line, value } => {
                write!(f, "line {}: '{}' is not a valid nightly rate", line, value)
            }
            RateSheetError::UnknownChapter(name) => {
                write!(f, "rate sheet has no tiers for chapter '{}'", name)
            }
            RateSheetError::Pricing { chapter, source } => {
                write!(f, "tiers for chapter '{}' are invalid: {}", chapter, source)
            }
        }
    }
}

impl std::error::Error for RateSheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RateSheetError::Io(err) => Some(err),
            RateSheetError::Csv(err) => Some(err),
            RateSheetError::Pricing { source, .. } => Some(source),
            RateSheetError::InvalidRate { .. } | RateSheetError::UnknownChapter(_) => None,
        }
    }
}

impl From<std::io::Error> for RateSheetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RateSheetError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct RateRow {
    chapter: String,
    tier_name: String,
    duration_days: i64,
    price_per_night: String,
    tier_order: u32,
}

/// Tier definitions per chapter name, loaded from a CSV export with the columns
/// `chapter,tier_name,duration_days,price_per_night,tier_order`.
#[derive(Debug, Default, Clone)]
pub struct ChapterRateSheet {
    tiers: BTreeMap<String, Vec<PricingTier>>,
}

impl ChapterRateSheet {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RateSheetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RateSheetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut record = csv::StringRecord::new();
        let mut tiers: BTreeMap<String, Vec<PricingTier>> = BTreeMap::new();

        while csv_reader.read_record(&mut record)? {
            let row: RateRow = record.deserialize(Some(&headers))?;
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            let price_per_night = Decimal::from_str(&row.price_per_night).map_err(|_| {
                RateSheetError::InvalidRate {
                    line,
                    value: row.price_per_night.clone(),
                }
            })?;

            tiers.entry(row.chapter).or_default().push(PricingTier {
                name: row.tier_name,
                duration_days: row.duration_days,
                price_per_night,
                tier_order: row.tier_order,
            });
        }

        Ok(Self { tiers })
    }

    pub fn chapter_names(&self) -> impl Iterator<Item = &str> {
        self.tiers.keys().map(String::as_str)
    }

    /// Replace the chapter's tiers with the sheet's entry for `name` and enable tiered pricing.
    pub fn apply_to(&self, name: &str, chapter: &mut Chapter) -> Result<(), RateSheetError> {
        let tiers = self
            .tiers
            .get(name)
            .ok_or_else(|| RateSheetError::UnknownChapter(name.to_string()))?;

        chapter.tiers = tiers.clone();
        chapter.use_tiered_pricing = true;
        chapter
            .validate()
            .map_err(|source| RateSheetError::Pricing {
                chapter: name.to_string(),
                source,
            })
    }
}
