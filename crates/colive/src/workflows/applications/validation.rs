use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::WizardConfig;

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field problem found while validating a stay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join(" "))
    }
}

impl std::error::Error for ValidationError {}

/// Informational flag attached to stays outside the usual booking window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StayNotice {
    Short,
    Long,
}

impl StayNotice {
    pub fn message(self) -> &'static str {
        match self {
            StayNotice::Short => {
                "Stays shorter than four weeks are accommodated only when space allows."
            }
            StayNotice::Long => {
                "Stays longer than three months are reviewed individually after arrival."
            }
        }
    }
}

/// Check arrival/departure against `today` and the initial stay cap; returns the night count.
pub fn validate_stay(
    date_join: NaiveDate,
    date_leave: NaiveDate,
    today: NaiveDate,
    config: &WizardConfig,
) -> Result<i64, ValidationError> {
    let mut errors = Vec::new();

    if date_join < today {
        errors.push(FieldError {
            field: "date_join",
            message: "Join date cannot be in the past.".to_string(),
        });
    }
    if date_leave < today {
        errors.push(FieldError {
            field: "date_leave",
            message: "Leave date cannot be in the past.".to_string(),
        });
    }

    let nights = (date_leave - date_join).num_days();
    if nights <= 0 {
        errors.push(FieldError {
            field: "date_leave",
            message: "Leave date must be after join date.".to_string(),
        });
    } else if nights > config.max_initial_stay_days {
        errors.push(FieldError {
            field: "date_leave",
            message: format!(
                "Initial stay cannot exceed {} days. Extensions can be arranged after arrival.",
                config.max_initial_stay_days
            ),
        });
    }

    if errors.is_empty() {
        Ok(nights)
    } else {
        Err(ValidationError { errors })
    }
}

pub fn stay_notice(nights: i64, config: &WizardConfig) -> Option<StayNotice> {
    if nights < config.short_stay_notice_days {
        Some(StayNotice::Short)
    } else if nights > config.long_stay_notice_days {
        Some(StayNotice::Long)
    } else {
        None
    }
}
