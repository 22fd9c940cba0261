use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::Application;
use super::questions::{Question, QuestionSet};
use super::wizard::{WizardState, WizardStep};
use crate::ids::{ApplicationId, ChapterId, QuestionId, UserId};
use crate::pricing::{Chapter, ChapterBooking, GuestCount, MemberType};
use crate::storage::RepositoryError;

/// Repository record holding the application, its answers, and where the wizard stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application: Application,
    #[serde(default)]
    pub answers: BTreeMap<QuestionId, String>,
    #[serde(default)]
    pub reintroduction_answers: BTreeMap<QuestionId, String>,
    #[serde(default)]
    pub wizard: WizardState,
}

impl ApplicationRecord {
    pub fn new(application: Application) -> Self {
        Self {
            application,
            answers: BTreeMap::new(),
            reintroduction_answers: BTreeMap::new(),
            wizard: WizardState::default(),
        }
    }

    pub fn view(&self) -> ApplicationView {
        let application = &self.application;
        ApplicationView {
            application_id: application.id.clone(),
            user_id: application.user_id.clone(),
            applicant: application.details.full_name(),
            status: application.status.label(),
            application_status: application.application_status.label(),
            chapter_id: application.chapter_id.clone(),
            date_join: application.details.date_join,
            date_leave: application.details.date_leave,
            guests: application.details.guests,
            member_type: application.details.member_type,
            wants_reintroduction: application.wants_reintroduction,
            is_active: application.is_active,
            step: self.wizard.step,
            progress: None,
            question: None,
            answer: None,
        }
    }
}

/// "Question 2 of 5" indicator for the question screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WizardProgress {
    pub current: usize,
    pub total: usize,
}

/// Applicant-facing summary of an application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub user_id: UserId,
    pub applicant: String,
    pub status: &'static str,
    pub application_status: &'static str,
    pub chapter_id: Option<ChapterId>,
    pub date_join: NaiveDate,
    pub date_leave: NaiveDate,
    pub guests: GuestCount,
    pub member_type: MemberType,
    pub wants_reintroduction: Option<bool>,
    pub is_active: bool,
    pub step: WizardStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<WizardProgress>,
    /// Question shown on the current screen, with the answer already given to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// Storage abstraction for application records.
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update_application(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn applications_for_user(&self, user: &UserId) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Chapters and the bookings that block their calendars.
pub trait ChapterRepository: Send + Sync {
    fn chapters(&self) -> Result<Vec<Chapter>, RepositoryError>;
    fn chapter(&self, id: &ChapterId) -> Result<Option<Chapter>, RepositoryError>;
    fn bookings(&self) -> Result<Vec<ChapterBooking>, RepositoryError>;
    /// Returns `false` when an identical booking is already recorded.
    fn add_booking(&self, booking: ChapterBooking) -> Result<bool, RepositoryError>;
}

pub trait QuestionRepository: Send + Sync {
    /// Active questions of `set`, in display order.
    fn active_questions(&self, set: QuestionSet) -> Result<Vec<Question>, RepositoryError>;
}
