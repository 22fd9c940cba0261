use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::availability::{availability_matrix, AvailabilityReport, StayRequest};
use super::domain::{ApplicantDetails, Application, ApplicationStatus, SubmissionStatus};
use super::questions::{Question, QuestionSet};
use super::repository::{
    ApplicationRecord, ApplicationRepository, ApplicationView, ChapterRepository,
    QuestionRepository, WizardProgress,
};
use super::validation::{stay_notice, validate_stay, ValidationError};
use super::wizard::{AnswerInput, ReintroductionDecision, Wizard, WizardError, WizardStep};
use crate::config::WizardConfig;
use crate::ids::{ApplicationId, ChapterId, UserId};
use crate::pricing::{price_stay, PricingAdjustments, StayPricing};
use crate::storage::RepositoryError;
use crate::workflows::onboarding::{
    ColiverRepository, OnboardingError, OnboardingReport, OnboardingService,
};
use crate::workflows::payments::PaymentRepository;
use crate::workflows::todos::{TodoBoard, TodoRepository};

/// Result of an admin status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub application: ApplicationView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding: Option<OnboardingReport>,
}

/// Service driving an application from availability search to onboarding.
pub struct ApplicationService<S> {
    repository: Arc<S>,
    rates: PricingAdjustments,
    wizard: WizardConfig,
    todos: TodoBoard<S>,
    onboarding: OnboardingService<S>,
}

impl<S> ApplicationService<S>
where
    S: ApplicationRepository
        + ChapterRepository
        + QuestionRepository
        + ColiverRepository
        + PaymentRepository
        + TodoRepository
        + 'static,
{
    pub fn new(repository: Arc<S>, rates: PricingAdjustments, wizard: WizardConfig) -> Self {
        let todos = TodoBoard::new(Arc::clone(&repository));
        let onboarding = OnboardingService::new(Arc::clone(&repository));
        Self {
            repository,
            rates,
            wizard,
            todos,
            onboarding,
        }
    }

    pub fn rates(&self) -> &PricingAdjustments {
        &self.rates
    }

    /// Price every chapter for the requested dates.
    pub fn check_availability(
        &self,
        request: &StayRequest,
        today: NaiveDate,
    ) -> Result<AvailabilityReport, ApplicationServiceError> {
        let nights = validate_stay(request.date_join, request.date_leave, today, &self.wizard)?;
        let chapters = self.repository.chapters()?;
        let bookings = self.repository.bookings()?;

        Ok(AvailabilityReport {
            nights,
            notice: stay_notice(nights, &self.wizard),
            options: availability_matrix(&chapters, &bookings, request, &self.rates),
        })
    }

    /// Open a draft application at the chapter selection screen.
    pub fn start(
        &self,
        user: UserId,
        details: ApplicantDetails,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        validate_stay(details.date_join, details.date_leave, today, &self.wizard)?;

        let record = ApplicationRecord::new(Application::new(user, details));
        let stored = self.repository.insert_application(record)?;
        self.todos.application_created(&stored.application)?;
        info!(
            application_id = %stored.application.id,
            applicant = %stored.application.details.full_name(),
            "application started"
        );
        self.view(&stored)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationView, ApplicationServiceError> {
        let record = self.fetch(id)?;
        self.view(&record)
    }

    pub fn record(&self, id: &ApplicationId) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.fetch(id)
    }

    pub fn select_chapter(
        &self,
        id: &ApplicationId,
        chapter_id: ChapterId,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let mut record = self.fetch(id)?;
        if self.repository.chapter(&chapter_id)?.is_none() {
            return Err(ApplicationServiceError::UnknownChapter(chapter_id));
        }
        let details = &record.application.details;
        self.ensure_free(&chapter_id, details.date_join, details.date_leave)?;

        self.run_wizard(&mut record, |wizard| wizard.select_chapter(chapter_id))
    }

    pub fn answer(
        &self,
        id: &ApplicationId,
        input: AnswerInput,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let mut record = self.fetch(id)?;
        self.run_wizard(&mut record, |wizard| wizard.answer(input))
    }

    pub fn choose_reintroduction(
        &self,
        id: &ApplicationId,
        decision: ReintroductionDecision,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let mut record = self.fetch(id)?;
        self.run_wizard(&mut record, |wizard| wizard.choose_reintroduction(decision))
    }

    pub fn resume(&self, id: &ApplicationId) -> Result<ApplicationView, ApplicationServiceError> {
        let mut record = self.fetch(id)?;
        self.run_wizard(&mut record, |wizard| wizard.resume())
    }

    pub fn update_details(
        &self,
        id: &ApplicationId,
        details: ApplicantDetails,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let mut record = self.fetch(id)?;
        if !record.application.is_editable() {
            return Err(WizardError::NotEditable(record.application.status).into());
        }
        validate_stay(details.date_join, details.date_leave, today, &self.wizard)?;

        let current = &record.application.details;
        let moved = current.date_join != details.date_join || current.date_leave != details.date_leave;
        if let Some(chapter_id) = record.application.chapter_id.as_ref().filter(|_| moved) {
            self.ensure_free(chapter_id, details.date_join, details.date_leave)?;
        }

        record.application.details = details;
        record.application.touch();
        self.repository.update_application(record.clone())?;
        self.view(&record)
    }

    pub fn withdraw(&self, id: &ApplicationId) -> Result<ApplicationView, ApplicationServiceError> {
        let mut record = self.fetch(id)?;
        if record.application.status == SubmissionStatus::Withdrawn {
            return Err(WizardError::NotEditable(SubmissionStatus::Withdrawn).into());
        }

        record.application.status = SubmissionStatus::Withdrawn;
        record.application.application_status = ApplicationStatus::Withdrawn;
        record.application.touch();
        self.repository.update_application(record.clone())?;
        info!(application_id = %id, "application withdrawn");
        self.view(&record)
    }

    /// Active, non-withdrawn applications of a user, newest first.
    pub fn list_for_user(&self, user: &UserId) -> Result<Vec<ApplicationView>, ApplicationServiceError> {
        let mut records: Vec<ApplicationRecord> = self
            .repository
            .applications_for_user(user)?
            .into_iter()
            .filter(|record| {
                record.application.is_active
                    && record.application.status != SubmissionStatus::Withdrawn
            })
            .collect();
        records.sort_by(|a, b| b.application.created_at.cmp(&a.application.created_at));
        records.iter().map(|record| self.view(record)).collect()
    }

    /// Cost breakdown; archived applications are priced at the historical rates.
    pub fn pricing(&self, id: &ApplicationId) -> Result<StayPricing, ApplicationServiceError> {
        let record = self.fetch(id)?;
        let application = &record.application;
        let Some(chapter_id) = &application.chapter_id else {
            return Ok(StayPricing::empty());
        };
        let Some(chapter) = self.repository.chapter(chapter_id)? else {
            warn!(application_id = %id, chapter_id = %chapter_id, "application references a missing chapter");
            return Ok(StayPricing::empty());
        };

        let rates = if application.is_active {
            self.rates.clone()
        } else {
            PricingAdjustments::historical()
        };
        Ok(price_stay(&chapter, &application.stay_terms(), &rates))
    }

    /// Admin status transition; moving into onboarding runs the onboarding chain.
    pub fn set_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<StatusChange, ApplicationServiceError> {
        let mut record = self.fetch(id)?;
        let before = record.application.application_status;
        record.application.application_status = status;
        record.application.touch();
        self.repository.update_application(record.clone())?;
        info!(
            application_id = %id,
            from = before.label(),
            to = status.label(),
            "application status changed"
        );

        let onboarding = self
            .onboarding
            .apply_transition(before, &record.application)?;
        Ok(StatusChange {
            application: self.view(&record)?,
            onboarding,
        })
    }

    pub fn set_manual_cost(
        &self,
        id: &ApplicationId,
        manual_cost: Option<Decimal>,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let mut record = self.fetch(id)?;
        record.application.manual_cost = manual_cost;
        record.application.touch();
        self.repository.update_application(record.clone())?;
        self.view(&record)
    }

    /// Archive or restore an application.
    pub fn set_active(&self, id: &ApplicationId, active: bool) -> Result<ApplicationView, ApplicationServiceError> {
        let mut record = self.fetch(id)?;
        record.application.is_active = active;
        record.application.touch();
        self.repository.update_application(record.clone())?;
        self.view(&record)
    }

    fn ensure_free(
        &self,
        chapter_id: &ChapterId,
        date_join: NaiveDate,
        date_leave: NaiveDate,
    ) -> Result<(), ApplicationServiceError> {
        let booked = self.repository.bookings()?.iter().any(|booking| {
            &booking.chapter_id == chapter_id && booking.overlaps(date_join, date_leave)
        });
        if booked {
            return Err(ApplicationServiceError::ChapterUnavailable(chapter_id.clone()));
        }
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch_application(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn question_sets(&self) -> Result<(Vec<Question>, Vec<Question>), RepositoryError> {
        Ok((
            self.repository.active_questions(QuestionSet::Application)?,
            self.repository.active_questions(QuestionSet::Reintroduction)?,
        ))
    }

    fn run_wizard<F>(
        &self,
        record: &mut ApplicationRecord,
        step: F,
    ) -> Result<ApplicationView, ApplicationServiceError>
    where
        F: FnOnce(&mut Wizard<'_>) -> Result<WizardStep, WizardError>,
    {
        let (questions, reintroduction) = self.question_sets()?;
        let was_draft = record.application.is_editable();

        let reached = {
            let mut wizard = Wizard::new(record, &questions, &reintroduction);
            step(&mut wizard)?
        };
        record.application.touch();
        self.repository.update_application(record.clone())?;

        if was_draft && reached == WizardStep::Complete {
            info!(application_id = %record.application.id, "application submitted");
        }
        Ok(self.view_with(record, &questions, &reintroduction))
    }

    fn view(&self, record: &ApplicationRecord) -> Result<ApplicationView, ApplicationServiceError> {
        let (questions, reintroduction) = self.question_sets()?;
        Ok(self.view_with(record, &questions, &reintroduction))
    }

    fn view_with(
        &self,
        record: &ApplicationRecord,
        questions: &[Question],
        reintroduction: &[Question],
    ) -> ApplicationView {
        let mut view = record.view();
        let (set, answers, index) = match record.wizard.step {
            WizardStep::Questions { index } => (questions, &record.answers, index),
            WizardStep::Reintroduction { index } => {
                (reintroduction, &record.reintroduction_answers, index)
            }
            _ => return view,
        };
        view.progress = Some(WizardProgress {
            current: index + 1,
            total: set.len(),
        });
        if let Some(question) = set.get(index) {
            view.answer = answers.get(&question.id).cloned();
            view.question = Some(question.clone());
        }
        view
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("chapter {0} does not exist")]
    UnknownChapter(ChapterId),
    #[error("chapter {0} is already booked for these dates")]
    ChapterUnavailable(ChapterId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),
}
