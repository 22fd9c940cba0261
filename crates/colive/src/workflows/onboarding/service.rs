use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info};

use super::coliver::{Coliver, ColiverRepository, ColiverStatus};
use crate::ids::{ApplicationId, ColiverId, PaymentId, TemplateId};
use crate::pricing::{Chapter, ChapterBooking};
use crate::storage::RepositoryError;
use crate::workflows::applications::{Application, ApplicationStatus, ChapterRepository};
use crate::workflows::payments::{
    AutomaticPaymentTemplate, Payment, PaymentContext, PaymentRepository, PaymentStatus,
    TemplateError,
};
use crate::workflows::todos::{TodoBoard, TodoRepository};

#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("automatic payment link points at missing payment {0}")]
    MissingPayment(PaymentId),
    #[error("coliver {0} not found")]
    ColiverNotFound(ColiverId),
    #[error("payment template {0} not found or inactive")]
    TemplateNotFound(TemplateId),
}

/// A template that could not be applied to a coliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateFailure {
    pub template_id: TemplateId,
    pub template: String,
    pub error: String,
}

/// Everything one onboarding run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingReport {
    pub application_id: ApplicationId,
    pub coliver_id: ColiverId,
    pub coliver_created: bool,
    pub booking_created: bool,
    pub payments_created: Vec<PaymentId>,
    pub payments_refreshed: Vec<PaymentId>,
    pub failures: Vec<TemplateFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TemplateOutcome {
    Created(Payment),
    Refreshed(PaymentId),
    /// Linked payment already left the requested state.
    Settled(PaymentId),
    /// A link exists and creation was not requested, or another writer linked it first.
    AlreadyLinked,
}

/// Keeps one coliver's automatic payments in line with its templates.
pub(crate) struct PaymentSync<'a, S> {
    pub(crate) store: &'a S,
    pub(crate) todos: &'a TodoBoard<S>,
}

impl<'a, S> PaymentSync<'a, S>
where
    S: ChapterRepository + PaymentRepository + TodoRepository + 'static,
{
    pub(crate) fn chapter_for(&self, coliver: &Coliver) -> Result<Option<Chapter>, RepositoryError> {
        match &coliver.chapter_id {
            Some(id) => self.store.chapter(id),
            None => Ok(None),
        }
    }

    /// Refresh a still-requested linked payment, or create the payment when `create` is set.
    pub(crate) fn apply(
        &self,
        template: &AutomaticPaymentTemplate,
        coliver: &Coliver,
        chapter: Option<&Chapter>,
        create: bool,
    ) -> Result<TemplateOutcome, OnboardingError> {
        let coliver_name = coliver.full_name();
        let context = PaymentContext {
            coliver_name: &coliver_name,
            chapter_name: chapter.map(|chapter| chapter.name.as_str()),
            arrival: coliver.arrival_date,
            departure: coliver.departure_date,
            stay_cost: coliver.calculate_cost(chapter),
        };

        if let Some(link) = self.store.automatic_payment(&template.id, &coliver.id)? {
            let mut payment = self
                .store
                .fetch_payment(&link.payment_id)?
                .ok_or_else(|| OnboardingError::MissingPayment(link.payment_id.clone()))?;
            if payment.status != PaymentStatus::Requested {
                return Ok(TemplateOutcome::Settled(payment.id));
            }

            let terms = template.terms_for(&context)?;
            payment.amount = terms.amount;
            payment.due_date = Some(terms.due_date);
            payment.description = terms.description;
            payment.updated_at = Utc::now();
            self.store.update_payment(payment.clone())?;
            debug!(payment_id = %payment.id, template = %template.title, "refreshed automatic payment");
            return Ok(TemplateOutcome::Refreshed(payment.id));
        }

        if !create {
            return Ok(TemplateOutcome::AlreadyLinked);
        }

        let terms = template.terms_for(&context)?;
        let payment = Payment::requested(
            coliver.user_id.clone(),
            terms.amount,
            terms.description,
            Some(terms.due_date),
        );
        match self
            .store
            .insert_automatic_payment(&template.id, &coliver.id, payment.clone())
        {
            Ok(_) => {}
            Err(RepositoryError::Conflict) => return Ok(TemplateOutcome::AlreadyLinked),
            Err(other) => return Err(other.into()),
        }

        self.todos.payment_needs_review(&payment, &coliver_name)?;
        info!(
            payment_id = %payment.id,
            template = %template.title,
            coliver = %coliver_name,
            "created automatic payment"
        );
        Ok(TemplateOutcome::Created(payment))
    }
}

/// Side effects of moving an application into onboarding.
pub struct OnboardingService<S> {
    repository: Arc<S>,
    todos: TodoBoard<S>,
}

impl<S> OnboardingService<S>
where
    S: ChapterRepository + ColiverRepository + PaymentRepository + TodoRepository + 'static,
{
    pub fn new(repository: Arc<S>) -> Self {
        let todos = TodoBoard::new(Arc::clone(&repository));
        Self { repository, todos }
    }

    /// Single entry point for status changes; onboards only on the edge into `Onboarding`.
    pub fn apply_transition(
        &self,
        before: ApplicationStatus,
        application: &Application,
    ) -> Result<Option<OnboardingReport>, OnboardingError> {
        let after = application.application_status;
        if before == ApplicationStatus::Onboarding || after != ApplicationStatus::Onboarding {
            return Ok(None);
        }
        info!(
            application_id = %application.id,
            applicant = %application.details.full_name(),
            "application moved to onboarding"
        );
        self.onboard(application).map(Some)
    }

    pub fn onboard(&self, application: &Application) -> Result<OnboardingReport, OnboardingError> {
        let details = &application.details;

        let booking_created = match &application.chapter_id {
            Some(chapter_id) => self.repository.add_booking(ChapterBooking {
                chapter_id: chapter_id.clone(),
                start_date: details.date_join,
                end_date: details.date_leave,
            })?,
            None => false,
        };

        let candidate = Coliver {
            id: ColiverId::generate(),
            user_id: application.user_id.clone(),
            first_name: details.first_name.clone(),
            last_name: details.last_name.clone(),
            email: details.email.clone(),
            arrival_date: details.date_join,
            departure_date: details.date_leave,
            chapter_id: application.chapter_id.clone(),
            manual_cost: application.manual_cost,
            is_active: true,
            status: ColiverStatus::Onboarding,
            created_at: Utc::now(),
        };
        let chapter_id = application.chapter_id.clone();
        let manual_cost: Option<Decimal> = application.manual_cost;
        let (coliver, coliver_created) = self.repository.upsert_coliver(candidate, &|existing| {
            existing.chapter_id = chapter_id.clone();
            existing.manual_cost = manual_cost;
            existing.status = ColiverStatus::Onboarding;
            existing.is_active = true;
        })?;
        if coliver_created {
            info!(coliver_id = %coliver.id, "created coliver");
        } else {
            info!(coliver_id = %coliver.id, "refreshed existing coliver");
        }

        let sync = PaymentSync {
            store: self.repository.as_ref(),
            todos: &self.todos,
        };
        let chapter = sync.chapter_for(&coliver)?;

        let mut report = OnboardingReport {
            application_id: application.id.clone(),
            coliver_id: coliver.id.clone(),
            coliver_created,
            booking_created,
            payments_created: Vec::new(),
            payments_refreshed: Vec::new(),
            failures: Vec::new(),
        };

        let templates = self.repository.templates()?;
        for template in templates.iter().filter(|t| t.applies_automatically()) {
            match sync.apply(template, &coliver, chapter.as_ref(), true) {
                Ok(TemplateOutcome::Created(payment)) => report.payments_created.push(payment.id),
                Ok(TemplateOutcome::Refreshed(id)) => report.payments_refreshed.push(id),
                Ok(TemplateOutcome::Settled(_)) | Ok(TemplateOutcome::AlreadyLinked) => {}
                Err(err) => {
                    error!(
                        template = %template.title,
                        coliver = %coliver.full_name(),
                        error = %err,
                        "failed to apply payment template"
                    );
                    report.failures.push(TemplateFailure {
                        template_id: template.id.clone(),
                        template: template.title.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            coliver_id = %coliver.id,
            created = report.payments_created.len(),
            refreshed = report.payments_refreshed.len(),
            failed = report.failures.len(),
            "onboarding finished"
        );
        Ok(report)
    }
}
