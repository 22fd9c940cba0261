use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info, warn};

use super::coliver::{Coliver, ColiverRepository, ColiverStatus};
use super::service::{OnboardingError, PaymentSync, TemplateFailure, TemplateOutcome};
use crate::ids::{ColiverId, PaymentId, TemplateId};
use crate::workflows::applications::ChapterRepository;
use crate::workflows::payments::{AutomaticPaymentTemplate, PaymentContext, PaymentRepository};
use crate::workflows::todos::{TodoBoard, TodoRepository};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColiverUpdate {
    pub coliver: Coliver,
    pub payments_refreshed: Vec<PaymentId>,
    pub failures: Vec<TemplateFailure>,
}

/// A payment the generator created, or would create in a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedPayment {
    pub template: String,
    pub coliver_id: ColiverId,
    pub coliver_name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub dry_run: bool,
    pub templates: usize,
    pub colivers: usize,
    pub created: Vec<PlannedPayment>,
    pub already_existing: usize,
    pub failures: Vec<TemplateFailure>,
}

/// Admin operations on colivers that already live in a chapter.
pub struct ResidencyService<S> {
    repository: Arc<S>,
    todos: TodoBoard<S>,
}

impl<S> ResidencyService<S>
where
    S: ChapterRepository + ColiverRepository + PaymentRepository + TodoRepository + 'static,
{
    pub fn new(repository: Arc<S>) -> Self {
        let todos = TodoBoard::new(Arc::clone(&repository));
        Self { repository, todos }
    }

    pub fn coliver(&self, id: &ColiverId) -> Result<Coliver, OnboardingError> {
        self.repository
            .fetch_coliver(id)?
            .ok_or_else(|| OnboardingError::ColiverNotFound(id.clone()))
    }

    /// Save an edited coliver; date, chapter, or manual cost edits reprice requested payments.
    pub fn update_coliver(&self, mut coliver: Coliver) -> Result<ColiverUpdate, OnboardingError> {
        let previous = self.coliver(&coliver.id)?;
        if previous.is_active && !coliver.is_active {
            coliver.status = ColiverStatus::Application;
            info!(coliver_id = %coliver.id, "coliver archived");
        }
        self.repository.update_coliver(coliver.clone())?;

        let mut update = ColiverUpdate {
            coliver,
            payments_refreshed: Vec::new(),
            failures: Vec::new(),
        };
        if !update.coliver.payment_fields_changed(&previous) {
            return Ok(update);
        }

        let sync = self.sync();
        let chapter = sync.chapter_for(&update.coliver)?;
        for link in self.repository.automatic_payments_for(&update.coliver.id)? {
            let Some(template) = self.repository.template(&link.template_id)? else {
                warn!(template_id = %link.template_id, "automatic payment references a deleted template");
                continue;
            };
            match sync.apply(&template, &update.coliver, chapter.as_ref(), false) {
                Ok(TemplateOutcome::Refreshed(id)) => update.payments_refreshed.push(id),
                Ok(_) => {}
                Err(err) => {
                    error!(template = %template.title, error = %err, "failed to refresh automatic payment");
                    update.failures.push(TemplateFailure {
                        template_id: template.id.clone(),
                        template: template.title.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(update)
    }

    /// Backfill automatic payments for active colivers onboarded before a template existed.
    pub fn generate_for_active_colivers(
        &self,
        template_id: Option<&TemplateId>,
        dry_run: bool,
    ) -> Result<GenerationReport, OnboardingError> {
        let templates: Vec<AutomaticPaymentTemplate> = match template_id {
            Some(id) => {
                let template = self
                    .repository
                    .template(id)?
                    .filter(|template| template.is_active)
                    .ok_or_else(|| OnboardingError::TemplateNotFound(id.clone()))?;
                vec![template]
            }
            None => self
                .repository
                .templates()?
                .into_iter()
                .filter(AutomaticPaymentTemplate::applies_automatically)
                .collect(),
        };
        let colivers: Vec<Coliver> = self
            .repository
            .colivers()?
            .into_iter()
            .filter(|coliver| coliver.is_active)
            .collect();

        let mut report = GenerationReport {
            dry_run,
            templates: templates.len(),
            colivers: colivers.len(),
            created: Vec::new(),
            already_existing: 0,
            failures: Vec::new(),
        };
        let sync = self.sync();

        for template in &templates {
            for coliver in &colivers {
                match self.generate_one(&sync, template, coliver, dry_run) {
                    Ok(Some(planned)) => report.created.push(planned),
                    Ok(None) => report.already_existing += 1,
                    Err(err) => {
                        error!(template = %template.title, coliver = %coliver.full_name(), error = %err, "payment generation failed");
                        report.failures.push(TemplateFailure {
                            template_id: template.id.clone(),
                            template: template.title.clone(),
                            error: err.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            dry_run,
            created = report.created.len(),
            existing = report.already_existing,
            "payment generation finished"
        );
        Ok(report)
    }

    fn generate_one(
        &self,
        sync: &PaymentSync<'_, S>,
        template: &AutomaticPaymentTemplate,
        coliver: &Coliver,
        dry_run: bool,
    ) -> Result<Option<PlannedPayment>, OnboardingError> {
        if self
            .repository
            .automatic_payment(&template.id, &coliver.id)?
            .is_some()
        {
            return Ok(None);
        }

        let coliver_name = coliver.full_name();
        if dry_run {
            let chapter = sync.chapter_for(coliver)?;
            let terms = template.terms_for(&PaymentContext {
                coliver_name: &coliver_name,
                chapter_name: chapter.as_ref().map(|chapter| chapter.name.as_str()),
                arrival: coliver.arrival_date,
                departure: coliver.departure_date,
                stay_cost: coliver.calculate_cost(chapter.as_ref()),
            })?;
            return Ok(Some(PlannedPayment {
                template: template.title.clone(),
                coliver_id: coliver.id.clone(),
                coliver_name,
                amount: terms.amount,
                due_date: terms.due_date,
                payment_id: None,
            }));
        }

        let chapter = sync.chapter_for(coliver)?;
        match sync.apply(template, coliver, chapter.as_ref(), true)? {
            TemplateOutcome::Created(payment) => Ok(Some(PlannedPayment {
                template: template.title.clone(),
                coliver_id: coliver.id.clone(),
                coliver_name,
                amount: payment.amount,
                due_date: payment.due_date.unwrap_or(coliver.arrival_date),
                payment_id: Some(payment.id),
            })),
            _ => Ok(None),
        }
    }

    fn sync(&self) -> PaymentSync<'_, S> {
        PaymentSync {
            store: self.repository.as_ref(),
            todos: &self.todos,
        }
    }
}
