//! What happens when an application is moved to onboarding: the chapter booking, the
//! coliver record, and the automatic payments requested from them.

mod coliver;
mod residency;
mod router;
mod service;

pub use coliver::{Coliver, ColiverKey, ColiverRepository, ColiverStatus};
pub use residency::{ColiverUpdate, GenerationReport, PlannedPayment, ResidencyService};
pub use router::residency_router;
pub use service::{OnboardingError, OnboardingReport, OnboardingService, TemplateFailure};
