//! Application intake: availability search, the multi-step wizard, and admin status
//! transitions that hand accepted applicants over to onboarding.

mod availability;
mod domain;
mod questions;
mod repository;
mod router;
mod service;
mod validation;
mod wizard;

pub use availability::{availability_matrix, AvailabilityReport, ChapterOption, StayRequest};
pub use domain::{ApplicantDetails, Application, ApplicationStatus, SubmissionStatus};
pub use questions::{active_in_order, first_unanswered, Question, QuestionKind, QuestionSet};
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationView, ChapterRepository,
    QuestionRepository, WizardProgress,
};
pub use router::{application_router, ApplicationStore};
pub use service::{ApplicationService, ApplicationServiceError, StatusChange};
pub use validation::{stay_notice, validate_stay, FieldError, StayNotice, ValidationError};
pub use wizard::{
    AnswerInput, Navigation, ReintroductionDecision, WizardError, WizardState, WizardStep,
};

#[cfg(test)]
mod tests;
