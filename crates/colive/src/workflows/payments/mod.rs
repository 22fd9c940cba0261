//! Coliver payments: automatic templates, proof submission, and admin review.

mod domain;
mod repository;
mod router;
mod service;
mod templates;

pub use domain::{Payment, PaymentLedger, PaymentStatus, ProofSubmission};
pub use repository::PaymentRepository;
pub use router::payment_router;
pub use service::{PaymentError, PaymentService};
pub use templates::{
    AmountRule, AmountType, AutomaticPayment, AutomaticPaymentTemplate, DueDateAnchor,
    PaymentContext, PaymentTerms, TemplateError,
};
