use super::domain::Payment;
use super::templates::{AutomaticPayment, AutomaticPaymentTemplate};
use crate::ids::{ColiverId, PaymentId, TemplateId, UserId};
use crate::storage::RepositoryError;

/// Payment storage; transaction ids are unique across all payments.
pub trait PaymentRepository: Send + Sync {
    fn insert_payment(&self, payment: Payment) -> Result<Payment, RepositoryError>;
    /// Fails with `Conflict` when another payment already carries the transaction id.
    fn update_payment(&self, payment: Payment) -> Result<(), RepositoryError>;
    fn fetch_payment(&self, id: &PaymentId) -> Result<Option<Payment>, RepositoryError>;
    fn payments_for_user(&self, user: &UserId) -> Result<Vec<Payment>, RepositoryError>;

    fn templates(&self) -> Result<Vec<AutomaticPaymentTemplate>, RepositoryError>;
    fn template(&self, id: &TemplateId) -> Result<Option<AutomaticPaymentTemplate>, RepositoryError>;
    fn automatic_payment(
        &self,
        template: &TemplateId,
        coliver: &ColiverId,
    ) -> Result<Option<AutomaticPayment>, RepositoryError>;
    fn automatic_payments_for(&self, coliver: &ColiverId) -> Result<Vec<AutomaticPayment>, RepositoryError>;
    /// Stores the payment and its template link together; `Conflict` when the pair is already linked.
    fn insert_automatic_payment(
        &self,
        template: &TemplateId,
        coliver: &ColiverId,
        payment: Payment,
    ) -> Result<AutomaticPayment, RepositoryError>;
}
