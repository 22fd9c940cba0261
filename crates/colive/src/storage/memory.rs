use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::RepositoryError;
use crate::ids::{
    ApplicationId, ChapterId, ColiverId, MaintenanceId, PaymentId, TemplateId, TodoId, TransferId,
    UserId,
};
use crate::pricing::{Chapter, ChapterBooking};
use crate::workflows::applications::{
    active_in_order, ApplicationRecord, ApplicationRepository, ChapterRepository, Question,
    QuestionRepository, QuestionSet,
};
use crate::workflows::onboarding::{Coliver, ColiverKey, ColiverRepository};
use crate::workflows::payments::{
    AutomaticPayment, AutomaticPaymentTemplate, Payment, PaymentRepository,
};
use crate::workflows::requests::{MaintenanceRequest, RequestRepository, TransferRequest};
use crate::workflows::todos::{TaskType, Todo, TodoRepository};

#[derive(Default)]
struct StoreState {
    chapters: Vec<Chapter>,
    bookings: Vec<ChapterBooking>,
    questions: Vec<Question>,
    applications: HashMap<ApplicationId, ApplicationRecord>,
    colivers: HashMap<ColiverId, Coliver>,
    coliver_keys: HashMap<ColiverKey, ColiverId>,
    payments: HashMap<PaymentId, Payment>,
    templates: Vec<AutomaticPaymentTemplate>,
    automatic_payments: HashMap<(TemplateId, ColiverId), AutomaticPayment>,
    todos: HashMap<TodoId, Todo>,
    maintenance: HashMap<MaintenanceId, MaintenanceRequest>,
    transfers: HashMap<TransferId, TransferRequest>,
}

impl StoreState {
    fn transaction_id_taken(&self, payment: &Payment) -> bool {
        let Some(transaction_id) = payment.transaction_id.as_deref() else {
            return false;
        };
        self.payments.values().any(|other| {
            other.id != payment.id && other.transaction_id.as_deref() == Some(transaction_id)
        })
    }
}

/// Process-local store; every multi-record write happens under one lock.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    /// Add or replace a chapter by id.
    pub fn put_chapter(&self, chapter: Chapter) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.chapters.retain(|existing| existing.id != chapter.id);
        state.chapters.push(chapter);
        Ok(())
    }

    pub fn put_question(&self, question: Question) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.questions.retain(|existing| existing.id != question.id);
        state.questions.push(question);
        Ok(())
    }

    pub fn put_template(&self, template: AutomaticPaymentTemplate) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.templates.retain(|existing| existing.id != template.id);
        state.templates.push(template);
        Ok(())
    }
}

impl ApplicationRepository for InMemoryStore {
    fn insert_application(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut state = self.state()?;
        if state.applications.contains_key(&record.application.id) {
            return Err(RepositoryError::Conflict);
        }
        state
            .applications
            .insert(record.application.id.clone(), record.clone());
        Ok(record)
    }

    fn update_application(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if !state.applications.contains_key(&record.application.id) {
            return Err(RepositoryError::NotFound);
        }
        state
            .applications
            .insert(record.application.id.clone(), record);
        Ok(())
    }

    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self.state()?.applications.get(id).cloned())
    }

    fn applications_for_user(&self, user: &UserId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(self
            .state()?
            .applications
            .values()
            .filter(|record| &record.application.user_id == user)
            .cloned()
            .collect())
    }
}

impl ChapterRepository for InMemoryStore {
    fn chapters(&self) -> Result<Vec<Chapter>, RepositoryError> {
        let mut chapters = self.state()?.chapters.clone();
        chapters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(chapters)
    }

    fn chapter(&self, id: &ChapterId) -> Result<Option<Chapter>, RepositoryError> {
        Ok(self
            .state()?
            .chapters
            .iter()
            .find(|chapter| &chapter.id == id)
            .cloned())
    }

    fn bookings(&self) -> Result<Vec<ChapterBooking>, RepositoryError> {
        Ok(self.state()?.bookings.clone())
    }

    fn add_booking(&self, booking: ChapterBooking) -> Result<bool, RepositoryError> {
        let mut state = self.state()?;
        if state.bookings.contains(&booking) {
            return Ok(false);
        }
        state.bookings.push(booking);
        Ok(true)
    }
}

impl QuestionRepository for InMemoryStore {
    fn active_questions(&self, set: QuestionSet) -> Result<Vec<Question>, RepositoryError> {
        let questions = self.state()?.questions.clone();
        Ok(active_in_order(questions, set))
    }
}

impl ColiverRepository for InMemoryStore {
    fn upsert_coliver(
        &self,
        candidate: Coliver,
        refresh: &dyn Fn(&mut Coliver),
    ) -> Result<(Coliver, bool), RepositoryError> {
        let mut state = self.state()?;
        let key = candidate.key();

        if let Some(existing_id) = state.coliver_keys.get(&key).cloned() {
            let existing = state
                .colivers
                .get_mut(&existing_id)
                .ok_or(RepositoryError::NotFound)?;
            refresh(existing);
            return Ok((existing.clone(), false));
        }

        state.coliver_keys.insert(key, candidate.id.clone());
        state.colivers.insert(candidate.id.clone(), candidate.clone());
        Ok((candidate, true))
    }

    fn update_coliver(&self, coliver: Coliver) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let previous = state
            .colivers
            .get(&coliver.id)
            .map(Coliver::key)
            .ok_or(RepositoryError::NotFound)?;
        let key = coliver.key();
        if previous != key {
            if state.coliver_keys.contains_key(&key) {
                return Err(RepositoryError::Conflict);
            }
            state.coliver_keys.remove(&previous);
            state.coliver_keys.insert(key, coliver.id.clone());
        }
        state.colivers.insert(coliver.id.clone(), coliver);
        Ok(())
    }

    fn fetch_coliver(&self, id: &ColiverId) -> Result<Option<Coliver>, RepositoryError> {
        Ok(self.state()?.colivers.get(id).cloned())
    }

    fn colivers(&self) -> Result<Vec<Coliver>, RepositoryError> {
        let mut colivers: Vec<Coliver> = self.state()?.colivers.values().cloned().collect();
        colivers.sort_by(|a, b| b.arrival_date.cmp(&a.arrival_date));
        Ok(colivers)
    }

    fn latest_coliver_for_user(&self, user: &UserId) -> Result<Option<Coliver>, RepositoryError> {
        Ok(self
            .state()?
            .colivers
            .values()
            .filter(|coliver| &coliver.user_id == user)
            .max_by_key(|coliver| coliver.created_at)
            .cloned())
    }
}

impl PaymentRepository for InMemoryStore {
    fn insert_payment(&self, payment: Payment) -> Result<Payment, RepositoryError> {
        let mut state = self.state()?;
        if state.payments.contains_key(&payment.id) || state.transaction_id_taken(&payment) {
            return Err(RepositoryError::Conflict);
        }
        state.payments.insert(payment.id.clone(), payment.clone());
        Ok(payment)
    }

    fn update_payment(&self, payment: Payment) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if !state.payments.contains_key(&payment.id) {
            return Err(RepositoryError::NotFound);
        }
        if state.transaction_id_taken(&payment) {
            return Err(RepositoryError::Conflict);
        }
        state.payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    fn fetch_payment(&self, id: &PaymentId) -> Result<Option<Payment>, RepositoryError> {
        Ok(self.state()?.payments.get(id).cloned())
    }

    fn payments_for_user(&self, user: &UserId) -> Result<Vec<Payment>, RepositoryError> {
        let mut payments: Vec<Payment> = self
            .state()?
            .payments
            .values()
            .filter(|payment| &payment.user_id == user)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    fn templates(&self) -> Result<Vec<AutomaticPaymentTemplate>, RepositoryError> {
        Ok(self.state()?.templates.clone())
    }

    fn template(&self, id: &TemplateId) -> Result<Option<AutomaticPaymentTemplate>, RepositoryError> {
        Ok(self
            .state()?
            .templates
            .iter()
            .find(|template| &template.id == id)
            .cloned())
    }

    fn automatic_payment(
        &self,
        template: &TemplateId,
        coliver: &ColiverId,
    ) -> Result<Option<AutomaticPayment>, RepositoryError> {
        Ok(self
            .state()?
            .automatic_payments
            .get(&(template.clone(), coliver.clone()))
            .cloned())
    }

    fn automatic_payments_for(&self, coliver: &ColiverId) -> Result<Vec<AutomaticPayment>, RepositoryError> {
        Ok(self
            .state()?
            .automatic_payments
            .values()
            .filter(|link| &link.coliver_id == coliver)
            .cloned()
            .collect())
    }

    fn insert_automatic_payment(
        &self,
        template: &TemplateId,
        coliver: &ColiverId,
        payment: Payment,
    ) -> Result<AutomaticPayment, RepositoryError> {
        let mut state = self.state()?;
        let key = (template.clone(), coliver.clone());
        if state.automatic_payments.contains_key(&key) || state.payments.contains_key(&payment.id) {
            return Err(RepositoryError::Conflict);
        }

        let link = AutomaticPayment {
            template_id: template.clone(),
            coliver_id: coliver.clone(),
            payment_id: payment.id.clone(),
            created_at: Utc::now(),
        };
        state.payments.insert(payment.id.clone(), payment);
        state.automatic_payments.insert(key, link.clone());
        Ok(link)
    }
}

impl TodoRepository for InMemoryStore {
    fn insert_todo(&self, todo: Todo) -> Result<Todo, RepositoryError> {
        let mut state = self.state()?;
        if state.todos.contains_key(&todo.id) {
            return Err(RepositoryError::Conflict);
        }
        state.todos.insert(todo.id.clone(), todo.clone());
        Ok(todo)
    }

    fn insert_todo_once(&self, todo: Todo) -> Result<Option<Todo>, RepositoryError> {
        let mut state = self.state()?;
        let exists = state.todos.values().any(|existing| {
            existing.task_type == todo.task_type && existing.reference_id == todo.reference_id
        });
        if exists {
            return Ok(None);
        }
        state.todos.insert(todo.id.clone(), todo.clone());
        Ok(Some(todo))
    }

    fn update_todo(&self, todo: Todo) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if !state.todos.contains_key(&todo.id) {
            return Err(RepositoryError::NotFound);
        }
        state.todos.insert(todo.id.clone(), todo);
        Ok(())
    }

    fn fetch_todo(&self, id: &TodoId) -> Result<Option<Todo>, RepositoryError> {
        Ok(self.state()?.todos.get(id).cloned())
    }

    fn todos(&self) -> Result<Vec<Todo>, RepositoryError> {
        Ok(self.state()?.todos.values().cloned().collect())
    }

    fn todos_for(&self, task_type: TaskType, reference_id: &str) -> Result<Vec<Todo>, RepositoryError> {
        Ok(self
            .state()?
            .todos
            .values()
            .filter(|todo| todo.task_type == task_type && todo.reference_id == reference_id)
            .cloned()
            .collect())
    }
}

impl RequestRepository for InMemoryStore {
    fn insert_maintenance(&self, request: MaintenanceRequest) -> Result<MaintenanceRequest, RepositoryError> {
        let mut state = self.state()?;
        if state.maintenance.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        state.maintenance.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn update_maintenance(&self, request: MaintenanceRequest) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if !state.maintenance.contains_key(&request.id) {
            return Err(RepositoryError::NotFound);
        }
        state.maintenance.insert(request.id.clone(), request);
        Ok(())
    }

    fn fetch_maintenance(&self, id: &MaintenanceId) -> Result<Option<MaintenanceRequest>, RepositoryError> {
        Ok(self.state()?.maintenance.get(id).cloned())
    }

    fn insert_transfer(&self, request: TransferRequest) -> Result<TransferRequest, RepositoryError> {
        let mut state = self.state()?;
        if state.transfers.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        state.transfers.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn update_transfer(&self, request: TransferRequest) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if !state.transfers.contains_key(&request.id) {
            return Err(RepositoryError::NotFound);
        }
        state.transfers.insert(request.id.clone(), request);
        Ok(())
    }

    fn fetch_transfer(&self, id: &TransferId) -> Result<Option<TransferRequest>, RepositoryError> {
        Ok(self.state()?.transfers.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::workflows::onboarding::ColiverStatus;

    fn coliver(id: &str) -> Coliver {
        Coliver {
            id: ColiverId::from(id),
            user_id: UserId::from("usr-1"),
            first_name: "Mina".to_string(),
            last_name: "Park".to_string(),
            email: "mina@example.com".to_string(),
            arrival_date: NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid"),
            departure_date: NaiveDate::from_ymd_opt(2025, 5, 31).expect("valid"),
            chapter_id: None,
            manual_cost: None,
            is_active: true,
            status: ColiverStatus::Onboarding,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_resolves_same_stay_to_one_coliver() {
        let store = InMemoryStore::new();
        let (first, created) = store
            .upsert_coliver(coliver("col-a"), &|_| {})
            .expect("insert");
        assert!(created);

        let (second, created) = store
            .upsert_coliver(coliver("col-b"), &|existing| {
                existing.manual_cost = Some(Decimal::ONE)
            })
            .expect("upsert");
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.manual_cost, Some(Decimal::ONE));
        assert_eq!(store.colivers().expect("list").len(), 1);
    }

    #[test]
    fn automatic_payment_pair_is_unique() {
        let store = InMemoryStore::new();
        let template = TemplateId::from("tpl-1");
        let owner = ColiverId::from("col-1");
        let payment = || Payment::requested(UserId::from("usr-1"), Decimal::TEN, "Deposit", None);

        store
            .insert_automatic_payment(&template, &owner, payment())
            .expect("first link");
        let err = store
            .insert_automatic_payment(&template, &owner, payment())
            .expect_err("second link");
        assert_eq!(err, RepositoryError::Conflict);
        assert_eq!(
            store
                .payments_for_user(&UserId::from("usr-1"))
                .expect("payments")
                .len(),
            1
        );
    }

    #[test]
    fn transaction_ids_are_unique_across_payments() {
        let store = InMemoryStore::new();
        let mut first = Payment::requested(UserId::from("usr-1"), Decimal::TEN, "A", None);
        first.transaction_id = Some("TX-1".to_string());
        store.insert_payment(first).expect("first");

        let mut second = Payment::requested(UserId::from("usr-2"), Decimal::TEN, "B", None);
        store.insert_payment(second.clone()).expect("second");
        second.transaction_id = Some("TX-1".to_string());
        assert_eq!(store.update_payment(second), Err(RepositoryError::Conflict));
    }

    #[test]
    fn identical_bookings_are_recorded_once() {
        let store = InMemoryStore::new();
        let booking = ChapterBooking {
            chapter_id: ChapterId::from("chp-a"),
            start_date: NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid"),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 31).expect("valid"),
        };
        assert!(store.add_booking(booking.clone()).expect("first"));
        assert!(!store.add_booking(booking).expect("second"));
    }
}
