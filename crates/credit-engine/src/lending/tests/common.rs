use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::lending::decision::CreditDecisionEngine;
use crate::lending::domain::{
    Customer, CustomerId, CustomerRegistration, Loan, LoanId, LoanRequest,
};
use crate::lending::repository::{
    CustomerRepository, IdSequence, LoanRepository, RepositoryError,
};
use crate::lending::service::LendingService;

pub(super) type MemoryService = LendingService<MemoryCustomers, MemoryLoans, MemorySequence>;

pub(super) fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
}

pub(super) fn customer(id: u64, salary: f64, current_debt: f64) -> Customer {
    Customer {
        customer_id: CustomerId(id),
        first_name: "Kiran".to_string(),
        last_name: "Shah".to_string(),
        phone_number: Some(format!("98000000{id:02}")),
        age: 34,
        monthly_salary: salary,
        approved_limit: crate::lending::domain::approved_limit_for(salary),
        current_debt,
    }
}

pub(super) fn registration(phone_number: &str) -> CustomerRegistration {
    CustomerRegistration {
        first_name: "Nisha".to_string(),
        last_name: "Verma".to_string(),
        age: 27,
        monthly_income: 50_000.0,
        phone_number: phone_number.to_string(),
    }
}

pub(super) fn loan_request(customer_id: u64, amount: f64, rate: f64, tenure: u32) -> LoanRequest {
    LoanRequest {
        customer_id: CustomerId(customer_id),
        loan_amount: amount,
        interest_rate: rate,
        tenure,
    }
}

pub(super) fn historical_loan(
    id: u64,
    customer_id: u64,
    amount: f64,
    start: NaiveDate,
    tenure: u32,
    paid: u32,
) -> Loan {
    Loan {
        loan_id: LoanId(id),
        customer_id: CustomerId(customer_id),
        loan_amount: amount,
        tenure,
        interest_rate: 11.0,
        monthly_repayment: crate::lending::emi::monthly_installment(amount, 11.0, tenure),
        emis_paid_on_time: paid,
        start_date: start,
        end_date: crate::lending::domain::end_date_for(start, tenure).ok(),
    }
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<MemoryCustomers>, Arc<MemoryLoans>) {
    let customers = Arc::new(MemoryCustomers::default());
    let loans = Arc::new(MemoryLoans::default());
    let service = LendingService::new(
        customers.clone(),
        loans.clone(),
        Arc::new(MemorySequence::default()),
        Arc::new(MemorySequence::default()),
        CreditDecisionEngine::default(),
    )
    .with_evaluation_date(evaluation_date());
    (Arc::new(service), customers, loans)
}

/// Service over arbitrary repositories with fresh id sequences and the pinned evaluation date.
pub(super) fn service_over<C, L>(
    customers: Arc<C>,
    loans: Arc<L>,
) -> LendingService<C, L, MemorySequence>
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    LendingService::new(
        customers,
        loans,
        Arc::new(MemorySequence::default()),
        Arc::new(MemorySequence::default()),
        CreditDecisionEngine::default(),
    )
    .with_evaluation_date(evaluation_date())
}

#[derive(Default, Clone)]
pub(super) struct MemoryCustomers {
    records: Arc<Mutex<BTreeMap<CustomerId, Customer>>>,
}

impl MemoryCustomers {
    pub(super) fn seed(&self, customer: Customer) {
        self.insert(customer).expect("seed customer");
    }
}

impl CustomerRepository for MemoryCustomers {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&customer.customer_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|customer| customer.phone_number.as_deref() == Some(phone_number))
            .cloned())
    }

    fn add_debt(&self, id: CustomerId, amount: f64) -> Result<Customer, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let customer = guard.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        customer.current_debt += amount;
        Ok(customer.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLoans {
    records: Arc<Mutex<BTreeMap<LoanId, Loan>>>,
}

impl MemoryLoans {
    pub(super) fn seed(&self, loan: Loan) {
        self.insert(loan).expect("seed loan");
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl LoanRepository for MemoryLoans {
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&loan.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(loan.loan_id, loan.clone());
        Ok(loan)
    }

    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn for_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|loan| loan.customer_id == id)
            .cloned()
            .collect())
    }
}

pub(super) struct MemorySequence {
    last: AtomicU64,
}

impl Default for MemorySequence {
    fn default() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }
}

impl IdSequence for MemorySequence {
    fn next_id(&self) -> Result<u64, RepositoryError> {
        Ok(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn advance_past(&self, id: u64) -> Result<(), RepositoryError> {
        self.last.fetch_max(id, Ordering::SeqCst);
        Ok(())
    }
}

/// Widens the gap between the phone lookup and the insert that follows it.
pub(super) struct SlowPhoneLookup {
    pub(super) inner: MemoryCustomers,
    pub(super) delay: Duration,
}

impl CustomerRepository for SlowPhoneLookup {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        self.inner.insert(customer)
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        let found = self.inner.find_by_phone(phone_number)?;
        thread::sleep(self.delay);
        Ok(found)
    }

    fn add_debt(&self, id: CustomerId, amount: f64) -> Result<Customer, RepositoryError> {
        self.inner.add_debt(id, amount)
    }
}

/// Customer store whose debt updates always fail.
pub(super) struct FailingDebtUpdates {
    pub(super) inner: MemoryCustomers,
}

impl CustomerRepository for FailingDebtUpdates {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        self.inner.insert(customer)
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        self.inner.find_by_phone(phone_number)
    }

    fn add_debt(&self, _id: CustomerId, _amount: f64) -> Result<Customer, RepositoryError> {
        Err(RepositoryError::Unavailable("debt ledger offline".to_string()))
    }
}

/// Loan store that reads fine but refuses every write.
#[derive(Default)]
pub(super) struct ReadOnlyLoans {
    pub(super) inner: MemoryLoans,
}

impl LoanRepository for ReadOnlyLoans {
    fn insert(&self, _loan: Loan) -> Result<Loan, RepositoryError> {
        Err(RepositoryError::Unavailable("loan table is read-only".to_string()))
    }

    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn for_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        self.inner.for_customer(id)
    }
}

pub(super) struct UnavailableLoans;

impl LoanRepository for UnavailableLoans {
    fn insert(&self, _loan: Loan) -> Result<Loan, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_customer(&self, _id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
