//! In-memory stores shared by the integration suites.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use credit_engine::lending::{
    CreditDecisionEngine, Customer, CustomerId, CustomerRepository, IdSequence, LendingService,
    Loan, LoanId, LoanRepository, RepositoryError,
};

pub type Service = LendingService<Customers, Loans, Sequence>;

pub fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid evaluation date")
}

pub struct Stores {
    pub customers: Arc<Customers>,
    pub loans: Arc<Loans>,
    pub customer_ids: Arc<Sequence>,
    pub loan_ids: Arc<Sequence>,
}

impl Stores {
    pub fn new() -> Self {
        Self {
            customers: Arc::new(Customers::default()),
            loans: Arc::new(Loans::default()),
            customer_ids: Arc::new(Sequence::default()),
            loan_ids: Arc::new(Sequence::default()),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        Arc::new(
            LendingService::new(
                self.customers.clone(),
                self.loans.clone(),
                self.customer_ids.clone(),
                self.loan_ids.clone(),
                CreditDecisionEngine::default(),
            )
            .with_evaluation_date(evaluation_date()),
        )
    }
}

#[derive(Default)]
pub struct Customers {
    records: Mutex<BTreeMap<CustomerId, Customer>>,
}

impl Customers {
    pub fn len(&self) -> usize {
        self.records.lock().expect("customers lock").len()
    }
}

impl CustomerRepository for Customers {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut records = self.records.lock().expect("customers lock");
        if records.contains_key(&customer.customer_id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }

    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.records.lock().expect("customers lock").get(&id).cloned())
    }

    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("customers lock")
            .values()
            .find(|customer| customer.phone_number.as_deref() == Some(phone_number))
            .cloned())
    }

    fn add_debt(&self, id: CustomerId, amount: f64) -> Result<Customer, RepositoryError> {
        let mut records = self.records.lock().expect("customers lock");
        let customer = records.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        customer.current_debt += amount;
        Ok(customer.clone())
    }
}

#[derive(Default)]
pub struct Loans {
    records: Mutex<BTreeMap<LoanId, Loan>>,
}

impl Loans {
    pub fn len(&self) -> usize {
        self.records.lock().expect("loans lock").len()
    }
}

impl LoanRepository for Loans {
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError> {
        let mut records = self.records.lock().expect("loans lock");
        if records.contains_key(&loan.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(loan.loan_id, loan.clone());
        Ok(loan)
    }

    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError> {
        Ok(self.records.lock().expect("loans lock").get(&id).cloned())
    }

    fn for_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("loans lock")
            .values()
            .filter(|loan| loan.customer_id == id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct Sequence {
    last: AtomicU64,
}

impl IdSequence for Sequence {
    fn next_id(&self) -> Result<u64, RepositoryError> {
        Ok(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn advance_past(&self, id: u64) -> Result<(), RepositoryError> {
        self.last.fetch_max(id, Ordering::SeqCst);
        Ok(())
    }
}

pub async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
