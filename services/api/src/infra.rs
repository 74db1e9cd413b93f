use chrono::NaiveDate;
use credit_engine::config::SeedDataConfig;
use credit_engine::error::AppError;
use credit_engine::ingest::{ImportSummary, LedgerImporter};
use credit_engine::lending::{
    CreditDecisionEngine, Customer, CustomerId, CustomerRepository, IdSequence, LendingService,
    Loan, LoanId, LoanRepository, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

pub(crate) type ApiLendingService =
    LendingService<InMemoryCustomerRepository, InMemoryLoanRepository, AtomicIdSequence>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCustomerRepository {
    records: Arc<Mutex<HashMap<CustomerId, Customer>>>,
}

impl CustomerRepository for InMemoryCustomerRepository {
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
pub(crate) struct InMemoryLoanRepository {
    records: Arc<Mutex<HashMap<LoanId, Loan>>>,
}

impl LoanRepository for InMemoryLoanRepository {
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
        let mut loans: Vec<Loan> = guard
            .values()
            .filter(|loan| loan.customer_id == id)
            .cloned()
            .collect();
        loans.sort_by_key(|loan| loan.loan_id);
        Ok(loans)
    }
}

/// Monotonic id allocator starting at 1.
#[derive(Default)]
pub(crate) struct AtomicIdSequence {
    last: AtomicU64,
}

impl IdSequence for AtomicIdSequence {
    fn next_id(&self) -> Result<u64, RepositoryError> {
        let previous = self.last.fetch_add(1, Ordering::SeqCst);
        previous
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Unavailable("id sequence exhausted".to_string()))
    }

    fn advance_past(&self, id: u64) -> Result<(), RepositoryError> {
        self.last.fetch_max(id, Ordering::SeqCst);
        Ok(())
    }
}

/// Process-local storage backing the HTTP service and the CLI commands.
#[derive(Default, Clone)]
pub(crate) struct LendingStores {
    pub(crate) customers: Arc<InMemoryCustomerRepository>,
    pub(crate) loans: Arc<InMemoryLoanRepository>,
    pub(crate) customer_ids: Arc<AtomicIdSequence>,
    pub(crate) loan_ids: Arc<AtomicIdSequence>,
}

impl LendingStores {
    /// Load optional customer and loan exports. Customers go first so loans can resolve owners.
    pub(crate) fn seed(
        &self,
        seed: &SeedDataConfig,
    ) -> Result<(Option<ImportSummary>, Option<ImportSummary>), AppError> {
        let customers = match &seed.customers_csv {
            Some(path) => {
                let summary = LedgerImporter::customers_from_path(
                    path,
                    self.customers.as_ref(),
                    self.customer_ids.as_ref(),
                )?;
                info!(path = %path.display(), created = summary.created, "seeded customers");
                Some(summary)
            }
            None => None,
        };

        let loans = match &seed.loans_csv {
            Some(path) => {
                let summary = LedgerImporter::loans_from_path(
                    path,
                    self.customers.as_ref(),
                    self.loans.as_ref(),
                    self.loan_ids.as_ref(),
                )?;
                info!(path = %path.display(), created = summary.created, "seeded loans");
                Some(summary)
            }
            None => None,
        };

        Ok((customers, loans))
    }

    pub(crate) fn service(&self, evaluation_date: Option<NaiveDate>) -> Arc<ApiLendingService> {
        let service = LendingService::new(
            self.customers.clone(),
            self.loans.clone(),
            self.customer_ids.clone(),
            self.loan_ids.clone(),
            CreditDecisionEngine::default(),
        );
        Arc::new(match evaluation_date {
            Some(date) => service.with_evaluation_date(date),
            None => service,
        })
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
