use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use super::decision::{CreditDecisionEngine, EligibilityDecision, LoanCreation};
use super::domain::{
    Customer, CustomerId, CustomerRegistration, Loan, LoanId, LoanRequest, ValidationError,
};
use super::repository::{CustomerRepository, IdSequence, LoanRepository, RepositoryError};
use super::scoring::CreditScore;
use super::views::{LoanCreationView, LoanDetailView, LoanSummaryView};

/// Service exposing the lending operations over the storage seams.
pub struct LendingService<C, L, S> {
    customers: Arc<C>,
    loans: Arc<L>,
    customer_ids: Arc<S>,
    loan_ids: Arc<S>,
    engine: Arc<CreditDecisionEngine>,
    evaluation_date: Option<NaiveDate>,
    /// Held across every check-then-write sequence: phone uniqueness and debt updates.
    writes: Mutex<()>,
}

/// Loan creation result: the stored loan when approved, and the decision either way.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanApplicationResult {
    pub loan: Option<Loan>,
    pub decision: EligibilityDecision,
}

impl LoanApplicationResult {
    pub fn approved(&self) -> bool {
        self.loan.is_some()
    }

    pub fn view(&self) -> LoanCreationView {
        LoanCreationView {
            loan_id: self.loan.as_ref().map(|loan| loan.loan_id),
            customer_id: self.decision.customer_id,
            loan_approved: self.approved(),
            message: self.decision.message(),
            monthly_installment: self.decision.monthly_installment,
        }
    }
}

impl<C, L, S> LendingService<C, L, S>
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
    S: IdSequence + 'static,
{
    pub fn new(
        customers: Arc<C>,
        loans: Arc<L>,
        customer_ids: Arc<S>,
        loan_ids: Arc<S>,
        engine: CreditDecisionEngine,
    ) -> Self {
        Self {
            customers,
            loans,
            customer_ids,
            loan_ids,
            engine: Arc::new(engine),
            evaluation_date: None,
            writes: Mutex::new(()),
        }
    }

    /// Pin the evaluation date instead of using today's local date.
    pub fn with_evaluation_date(mut self, date: NaiveDate) -> Self {
        self.evaluation_date = Some(date);
        self
    }

    pub fn engine(&self) -> &CreditDecisionEngine {
        &self.engine
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, RepositoryError> {
        self.writes
            .lock()
            .map_err(|_| RepositoryError::Unavailable("write lock poisoned".to_string()))
    }

    fn today(&self) -> NaiveDate {
        self.evaluation_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Register a customer, allocating an id and deriving the approved limit.
    pub fn register(
        &self,
        registration: CustomerRegistration,
    ) -> Result<Customer, LendingServiceError> {
        registration.validate()?;
        let _writes = self.lock_writes()?;

        let phone_number = registration.phone_number.trim().to_string();
        if self.customers.find_by_phone(&phone_number)?.is_some() {
            return Err(LendingServiceError::DuplicatePhoneNumber(phone_number));
        }

        let customer_id = CustomerId(self.customer_ids.next_id()?);
        let customer = match self.customers.insert(registration.into_customer(customer_id)) {
            Ok(customer) => customer,
            Err(RepositoryError::Conflict) => {
                return Err(LendingServiceError::DuplicatePhoneNumber(phone_number))
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            customer_id = %customer.customer_id,
            approved_limit = customer.approved_limit,
            "registered customer"
        );
        Ok(customer)
    }

    /// Score the customer and decide on the proposed loan without persisting anything.
    pub fn check_eligibility(
        &self,
        request: &LoanRequest,
    ) -> Result<EligibilityDecision, LendingServiceError> {
        let customer = self.customer(request.customer_id)?;
        let history = self.loans.for_customer(customer.customer_id)?;
        let decision =
            self.engine
                .check_eligibility(&customer, &history, &request.terms(), self.today())?;

        info!(
            customer_id = %customer.customer_id,
            credit_score = decision.credit_score,
            approval = decision.approval,
            rule = decision.matched_rule,
            "eligibility checked"
        );
        Ok(decision)
    }

    /// Decide on and, when approved, persist a new loan while bumping the customer's debt.
    pub fn create_loan(
        &self,
        request: &LoanRequest,
    ) -> Result<LoanApplicationResult, LendingServiceError> {
        let _writes = self.lock_writes()?;

        let customer = self.customer(request.customer_id)?;
        let history = self.loans.for_customer(customer.customer_id)?;
        let creation =
            self.engine
                .create_loan(&customer, &history, &request.terms(), self.today())?;

        match creation {
            LoanCreation::Approved { loan, decision } => {
                let debt_increment = loan.debt_increment();
                let loan_id = LoanId(self.loan_ids.next_id()?);
                // Debt first: a failed loan insert is undone, a failed debt update leaves nothing.
                let updated = self.customers.add_debt(customer.customer_id, debt_increment)?;
                let stored = match self.loans.insert(loan.into_loan(loan_id)) {
                    Ok(stored) => stored,
                    Err(err) => {
                        if let Err(rollback) =
                            self.customers.add_debt(customer.customer_id, -debt_increment)
                        {
                            warn!(
                                customer_id = %customer.customer_id,
                                error = %rollback,
                                "failed to revert debt after loan insert failure"
                            );
                        }
                        return Err(err.into());
                    }
                };

                info!(
                    customer_id = %customer.customer_id,
                    loan_id = %stored.loan_id,
                    current_debt = updated.current_debt,
                    "loan created"
                );
                Ok(LoanApplicationResult {
                    loan: Some(stored),
                    decision,
                })
            }
            LoanCreation::Rejected { decision } => {
                info!(
                    customer_id = %customer.customer_id,
                    reason = %decision.message(),
                    "loan rejected"
                );
                Ok(LoanApplicationResult {
                    loan: None,
                    decision,
                })
            }
        }
    }

    pub fn view_loan(&self, loan_id: LoanId) -> Result<LoanDetailView, LendingServiceError> {
        let loan = self
            .loans
            .fetch(loan_id)?
            .ok_or(LendingServiceError::LoanNotFound(loan_id))?;
        let customer = self.customer(loan.customer_id)?;
        Ok(LoanDetailView::new(&loan, &customer))
    }

    pub fn view_loans(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<LoanSummaryView>, LendingServiceError> {
        let customer = self.customer(customer_id)?;
        let loans = self.loans.for_customer(customer.customer_id)?;
        Ok(loans.iter().map(LoanSummaryView::from).collect())
    }

    /// Score breakdown for the customer's recorded history as of the evaluation date.
    pub fn credit_score(&self, customer_id: CustomerId) -> Result<CreditScore, LendingServiceError> {
        let customer = self.customer(customer_id)?;
        let history = self.loans.for_customer(customer.customer_id)?;
        Ok(self
            .engine
            .scorer()
            .score(&customer, &history, self.today()))
    }

    pub fn customer(&self, customer_id: CustomerId) -> Result<Customer, LendingServiceError> {
        self.customers
            .fetch(customer_id)?
            .ok_or(LendingServiceError::CustomerNotFound(customer_id))
    }
}

/// Error raised by the lending service.
#[derive(Debug, thiserror::Error)]
pub enum LendingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),
    #[error("loan {0} not found")]
    LoanNotFound(LoanId),
    #[error("customer with phone number {0} already exists")]
    DuplicatePhoneNumber(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
