//! Credit decisioning: EMI arithmetic, history scoring, the eligibility decision table,
//! and the service and router that expose them to the request-handling layer.

pub mod decision;
pub mod domain;
pub mod emi;
pub mod evaluation;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use decision::{ApprovedLoan, CreditDecisionEngine, EligibilityDecision, LoanCreation};
pub use domain::{
    approved_limit_for, round_currency, Customer, CustomerId, CustomerRegistration, Loan, LoanId,
    LoanRequest, LoanTerms, ValidationError,
};
pub use emi::{compute_emi, monthly_installment};
pub use evaluation::{
    EligibilityEvaluator, EligibilityInputs, EligibilityOutcome, EvaluationConfig,
    RejectionReason,
};
pub use repository::{CustomerRepository, IdSequence, LoanRepository, RepositoryError};
pub use router::lending_router;
pub use scoring::{compute_score, CreditScore, CreditScorer, ScoringConfig};
pub use service::{LendingService, LendingServiceError, LoanApplicationResult};
