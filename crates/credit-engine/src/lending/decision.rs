use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::domain::{
    end_date_for, Customer, CustomerId, Loan, LoanId, LoanTerms, ValidationError,
};
use super::emi::monthly_installment;
use super::evaluation::{EligibilityEvaluator, EvaluationConfig, RejectionReason};
use super::scoring::{CreditScore, CreditScorer, ScoringConfig};

/// Composes the scorer and the evaluator. Pure over the snapshot it is handed.
#[derive(Debug, Clone, Default)]
pub struct CreditDecisionEngine {
    scorer: CreditScorer,
    evaluator: EligibilityEvaluator,
}

/// Outcome of an eligibility check, shaped for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityDecision {
    pub customer_id: CustomerId,
    pub approval: bool,
    pub credit_score: f64,
    pub interest_rate: f64,
    pub corrected_interest_rate: f64,
    pub tenure: u32,
    pub monthly_installment: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    #[serde(skip)]
    pub matched_rule: &'static str,
    #[serde(skip)]
    pub score: CreditScore,
}

impl EligibilityDecision {
    pub fn message(&self) -> String {
        match &self.rejection_reason {
            Some(reason) => format!("Loan request rejected: {}.", reason.summary()),
            None => "Loan approved successfully.".to_string(),
        }
    }
}

/// A loan the caller must persist, together with the debt increment to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedLoan {
    pub customer_id: CustomerId,
    pub loan_amount: f64,
    pub tenure: u32,
    pub interest_rate: f64,
    pub monthly_repayment: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ApprovedLoan {
    pub fn debt_increment(&self) -> f64 {
        self.loan_amount
    }

    pub fn into_loan(self, loan_id: LoanId) -> Loan {
        Loan {
            loan_id,
            customer_id: self.customer_id,
            loan_amount: self.loan_amount,
            tenure: self.tenure,
            interest_rate: self.interest_rate,
            monthly_repayment: self.monthly_repayment,
            emis_paid_on_time: 0,
            start_date: self.start_date,
            end_date: Some(self.end_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoanCreation {
    Approved {
        loan: ApprovedLoan,
        decision: EligibilityDecision,
    },
    Rejected {
        decision: EligibilityDecision,
    },
}

impl LoanCreation {
    pub fn decision(&self) -> &EligibilityDecision {
        match self {
            LoanCreation::Approved { decision, .. } | LoanCreation::Rejected { decision } => {
                decision
            }
        }
    }
}

impl CreditDecisionEngine {
    pub fn new(scoring: ScoringConfig, evaluation: EvaluationConfig) -> Self {
        Self {
            scorer: CreditScorer::new(scoring),
            evaluator: EligibilityEvaluator::new(evaluation),
        }
    }

    pub fn scorer(&self) -> &CreditScorer {
        &self.scorer
    }

    pub fn evaluator(&self) -> &EligibilityEvaluator {
        &self.evaluator
    }

    /// Score the customer and run the decision table for the proposed terms.
    pub fn check_eligibility(
        &self,
        customer: &Customer,
        history: &[Loan],
        terms: &LoanTerms,
        as_of: NaiveDate,
    ) -> Result<EligibilityDecision, ValidationError> {
        terms.validate()?;

        let proposed_emi = monthly_installment(terms.loan_amount, terms.interest_rate, terms.tenure);
        let score = self.scorer.score(customer, history, as_of);
        let active_emi: f64 = history
            .iter()
            .filter(|loan| loan.is_active(as_of))
            .map(|loan| loan.monthly_repayment)
            .sum();
        let total_outstanding_emi = active_emi + proposed_emi;

        let outcome = self.evaluator.evaluate(
            customer,
            score.value,
            total_outstanding_emi,
            terms.interest_rate,
        );

        let installment = if outcome.adjusted_interest_rate == terms.interest_rate {
            proposed_emi
        } else {
            monthly_installment(
                terms.loan_amount,
                outcome.adjusted_interest_rate,
                terms.tenure,
            )
        };

        debug!(
            customer_id = %customer.customer_id,
            score = score.value,
            total_outstanding_emi,
            rule = outcome.rule,
            "evaluated eligibility"
        );

        Ok(EligibilityDecision {
            customer_id: customer.customer_id,
            approval: outcome.approved,
            credit_score: score.value,
            interest_rate: terms.interest_rate,
            corrected_interest_rate: outcome.adjusted_interest_rate,
            tenure: terms.tenure,
            monthly_installment: installment,
            rejection_reason: outcome.rejection_reason,
            matched_rule: outcome.rule,
            score,
        })
    }

    /// Decide on a new loan. Approved loans come back unpersisted, for the caller to store.
    pub fn create_loan(
        &self,
        customer: &Customer,
        history: &[Loan],
        terms: &LoanTerms,
        as_of: NaiveDate,
    ) -> Result<LoanCreation, ValidationError> {
        let decision = self.check_eligibility(customer, history, terms, as_of)?;
        if !decision.approval {
            return Ok(LoanCreation::Rejected { decision });
        }

        let loan = ApprovedLoan {
            customer_id: customer.customer_id,
            loan_amount: terms.loan_amount,
            tenure: terms.tenure,
            interest_rate: decision.corrected_interest_rate,
            monthly_repayment: decision.monthly_installment,
            start_date: as_of,
            end_date: end_date_for(as_of, terms.tenure)?,
        };

        Ok(LoanCreation::Approved { loan, decision })
    }
}
