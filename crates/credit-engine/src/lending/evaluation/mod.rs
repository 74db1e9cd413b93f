mod config;
mod policy;
mod rules;

pub use config::EvaluationConfig;
pub use policy::{EligibilityOutcome, RejectionReason};
pub use rules::{DecisionRule, DecisionTable, RuleCondition, RuleOutcome};

use super::domain::Customer;

/// Values the decision table is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EligibilityInputs {
    pub current_debt: f64,
    pub approved_limit: f64,
    pub monthly_salary: f64,
    pub score: f64,
    /// Every active installment plus the proposed one.
    pub total_outstanding_emi: f64,
    pub proposed_interest_rate: f64,
}

/// Stateless evaluator applying the ordered decision table.
#[derive(Debug, Clone)]
pub struct EligibilityEvaluator {
    table: DecisionTable,
}

impl Default for EligibilityEvaluator {
    fn default() -> Self {
        Self::new(EvaluationConfig::default())
    }
}

impl EligibilityEvaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self::with_table(DecisionTable::from_config(&config))
    }

    pub fn with_table(table: DecisionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DecisionTable {
        &self.table
    }

    pub fn evaluate(
        &self,
        customer: &Customer,
        score: f64,
        total_outstanding_emi: f64,
        proposed_interest_rate: f64,
    ) -> EligibilityOutcome {
        self.evaluate_inputs(&EligibilityInputs {
            current_debt: customer.current_debt,
            approved_limit: customer.approved_limit,
            monthly_salary: customer.monthly_salary,
            score,
            total_outstanding_emi,
            proposed_interest_rate,
        })
    }

    pub fn evaluate_inputs(&self, inputs: &EligibilityInputs) -> EligibilityOutcome {
        let proposed = inputs.proposed_interest_rate;
        let Some(rule) = self.table.first_match(inputs) else {
            return EligibilityOutcome {
                approved: false,
                adjusted_interest_rate: proposed,
                rejection_reason: Some(RejectionReason::CreditScoreTooLow),
                rule: "no_rule_matched",
            };
        };

        match &rule.outcome {
            RuleOutcome::Approve { rate_floor } => EligibilityOutcome {
                approved: true,
                adjusted_interest_rate: rate_floor.map_or(proposed, |floor| proposed.max(floor)),
                rejection_reason: None,
                rule: rule.name,
            },
            RuleOutcome::Reject { reason } => EligibilityOutcome {
                approved: false,
                adjusted_interest_rate: proposed,
                rejection_reason: Some(*reason),
                rule: rule.name,
            },
        }
    }
}
