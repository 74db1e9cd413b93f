use serde::Serialize;

use super::config::EvaluationConfig;
use super::policy::RejectionReason;
use super::EligibilityInputs;

/// Predicate half of a decision rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCondition {
    DebtExceedsApprovedLimit,
    EmiExceedsSalaryShare { max_ratio: f64 },
    ScoreAbove { threshold: f64 },
    ScoreWithin { above: f64, up_to: f64 },
    Always,
}

impl RuleCondition {
    pub fn matches(&self, inputs: &EligibilityInputs) -> bool {
        match self {
            RuleCondition::DebtExceedsApprovedLimit => inputs.current_debt > inputs.approved_limit,
            RuleCondition::EmiExceedsSalaryShare { max_ratio } => {
                inputs.total_outstanding_emi > max_ratio * inputs.monthly_salary
            }
            RuleCondition::ScoreAbove { threshold } => inputs.score > *threshold,
            RuleCondition::ScoreWithin { above, up_to } => {
                inputs.score > *above && inputs.score <= *up_to
            }
            RuleCondition::Always => true,
        }
    }
}

/// Outcome half of a decision rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleOutcome {
    Approve { rate_floor: Option<f64> },
    Reject { reason: RejectionReason },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRule {
    pub name: &'static str,
    pub condition: RuleCondition,
    pub outcome: RuleOutcome,
}

/// Ordered, first-match-wins list of rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionTable {
    rules: Vec<DecisionRule>,
}

impl DecisionTable {
    pub fn new(rules: Vec<DecisionRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &EvaluationConfig) -> Self {
        Self::new(vec![
            DecisionRule {
                name: "debt_exceeds_limit",
                condition: RuleCondition::DebtExceedsApprovedLimit,
                outcome: RuleOutcome::Reject {
                    reason: RejectionReason::DebtExceedsLimit,
                },
            },
            DecisionRule {
                name: "emi_exceeds_salary_share",
                condition: RuleCondition::EmiExceedsSalaryShare {
                    max_ratio: config.max_emi_to_salary_ratio,
                },
                outcome: RuleOutcome::Reject {
                    reason: RejectionReason::EmiExceedsSalaryShare {
                        max_ratio: config.max_emi_to_salary_ratio,
                    },
                },
            },
            DecisionRule {
                name: "prime_score",
                condition: RuleCondition::ScoreAbove {
                    threshold: config.prime_score_threshold,
                },
                outcome: RuleOutcome::Approve { rate_floor: None },
            },
            DecisionRule {
                name: "standard_score",
                condition: RuleCondition::ScoreWithin {
                    above: config.standard_score_threshold,
                    up_to: config.prime_score_threshold,
                },
                outcome: RuleOutcome::Approve {
                    rate_floor: Some(config.standard_rate_floor),
                },
            },
            DecisionRule {
                name: "subprime_score",
                condition: RuleCondition::ScoreWithin {
                    above: config.minimum_score_threshold,
                    up_to: config.standard_score_threshold,
                },
                outcome: RuleOutcome::Approve {
                    rate_floor: Some(config.subprime_rate_floor),
                },
            },
            DecisionRule {
                name: "score_too_low",
                condition: RuleCondition::Always,
                outcome: RuleOutcome::Reject {
                    reason: RejectionReason::CreditScoreTooLow,
                },
            },
        ])
    }

    pub fn rules(&self) -> &[DecisionRule] {
        &self.rules
    }

    pub fn first_match(&self, inputs: &EligibilityInputs) -> Option<&DecisionRule> {
        self.rules.iter().find(|rule| rule.condition.matches(inputs))
    }
}
