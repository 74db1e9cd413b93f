use serde::{Deserialize, Serialize};

/// Reasons a loan request is turned down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RejectionReason {
    DebtExceedsLimit,
    EmiExceedsSalaryShare { max_ratio: f64 },
    CreditScoreTooLow,
}

impl RejectionReason {
    pub fn summary(&self) -> String {
        match self {
            RejectionReason::DebtExceedsLimit => "debt exceeds limit".to_string(),
            RejectionReason::EmiExceedsSalaryShare { max_ratio } => {
                format!("EMI exceeds {:.0}% of salary", max_ratio * 100.0)
            }
            RejectionReason::CreditScoreTooLow => "credit score too low".to_string(),
        }
    }
}

/// Result of running the decision table for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityOutcome {
    pub approved: bool,
    pub adjusted_interest_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    pub rule: &'static str,
}

impl EligibilityOutcome {
    pub fn summary(&self) -> String {
        match &self.rejection_reason {
            Some(reason) => format!("rejected: {}", reason.summary()),
            None => format!(
                "approved at {:.2}% ({})",
                self.adjusted_interest_rate, self.rule
            ),
        }
    }
}
