use serde::{Deserialize, Serialize};

/// Thresholds backing the eligibility decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Share of monthly salary that all installments together may consume.
    pub max_emi_to_salary_ratio: f64,
    /// Scores strictly above this are approved at the requested rate.
    pub prime_score_threshold: f64,
    /// Scores in (standard, prime] are approved with `standard_rate_floor`.
    pub standard_score_threshold: f64,
    /// Scores in (minimum, standard] are approved with `subprime_rate_floor`; at or below, rejected.
    pub minimum_score_threshold: f64,
    pub standard_rate_floor: f64,
    pub subprime_rate_floor: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_emi_to_salary_ratio: 0.5,
            prime_score_threshold: 50.0,
            standard_score_threshold: 30.0,
            minimum_score_threshold: 10.0,
            standard_rate_floor: 12.0,
            subprime_rate_floor: 16.0,
        }
    }
}
