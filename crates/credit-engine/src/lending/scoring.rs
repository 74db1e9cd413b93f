use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{Customer, Loan};

/// Weights and saturation points for the historical credit score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub new_customer_score: f64,
    pub on_time_weight: f64,
    pub loan_count_weight: f64,
    pub recent_activity_weight: f64,
    pub volume_weight: f64,
    pub loan_count_saturation: u32,
    pub recent_loan_saturation: u32,
    pub volume_salary_years: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            new_customer_score: 51.0,
            on_time_weight: 0.30,
            loan_count_weight: 0.20,
            recent_activity_weight: 0.20,
            volume_weight: 0.30,
            loan_count_saturation: 5,
            recent_loan_saturation: 3,
            volume_salary_years: 2.0,
        }
    }
}

/// Factors feeding the credit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    OnTimeRepayment,
    LoanCount,
    RecentActivity,
    LoanVolume,
}

/// One weighted contribution, kept so decisions can be audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub ratio: f64,
    pub weight: f64,
    pub points: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScore {
    /// 0-100, two decimals.
    pub value: f64,
    pub components: Vec<ScoreComponent>,
}

impl CreditScore {
    pub fn is_new_customer(&self) -> bool {
        self.components.is_empty()
    }
}

/// Stateless scorer over a customer's loan history.
#[derive(Debug, Clone, Default)]
pub struct CreditScorer {
    config: ScoringConfig,
}

impl CreditScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score `history` as of the given date. "Recent" means started in the same calendar year.
    pub fn score(&self, customer: &Customer, history: &[Loan], as_of: NaiveDate) -> CreditScore {
        if history.is_empty() {
            return CreditScore {
                value: finalize(self.config.new_customer_score),
                components: Vec::new(),
            };
        }

        let config = &self.config;
        let mut components = Vec::with_capacity(4);

        let emis_due: u64 = history.iter().map(|loan| u64::from(loan.emis_due(as_of))).sum();
        let emis_on_time: u64 = history
            .iter()
            .map(|loan| u64::from(loan.emis_paid_on_time_by(as_of)))
            .sum();
        let on_time_ratio = if emis_due == 0 {
            0.0
        } else {
            emis_on_time as f64 / emis_due as f64
        };
        components.push(component(
            ScoreFactor::OnTimeRepayment,
            on_time_ratio,
            config.on_time_weight,
            if emis_due == 0 {
                "no installments due yet".to_string()
            } else {
                format!("{emis_on_time} of {emis_due} installments paid on time")
            },
        ));

        let loan_count = history.len();
        components.push(component(
            ScoreFactor::LoanCount,
            saturating_ratio(loan_count as f64, config.loan_count_saturation as f64),
            config.loan_count_weight,
            format!(
                "{loan_count} loan(s), saturates at {}",
                config.loan_count_saturation
            ),
        ));

        let recent = history
            .iter()
            .filter(|loan| loan.started_in_year(as_of.year()))
            .count();
        components.push(component(
            ScoreFactor::RecentActivity,
            saturating_ratio(recent as f64, config.recent_loan_saturation as f64),
            config.recent_activity_weight,
            format!("{recent} loan(s) started in {}", as_of.year()),
        ));

        let volume: f64 = history.iter().map(|loan| loan.loan_amount).sum();
        let volume_cap = config.volume_salary_years * customer.monthly_salary * 12.0;
        components.push(component(
            ScoreFactor::LoanVolume,
            saturating_ratio(volume, volume_cap),
            config.volume_weight,
            format!("total volume {volume:.2} against cap {volume_cap:.2}"),
        ));

        let weighted: f64 = components.iter().map(|component| component.points).sum();

        CreditScore {
            value: finalize(weighted),
            components,
        }
    }
}

/// Convenience wrapper using the default weights.
pub fn compute_score(customer: &Customer, history: &[Loan], as_of: NaiveDate) -> f64 {
    CreditScorer::default().score(customer, history, as_of).value
}

fn component(factor: ScoreFactor, ratio: f64, weight: f64, notes: String) -> ScoreComponent {
    let ratio = unit_interval(ratio);
    ScoreComponent {
        factor,
        ratio,
        weight,
        points: 100.0 * weight * ratio,
        notes,
    }
}

fn saturating_ratio(value: f64, saturation: f64) -> f64 {
    if saturation <= 0.0 {
        return 0.0;
    }
    (value / saturation).min(1.0)
}

fn unit_interval(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn finalize(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    ((score.clamp(0.0, 100.0)) * 100.0).round() / 100.0
}
