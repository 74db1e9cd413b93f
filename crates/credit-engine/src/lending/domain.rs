use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Multiplier applied to the monthly salary when deriving the approved limit.
pub const APPROVED_LIMIT_SALARY_MULTIPLE: f64 = 36.0;
/// Approved limits are always a whole multiple of this amount (one lakh).
pub const APPROVED_LIMIT_STEP: f64 = 100_000.0;

/// Identifier wrapper for registered customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for historical and newly created loans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a customer as persisted by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub age: u16,
    pub monthly_salary: f64,
    pub approved_limit: f64,
    pub current_debt: f64,
}

impl Customer {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn exceeds_approved_limit(&self) -> bool {
        self.current_debt > self.approved_limit
    }
}

/// Details collected when a new customer registers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRegistration {
    pub first_name: String,
    pub last_name: String,
    pub age: u16,
    #[serde(alias = "monthly_salary")]
    pub monthly_income: f64,
    pub phone_number: String,
}

impl CustomerRegistration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingField("first_name"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(ValidationError::MissingField("phone_number"));
        }
        ensure_positive(self.monthly_income, ValidationError::NonPositiveSalary)
    }

    /// Build the persisted customer for an allocated id. Callers validate first.
    pub fn into_customer(self, customer_id: CustomerId) -> Customer {
        let approved_limit = approved_limit_for(self.monthly_income);
        Customer {
            customer_id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_number: Some(self.phone_number.trim().to_string()),
            age: self.age,
            monthly_salary: self.monthly_income,
            approved_limit,
            current_debt: 0.0,
        }
    }
}

/// Historical or freshly approved loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: f64,
    pub tenure: u32,
    pub interest_rate: f64,
    pub monthly_repayment: f64,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl Loan {
    pub fn repayments_left(&self) -> u32 {
        self.tenure.saturating_sub(self.emis_paid_on_time)
    }

    /// A loan without an end date, or one ending on/after `as_of`, is still open.
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.end_date.map_or(true, |end| end >= as_of)
    }

    /// Installments that have fallen due by `as_of`, never more than the tenure.
    pub fn emis_due(&self, as_of: NaiveDate) -> u32 {
        whole_months_between(self.start_date, as_of).min(self.tenure)
    }

    /// On-time installments counted against what has actually fallen due.
    pub fn emis_paid_on_time_by(&self, as_of: NaiveDate) -> u32 {
        self.emis_paid_on_time.min(self.emis_due(as_of))
    }

    pub fn started_in_year(&self, year: i32) -> bool {
        self.start_date.year() == year
    }
}

/// Terms of a proposed loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenure: u32,
}

impl LoanTerms {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_positive(self.loan_amount, ValidationError::NonPositiveLoanAmount)?;
        if self.tenure == 0 {
            return Err(ValidationError::NonPositiveTenure);
        }
        if !self.interest_rate.is_finite() || self.interest_rate < 0.0 {
            return Err(ValidationError::InvalidInterestRate(self.interest_rate));
        }
        Ok(())
    }
}

/// Request body shared by the eligibility check and loan creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub customer_id: CustomerId,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenure: u32,
}

impl LoanRequest {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            tenure: self.tenure,
        }
    }
}

/// Malformed or missing numeric input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("monthly salary must be a positive amount (found {0})")]
    NonPositiveSalary(f64),
    #[error("loan amount must be a positive amount (found {0})")]
    NonPositiveLoanAmount(f64),
    #[error("tenure must be at least one month")]
    NonPositiveTenure,
    #[error("interest rate must be a non-negative percentage (found {0})")]
    InvalidInterestRate(f64),
    #[error("tenure of {0} months runs past the supported calendar")]
    TenureOutOfRange(u32),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

fn ensure_positive(
    value: f64,
    error: impl FnOnce(f64) -> ValidationError,
) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(error(value))
    }
}

/// Round a monetary amount half away from zero to two decimals.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// 36 x monthly salary, rounded to the nearest 100,000.
pub fn approved_limit_for(monthly_salary: f64) -> f64 {
    (APPROVED_LIMIT_SALARY_MULTIPLE * monthly_salary / APPROVED_LIMIT_STEP).round()
        * APPROVED_LIMIT_STEP
}

/// Date of the final installment for a loan starting on `start`.
pub fn end_date_for(start: NaiveDate, tenure: u32) -> Result<NaiveDate, ValidationError> {
    start
        .checked_add_months(Months::new(tenure))
        .ok_or(ValidationError::TenureOutOfRange(tenure))
}

fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }

    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    u32::try_from(months).unwrap_or(0)
}
