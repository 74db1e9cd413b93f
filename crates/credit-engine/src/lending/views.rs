use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Customer, CustomerId, Loan, LoanId};

/// Response body for a freshly registered customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationView {
    pub customer_id: CustomerId,
    pub name: String,
    pub age: u16,
    pub monthly_income: f64,
    pub approved_limit: f64,
    pub phone_number: Option<String>,
}

impl From<&Customer> for RegistrationView {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            name: customer.name(),
            age: customer.age,
            monthly_income: customer.monthly_salary,
            approved_limit: customer.approved_limit,
            phone_number: customer.phone_number.clone(),
        }
    }
}

/// Customer snapshot embedded in a loan detail response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSnapshotView {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub age: u16,
    pub monthly_salary: f64,
    pub approved_limit: f64,
    pub current_debt: f64,
}

impl From<&Customer> for CustomerSnapshotView {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            phone_number: customer.phone_number.clone(),
            age: customer.age,
            monthly_salary: customer.monthly_salary,
            approved_limit: customer.approved_limit,
            current_debt: customer.current_debt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanDetailView {
    pub loan_id: LoanId,
    pub customer: CustomerSnapshotView,
    pub loan_amount: f64,
    pub tenure: u32,
    pub interest_rate: f64,
    pub monthly_repayment: f64,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub repayments_left: u32,
}

impl LoanDetailView {
    pub fn new(loan: &Loan, customer: &Customer) -> Self {
        Self {
            loan_id: loan.loan_id,
            customer: CustomerSnapshotView::from(customer),
            loan_amount: loan.loan_amount,
            tenure: loan.tenure,
            interest_rate: loan.interest_rate,
            monthly_repayment: loan.monthly_repayment,
            emis_paid_on_time: loan.emis_paid_on_time,
            start_date: loan.start_date,
            end_date: loan.end_date,
            repayments_left: loan.repayments_left(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanSummaryView {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: f64,
    pub tenure: u32,
    pub interest_rate: f64,
    pub monthly_repayment: f64,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub repayments_left: u32,
}

impl From<&Loan> for LoanSummaryView {
    fn from(loan: &Loan) -> Self {
        Self {
            loan_id: loan.loan_id,
            customer_id: loan.customer_id,
            loan_amount: loan.loan_amount,
            tenure: loan.tenure,
            interest_rate: loan.interest_rate,
            monthly_repayment: loan.monthly_repayment,
            emis_paid_on_time: loan.emis_paid_on_time,
            start_date: loan.start_date,
            end_date: loan.end_date,
            repayments_left: loan.repayments_left(),
        }
    }
}

/// Response body for loan creation, approved or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanCreationView {
    pub loan_id: Option<LoanId>,
    pub customer_id: CustomerId,
    pub loan_approved: bool,
    pub message: String,
    pub monthly_installment: f64,
}
