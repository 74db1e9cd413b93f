//! Bulk CSV ingestion of customers and loan history into the repositories.

mod parser;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::lending::domain::{approved_limit_for, round_currency};
use crate::lending::{
    monthly_installment, Customer, CustomerId, CustomerRepository, IdSequence, Loan, LoanId,
    LoanRepository, RepositoryError,
};

use parser::{CustomerRow, LoanRow};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read ledger export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ledger CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not store ledger data: {0}")]
    Repository(#[from] RepositoryError),
}

/// Why a row was left out of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingId,
    Duplicate,
    UnknownCustomer,
    InvalidField,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl ImportSummary {
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }
}

/// Loads customer and loan exports. Customers must be imported before their loans.
pub struct LedgerImporter;

impl LedgerImporter {
    pub fn customers_from_path<P, C, S>(
        path: P,
        customers: &C,
        customer_ids: &S,
    ) -> Result<ImportSummary, ImportError>
    where
        P: AsRef<Path>,
        C: CustomerRepository,
        S: IdSequence,
    {
        let file = std::fs::File::open(path)?;
        Self::customers_from_reader(file, customers, customer_ids)
    }

    pub fn customers_from_reader<R, C, S>(
        reader: R,
        customers: &C,
        customer_ids: &S,
    ) -> Result<ImportSummary, ImportError>
    where
        R: Read,
        C: CustomerRepository,
        S: IdSequence,
    {
        let mut summary = ImportSummary::default();
        let mut highest_id = 0;

        for (index, row) in parser::parse_rows::<_, CustomerRow>(reader)?
            .into_iter()
            .enumerate()
        {
            let line = index + 2;
            let customer = match customer_from_row(&row) {
                Ok(customer) => customer,
                Err(reason) => {
                    warn!(line, ?reason, "skipping customer row");
                    summary.skip(reason);
                    continue;
                }
            };

            if customers.fetch(customer.customer_id)?.is_some() {
                warn!(line, customer_id = %customer.customer_id, "skipping duplicate customer");
                summary.skip(SkipReason::Duplicate);
                continue;
            }

            let id = customer.customer_id.0;
            match customers.insert(customer) {
                Ok(_) => {
                    summary.created += 1;
                    highest_id = highest_id.max(id);
                }
                Err(RepositoryError::Conflict) => summary.skip(SkipReason::Duplicate),
                Err(err) => return Err(err.into()),
            }
        }

        if highest_id > 0 {
            customer_ids.advance_past(highest_id)?;
        }

        info!(
            created = summary.created,
            skipped = summary.total_skipped(),
            "imported customers"
        );
        Ok(summary)
    }

    pub fn loans_from_path<P, C, L, S>(
        path: P,
        customers: &C,
        loans: &L,
        loan_ids: &S,
    ) -> Result<ImportSummary, ImportError>
    where
        P: AsRef<Path>,
        C: CustomerRepository,
        L: LoanRepository,
        S: IdSequence,
    {
        let file = std::fs::File::open(path)?;
        Self::loans_from_reader(file, customers, loans, loan_ids)
    }

    /// Monthly repayments are recomputed from each loan's own terms rather than trusted.
    pub fn loans_from_reader<R, C, L, S>(
        reader: R,
        customers: &C,
        loans: &L,
        loan_ids: &S,
    ) -> Result<ImportSummary, ImportError>
    where
        R: Read,
        C: CustomerRepository,
        L: LoanRepository,
        S: IdSequence,
    {
        let mut summary = ImportSummary::default();
        let mut highest_id = 0;

        for (index, row) in parser::parse_rows::<_, LoanRow>(reader)?
            .into_iter()
            .enumerate()
        {
            let line = index + 2;
            let loan = match loan_from_row(&row) {
                Ok(loan) => loan,
                Err(reason) => {
                    warn!(line, ?reason, "skipping loan row");
                    summary.skip(reason);
                    continue;
                }
            };

            if customers.fetch(loan.customer_id)?.is_none() {
                warn!(line, customer_id = %loan.customer_id, "skipping loan for unknown customer");
                summary.skip(SkipReason::UnknownCustomer);
                continue;
            }
            if loans.fetch(loan.loan_id)?.is_some() {
                warn!(line, loan_id = %loan.loan_id, "skipping duplicate loan");
                summary.skip(SkipReason::Duplicate);
                continue;
            }

            let id = loan.loan_id.0;
            match loans.insert(loan) {
                Ok(_) => {
                    summary.created += 1;
                    highest_id = highest_id.max(id);
                }
                Err(RepositoryError::Conflict) => summary.skip(SkipReason::Duplicate),
                Err(err) => return Err(err.into()),
            }
        }

        if highest_id > 0 {
            loan_ids.advance_past(highest_id)?;
        }

        info!(
            created = summary.created,
            skipped = summary.total_skipped(),
            "imported loans"
        );
        Ok(summary)
    }
}

fn customer_from_row(row: &CustomerRow) -> Result<Customer, SkipReason> {
    let customer_id =
        parser::parse_id(row.customer_id.as_deref()).ok_or(SkipReason::MissingId)?;
    let first_name = row.first_name.clone().ok_or(SkipReason::InvalidField)?;
    let monthly_salary = parser::parse_number(row.monthly_salary.as_deref())
        .filter(|salary| *salary > 0.0)
        .ok_or(SkipReason::InvalidField)?;

    let age = match row.age.as_deref() {
        Some(raw) => parser::parse_count(Some(raw))
            .and_then(|age| u16::try_from(age).ok())
            .ok_or(SkipReason::InvalidField)?,
        None => 0,
    };
    let approved_limit = match row.approved_limit.as_deref() {
        Some(raw) => parser::parse_number(Some(raw)).ok_or(SkipReason::InvalidField)?,
        None => approved_limit_for(monthly_salary),
    };
    let current_debt = match row.current_debt.as_deref() {
        Some(raw) => parser::parse_number(Some(raw)).ok_or(SkipReason::InvalidField)?,
        None => 0.0,
    };

    Ok(Customer {
        customer_id: CustomerId(customer_id),
        first_name,
        last_name: row.last_name.clone().unwrap_or_default(),
        phone_number: row.phone_number.clone(),
        age,
        monthly_salary,
        approved_limit,
        current_debt: round_currency(current_debt),
    })
}

fn loan_from_row(row: &LoanRow) -> Result<Loan, SkipReason> {
    let customer_id =
        parser::parse_id(row.customer_id.as_deref()).ok_or(SkipReason::MissingId)?;
    let loan_id = parser::parse_id(row.loan_id.as_deref()).ok_or(SkipReason::MissingId)?;

    let loan_amount = parser::parse_number(row.loan_amount.as_deref())
        .filter(|amount| *amount > 0.0)
        .ok_or(SkipReason::InvalidField)?;
    let tenure = parser::parse_count(row.tenure.as_deref())
        .filter(|tenure| *tenure > 0)
        .ok_or(SkipReason::InvalidField)?;
    let interest_rate = parser::parse_number(row.interest_rate.as_deref())
        .filter(|rate| *rate >= 0.0)
        .ok_or(SkipReason::InvalidField)?;
    let emis_paid_on_time = match row.emis_paid_on_time.as_deref() {
        Some(raw) => parser::parse_count(Some(raw)).ok_or(SkipReason::InvalidField)?,
        None => 0,
    };
    let start_date =
        parser::parse_date(row.start_date.as_deref()).ok_or(SkipReason::InvalidField)?;
    let end_date = match row.end_date.as_deref() {
        Some(raw) => Some(parser::parse_date(Some(raw)).ok_or(SkipReason::InvalidField)?),
        None => None,
    };

    Ok(Loan {
        loan_id: LoanId(loan_id),
        customer_id: CustomerId(customer_id),
        loan_amount,
        tenure,
        interest_rate,
        monthly_repayment: monthly_installment(loan_amount, interest_rate, tenure),
        emis_paid_on_time,
        start_date,
        end_date,
    })
}
