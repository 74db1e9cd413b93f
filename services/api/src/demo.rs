use crate::infra::{parse_date, ApiLendingService, LendingStores};
use chrono::{Local, NaiveDate};
use clap::Args;
use credit_engine::config::SeedDataConfig;
use credit_engine::error::AppError;
use credit_engine::ingest::ImportSummary;
use credit_engine::lending::{
    CustomerId, CustomerRegistration, EligibilityDecision, LoanRequest,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct IngestArgs {
    /// Customer export (CSV)
    #[arg(long)]
    pub(crate) customers_csv: PathBuf,
    /// Loan history export (CSV)
    #[arg(long)]
    pub(crate) loans_csv: Option<PathBuf>,
    /// Print the credit score breakdown for this customer after loading
    #[arg(long)]
    pub(crate) customer: Option<u64>,
    /// Evaluation date for the score breakdown (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Optional customer export to load before the walkthrough
    #[arg(long)]
    pub(crate) customers_csv: Option<PathBuf>,
    /// Optional loan history export to load before the walkthrough
    #[arg(long)]
    pub(crate) loans_csv: Option<PathBuf>,
}

pub(crate) fn run_ingest(args: IngestArgs) -> Result<(), AppError> {
    let IngestArgs {
        customers_csv,
        loans_csv,
        customer,
        as_of,
    } = args;

    let stores = LendingStores::default();
    let (customer_summary, loan_summary) = stores.seed(&SeedDataConfig {
        customers_csv: Some(customers_csv),
        loans_csv,
    })?;

    println!("Ledger import");
    if let Some(summary) = customer_summary {
        render_summary("Customers", &summary);
    }
    if let Some(summary) = loan_summary {
        render_summary("Loans", &summary);
    }

    if let Some(customer_id) = customer {
        let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
        let service = stores.service(Some(as_of));
        render_score_breakdown(&service, CustomerId(customer_id), as_of);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        as_of,
        customers_csv,
        loans_csv,
    } = args;

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let stores = LendingStores::default();
    let seed = SeedDataConfig {
        customers_csv,
        loans_csv,
    };
    if !seed.is_empty() {
        let (customers, loans) = stores.seed(&seed)?;
        if let Some(summary) = customers {
            render_summary("Customers", &summary);
        }
        if let Some(summary) = loans {
            render_summary("Loans", &summary);
        }
    }

    let service = stores.service(Some(as_of));
    println!("Credit engine demo (evaluated as of {as_of})");

    let registration = CustomerRegistration {
        first_name: "Demo".to_string(),
        last_name: "Borrower".to_string(),
        age: 34,
        monthly_income: 75_000.0,
        phone_number: format!("demo-{}", as_of.format("%Y%m%d")),
    };
    let customer = match service.register(registration) {
        Ok(customer) => customer,
        Err(err) => {
            println!("  Registration failed: {}", err);
            return Ok(());
        }
    };
    println!(
        "\nRegistered customer {} ({}) with approved limit {:.2}",
        customer.customer_id,
        customer.name(),
        customer.approved_limit
    );

    let first = LoanRequest {
        customer_id: customer.customer_id,
        loan_amount: 250_000.0,
        interest_rate: 11.0,
        tenure: 24,
    };
    println!(
        "\nEligibility for {:.2} over {} months at {:.2}%",
        first.loan_amount, first.tenure, first.interest_rate
    );
    match service.check_eligibility(&first) {
        Ok(decision) => render_decision(&decision),
        Err(err) => println!("  Eligibility check failed: {}", err),
    }

    match service.create_loan(&first) {
        Ok(result) => {
            let view = result.view();
            match view.loan_id {
                Some(loan_id) => println!(
                    "  Loan {} created, installment {:.2}",
                    loan_id, view.monthly_installment
                ),
                None => println!("  {}", view.message),
            }
        }
        Err(err) => println!("  Loan creation failed: {}", err),
    }

    // The first loan's installment now counts against the salary share.
    let second = LoanRequest {
        customer_id: customer.customer_id,
        loan_amount: 900_000.0,
        interest_rate: 9.5,
        tenure: 24,
    };
    println!(
        "\nFollow-up request for {:.2} over {} months at {:.2}%",
        second.loan_amount, second.tenure, second.interest_rate
    );
    match service.create_loan(&second) {
        Ok(result) => println!("  {}", result.decision.message()),
        Err(err) => println!("  Loan creation failed: {}", err),
    }

    match service.view_loans(customer.customer_id) {
        Ok(loans) => match serde_json::to_string_pretty(&loans) {
            Ok(json) => println!("\nLoans on file:\n{}", json),
            Err(err) => println!("\nLoans on file unavailable: {}", err),
        },
        Err(err) => println!("\nLoans on file unavailable: {}", err),
    }

    render_score_breakdown(&service, customer.customer_id, as_of);
    Ok(())
}

fn render_summary(label: &str, summary: &ImportSummary) {
    println!(
        "  {}: {} created, {} skipped",
        label,
        summary.created,
        summary.total_skipped()
    );
    for (reason, count) in &summary.skipped {
        println!("    - {:?}: {}", reason, count);
    }
}

fn render_decision(decision: &EligibilityDecision) {
    println!(
        "  Credit score {:.2} -> {}",
        decision.credit_score,
        if decision.approval { "approved" } else { "rejected" }
    );
    println!(
        "  Rate {:.2}% (requested {:.2}%), installment {:.2}, rule {}",
        decision.corrected_interest_rate,
        decision.interest_rate,
        decision.monthly_installment,
        decision.matched_rule
    );
    if let Some(reason) = &decision.rejection_reason {
        println!("  Reason: {}", reason.summary());
    }
}

fn render_score_breakdown(service: &ApiLendingService, customer_id: CustomerId, as_of: NaiveDate) {
    let score = match service.credit_score(customer_id) {
        Ok(score) => score,
        Err(err) => {
            println!("\nScore breakdown unavailable: {}", err);
            return;
        }
    };

    println!(
        "\nScore breakdown for customer {} as of {}: {:.2}",
        customer_id, as_of, score.value
    );
    if score.is_new_customer() {
        println!("  No loan history; new-customer score applies");
    }
    for component in &score.components {
        println!(
            "  {:?}: {:.2} points ({})",
            component.factor, component.points, component.notes
        );
    }
}
