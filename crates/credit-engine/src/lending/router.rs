use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{CustomerId, CustomerRegistration, LoanId, LoanRequest};
use super::repository::{CustomerRepository, IdSequence, LoanRepository};
use super::service::{LendingService, LendingServiceError};
use super::views::RegistrationView;

/// Router builder exposing the lending operations over HTTP.
pub fn lending_router<C, L, S>(service: Arc<LendingService<C, L, S>>) -> Router
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
    S: IdSequence + 'static,
{
    Router::new()
        .route("/api/v1/register", post(register_handler::<C, L, S>))
        .route(
            "/api/v1/check-eligibility",
            post(check_eligibility_handler::<C, L, S>),
        )
        .route("/api/v1/create-loan", post(create_loan_handler::<C, L, S>))
        .route(
            "/api/v1/view-loan/:loan_id",
            get(view_loan_handler::<C, L, S>),
        )
        .route(
            "/api/v1/view-loans/:customer_id",
            get(view_loans_handler::<C, L, S>),
        )
        .with_state(service)
}

pub(crate) async fn register_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    axum::Json(registration): axum::Json<CustomerRegistration>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
    S: IdSequence + 'static,
{
    match service.register(registration) {
        Ok(customer) => (
            StatusCode::CREATED,
            axum::Json(RegistrationView::from(&customer)),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn check_eligibility_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    axum::Json(request): axum::Json<LoanRequest>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
    S: IdSequence + 'static,
{
    match service.check_eligibility(&request) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_loan_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    axum::Json(request): axum::Json<LoanRequest>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
    S: IdSequence + 'static,
{
    match service.create_loan(&request) {
        Ok(result) => {
            let status = if result.approved() {
                StatusCode::CREATED
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, axum::Json(result.view())).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn view_loan_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    Path(loan_id): Path<u64>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
    S: IdSequence + 'static,
{
    match service.view_loan(LoanId(loan_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn view_loans_handler<C, L, S>(
    State(service): State<Arc<LendingService<C, L, S>>>,
    Path(customer_id): Path<u64>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
    S: IdSequence + 'static,
{
    match service.view_loans(CustomerId(customer_id)) {
        Ok(loans) => (StatusCode::OK, axum::Json(loans)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: LendingServiceError) -> Response {
    let status = match &err {
        LendingServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        LendingServiceError::CustomerNotFound(_) | LendingServiceError::LoanNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        LendingServiceError::DuplicatePhoneNumber(_) => StatusCode::CONFLICT,
        LendingServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
