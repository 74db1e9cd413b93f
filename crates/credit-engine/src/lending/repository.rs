use super::domain::{Customer, CustomerId, Loan, LoanId};

/// Storage abstraction for customer records.
pub trait CustomerRepository: Send + Sync {
    /// Fails with `Conflict` when the id is already taken.
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError>;
    fn fetch(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;
    fn find_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError>;
    /// Atomically add `amount` to the customer's current debt and return the updated record.
    fn add_debt(&self, id: CustomerId, amount: f64) -> Result<Customer, RepositoryError>;
}

/// Storage abstraction for loan history. Append-only.
pub trait LoanRepository: Send + Sync {
    /// Fails with `Conflict` when the id is already taken.
    fn insert(&self, loan: Loan) -> Result<Loan, RepositoryError>;
    fn fetch(&self, id: LoanId) -> Result<Option<Loan>, RepositoryError>;
    fn for_customer(&self, id: CustomerId) -> Result<Vec<Loan>, RepositoryError>;
}

/// Externally owned id allocator. Allocation must be atomic.
pub trait IdSequence: Send + Sync {
    fn next_id(&self) -> Result<u64, RepositoryError>;
    /// Ensure future allocations are strictly greater than `id` (used after bulk ingestion).
    fn advance_past(&self, id: u64) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
