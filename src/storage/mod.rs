//! All things related to the storage of reminders and customers

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error as ThisError;

use crate::customers::Customer;
use crate::reminders::Reminder;
use crate::reminders::ReminderDraft;

#[cfg(any(test, not(feature = "postgres")))]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

/// Setup the storage
#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
pub async fn setup() -> memory::Memory {
    memory::Memory::new()
}

/// Setup the storage
#[cfg(feature = "postgres")]
pub async fn setup() -> postgres::Postgres {
    postgres::Postgres::new().await
}

/// Storage errors
#[derive(Debug, ThisError)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// A mutation touched a different number of rows than it should have
    #[error("Unexpected row count for {operation}: {rows}")]
    UnexpectedRowCount {
        /// The attempted operation
        operation: &'static str,

        /// The number of rows actually affected
        rows: u64,
    },
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Storage with all supported operations
///
/// Every reminder operation scopes by account id to enforce tenant isolation,
/// reads filter out soft-deleted rows, and reads only ever return the
/// displayable projection.
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Find all reminders of an account, optionally filtered by customer
    async fn find_all_reminders(
        &self,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>>;

    /// Find the reminders whose datetime falls on a calendar date
    async fn find_reminders_by_date(
        &self,
        date: NaiveDate,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>>;

    /// Find the reminders whose datetime falls in a calendar month
    async fn find_reminders_by_month(
        &self,
        month: u32,
        year: i32,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>>;

    /// Find the reminders whose date component is within `[from, to]`
    async fn find_reminders_by_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>>;

    /// Find a single reminder by id, scoped to an account
    async fn find_single_reminder_by_id(
        &self,
        id: i64,
        account_id: i64,
    ) -> Result<Option<Reminder>>;

    /// Insert a new reminder, returning the generated id
    async fn create_reminder(&self, draft: &ReminderDraft) -> Result<i64>;

    /// Update the reminder matched by `(id, account_id)`
    ///
    /// Exactly one row must be affected
    async fn update_reminder(&self, id: i64, account_id: i64, draft: &ReminderDraft) -> Result<()>;

    /// Soft-delete the reminder matched by `(id, account_id)`
    ///
    /// Exactly one row must be affected; the row itself stays around
    async fn delete_reminder(&self, id: i64, account_id: i64) -> Result<()>;

    /// Flip the completion flag of the reminder matched by `(id, account_id)`
    ///
    /// Exactly one row must be affected
    async fn mark_reminder_done(&self, id: i64, account_id: i64) -> Result<()>;

    /// Find a single customer by id, scoped to an account
    async fn find_single_customer_by_id(
        &self,
        id: i64,
        account_id: i64,
    ) -> Result<Option<Customer>>;
}
