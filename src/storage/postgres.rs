//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::customers::Customer;
use crate::reminders::Reminder;
use crate::reminders::ReminderDraft;

use super::Error;
use super::Result;
use super::Storage;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Use the `DATABASE_URL` environment variable
    ///
    /// Migrations will be run
    pub async fn new() -> Self {
        let database_connection_string = std::env::var("DATABASE_URL").expect("Valid DATABASE_URL");

        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_connection_string)
            .await
            .expect("Valid connection");

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Self {
        let migration_result = MIGRATOR.run(&connection_pool).await;

        if let Err(err) = migration_result {
            panic!("Migrations could not run: {err}");
        }

        Self { connection_pool }
    }

    /// Run a single-row mutation, enforcing the exactly-one-row contract
    async fn execute_single_row(
        &self,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
        operation: &'static str,
    ) -> Result<()> {
        let result = query
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(Error::UnexpectedRowCount {
                operation,
                rows: result.rows_affected(),
            })
        }
    }
}

/// `SQLx` version of the displayable reminder projection
///
/// The done flag is stored as a 0/1 smallint
#[derive(sqlx::FromRow)]
struct ReminderRow {
    id: i64,
    description: String,
    customer_id: Option<i64>,
    datetime: NaiveDateTime,
    is_done: i16,
}

impl ReminderRow {
    /// Create a reminder from the `SQLx` version
    fn into_reminder(self) -> Reminder {
        Reminder {
            id: self.id,
            description: self.description,
            customer_id: self.customer_id,
            datetime: self.datetime,
            is_done: self.is_done != 0,
        }
    }

    /// Create multiple reminders from the `SQLx` version
    fn into_reminder_multiple(rows: Vec<Self>) -> Vec<Reminder> {
        rows.into_iter()
            .map(Self::into_reminder)
            .collect::<Vec<Reminder>>()
    }
}

/// `SQLx` version of a customer
#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    phone: Option<String>,
}

impl CustomerRow {
    /// Create a customer from the `SQLx` version
    fn into_customer(self) -> Customer {
        Customer {
            id: self.id,
            name: self.name,
            phone: self.phone,
        }
    }
}

/// The displayable columns every reminder read projects
const DISPLAYABLE_FIELDS: &str = "id, description, customer_id, datetime, is_done";

#[async_trait]
impl Storage for Postgres {
    async fn find_all_reminders(
        &self,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, ReminderRow>(&format!(
            r"
            SELECT {DISPLAYABLE_FIELDS}
            FROM reminders
            WHERE is_deleted = 0
                AND account_id = $1
                AND ($2::BIGINT IS NULL OR customer_id = $2)
            ORDER BY id
            ",
        ))
        .bind(account_id)
        .bind(customer_id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(ReminderRow::into_reminder_multiple(rows))
    }

    async fn find_reminders_by_date(
        &self,
        date: NaiveDate,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, ReminderRow>(&format!(
            r"
            SELECT {DISPLAYABLE_FIELDS}
            FROM reminders
            WHERE is_deleted = 0
                AND account_id = $1
                AND ($2::BIGINT IS NULL OR customer_id = $2)
                AND datetime::DATE = $3
            ORDER BY id
            ",
        ))
        .bind(account_id)
        .bind(customer_id)
        .bind(date)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(ReminderRow::into_reminder_multiple(rows))
    }

    async fn find_reminders_by_month(
        &self,
        month: u32,
        year: i32,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, ReminderRow>(&format!(
            r"
            SELECT {DISPLAYABLE_FIELDS}
            FROM reminders
            WHERE is_deleted = 0
                AND account_id = $1
                AND ($2::BIGINT IS NULL OR customer_id = $2)
                AND EXTRACT(MONTH FROM datetime)::INT = $3
                AND EXTRACT(YEAR FROM datetime)::INT = $4
            ORDER BY id
            ",
        ))
        .bind(account_id)
        .bind(customer_id)
        .bind(i32::try_from(month).expect("month fits in i32"))
        .bind(year)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(ReminderRow::into_reminder_multiple(rows))
    }

    async fn find_reminders_by_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, ReminderRow>(&format!(
            r"
            SELECT {DISPLAYABLE_FIELDS}
            FROM reminders
            WHERE is_deleted = 0
                AND account_id = $1
                AND ($2::BIGINT IS NULL OR customer_id = $2)
                AND datetime::DATE >= $3
                AND datetime::DATE <= $4
            ORDER BY id
            ",
        ))
        .bind(account_id)
        .bind(customer_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(ReminderRow::into_reminder_multiple(rows))
    }

    async fn find_single_reminder_by_id(
        &self,
        id: i64,
        account_id: i64,
    ) -> Result<Option<Reminder>> {
        let row = sqlx::query_as::<_, ReminderRow>(&format!(
            r"
            SELECT {DISPLAYABLE_FIELDS}
            FROM reminders
            WHERE is_deleted = 0
                AND id = $1
                AND account_id = $2
            LIMIT 1
            ",
        ))
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(row.map(ReminderRow::into_reminder))
    }

    async fn create_reminder(&self, draft: &ReminderDraft) -> Result<i64> {
        let (id,) = sqlx::query_as::<_, (i64,)>(
            r"
            INSERT INTO reminders (account_id, customer_id, description, datetime, is_done)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(draft.account_id)
        .bind(draft.customer_id)
        .bind(&draft.description)
        .bind(draft.datetime)
        .bind(i16::from(draft.is_done))
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => Error::UnexpectedRowCount {
                operation: "insert reminder",
                rows: 0,
            },
            err => connection_error(err),
        })?;

        Ok(id)
    }

    async fn update_reminder(&self, id: i64, account_id: i64, draft: &ReminderDraft) -> Result<()> {
        let query = sqlx::query(
            r"
            UPDATE reminders
            SET description = $3, datetime = $4, is_done = $5, customer_id = $6
            WHERE id = $1 AND account_id = $2
            ",
        )
        .bind(id)
        .bind(account_id)
        .bind(&draft.description)
        .bind(draft.datetime)
        .bind(i16::from(draft.is_done))
        .bind(draft.customer_id);

        self.execute_single_row(query, "update reminder").await
    }

    async fn delete_reminder(&self, id: i64, account_id: i64) -> Result<()> {
        let query = sqlx::query(
            r"
            UPDATE reminders
            SET is_deleted = 1
            WHERE id = $1 AND account_id = $2
            ",
        )
        .bind(id)
        .bind(account_id);

        self.execute_single_row(query, "delete reminder").await
    }

    async fn mark_reminder_done(&self, id: i64, account_id: i64) -> Result<()> {
        let query = sqlx::query(
            r"
            UPDATE reminders
            SET is_done = 1
            WHERE id = $1 AND account_id = $2
            ",
        )
        .bind(id)
        .bind(account_id);

        self.execute_single_row(query, "mark reminder as done").await
    }

    async fn find_single_customer_by_id(
        &self,
        id: i64,
        account_id: i64,
    ) -> Result<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, name, phone
            FROM customers
            WHERE is_deleted = 0
                AND id = $1
                AND account_id = $2
            LIMIT 1
            ",
        )
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(row.map(CustomerRow::into_customer))
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
