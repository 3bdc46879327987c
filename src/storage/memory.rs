//! Memory storage
//!
//! Will be destroyed on system shutdown; also backs the test suite

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chrono::Datelike;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::customers::Customer;
use crate::reminders::Reminder;
use crate::reminders::ReminderDraft;

use super::Error;
use super::Result;
use super::Storage;

/// A stored reminder row, soft-delete flag included
#[derive(Clone, Debug)]
struct ReminderRow {
    id: i64,
    account_id: i64,
    customer_id: Option<i64>,
    description: String,
    datetime: chrono::NaiveDateTime,
    is_done: bool,
    is_deleted: bool,
}

impl ReminderRow {
    /// The displayable projection of the row
    fn to_reminder(&self) -> Reminder {
        Reminder {
            id: self.id,
            description: self.description.clone(),
            customer_id: self.customer_id,
            datetime: self.datetime,
            is_done: self.is_done,
        }
    }

    /// Is the row visible to this account?
    fn is_visible_to(&self, account_id: i64) -> bool {
        !self.is_deleted && self.account_id == account_id
    }
}

/// A stored customer row
#[derive(Clone, Debug)]
struct CustomerRow {
    id: i64,
    account_id: i64,
    name: String,
    phone: Option<String>,
    is_deleted: bool,
}

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug)]
pub struct Memory {
    /// All reminder rows in storage
    reminders: Arc<Mutex<HashMap<i64, ReminderRow>>>,

    /// All customer rows in storage
    customers: Arc<Mutex<HashMap<i64, CustomerRow>>>,

    /// Next generated reminder id
    next_reminder_id: Arc<AtomicI64>,

    /// Next generated customer id
    next_customer_id: Arc<AtomicI64>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self {
            reminders: Arc::new(Mutex::new(HashMap::new())),
            customers: Arc::new(Mutex::new(HashMap::new())),
            next_reminder_id: Arc::new(AtomicI64::new(1)),
            next_customer_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Insert a customer, returning its generated id
    ///
    /// Customers are owned by another service; this seam exists for the test
    /// suite and local experiments
    pub async fn add_customer(
        &self,
        account_id: i64,
        name: &str,
        phone: Option<&str>,
    ) -> i64 {
        let id = self.next_customer_id.fetch_add(1, Ordering::SeqCst);

        let row = CustomerRow {
            id,
            account_id,
            name: name.to_string(),
            phone: phone.map(ToString::to_string),
            is_deleted: false,
        };

        self.customers.lock().await.insert(id, row);

        id
    }

    /// Collect the visible reminders of an account matching a row predicate
    async fn filter_reminders<P>(
        &self,
        account_id: i64,
        customer_id: Option<i64>,
        predicate: P,
    ) -> Vec<Reminder>
    where
        P: Fn(&ReminderRow) -> bool,
    {
        let mut reminders = self
            .reminders
            .lock()
            .await
            .values()
            .filter(|row| row.is_visible_to(account_id))
            .filter(|row| customer_id.is_none() || row.customer_id == customer_id)
            .filter(|row| predicate(row))
            .map(ReminderRow::to_reminder)
            .collect::<Vec<Reminder>>();

        reminders.sort_by_key(|reminder| reminder.id);

        reminders
    }

    /// Mutate the row matched by `(id, account_id)`, enforcing the
    /// exactly-one-row contract
    ///
    /// Matches rows regardless of their soft-delete state, like the SQL
    /// `UPDATE ... WHERE id AND account_id` it mirrors
    async fn update_row<M>(&self, id: i64, account_id: i64, operation: &'static str, mutate: M) -> Result<()>
    where
        M: FnOnce(&mut ReminderRow),
    {
        let mut reminders = self.reminders.lock().await;

        match reminders
            .get_mut(&id)
            .filter(|row| row.account_id == account_id)
        {
            Some(row) => {
                mutate(row);
                Ok(())
            }
            None => Err(Error::UnexpectedRowCount { operation, rows: 0 }),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for Memory {
    async fn find_all_reminders(
        &self,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>> {
        Ok(self.filter_reminders(account_id, customer_id, |_| true).await)
    }

    async fn find_reminders_by_date(
        &self,
        date: NaiveDate,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>> {
        Ok(self
            .filter_reminders(account_id, customer_id, |row| row.datetime.date() == date)
            .await)
    }

    async fn find_reminders_by_month(
        &self,
        month: u32,
        year: i32,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>> {
        Ok(self
            .filter_reminders(account_id, customer_id, |row| {
                row.datetime.month() == month && row.datetime.year() == year
            })
            .await)
    }

    async fn find_reminders_by_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        account_id: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<Reminder>> {
        Ok(self
            .filter_reminders(account_id, customer_id, |row| {
                let date = row.datetime.date();
                date >= from && date <= to
            })
            .await)
    }

    async fn find_single_reminder_by_id(
        &self,
        id: i64,
        account_id: i64,
    ) -> Result<Option<Reminder>> {
        Ok(self
            .reminders
            .lock()
            .await
            .get(&id)
            .filter(|row| row.is_visible_to(account_id))
            .map(ReminderRow::to_reminder))
    }

    async fn create_reminder(&self, draft: &ReminderDraft) -> Result<i64> {
        let id = self.next_reminder_id.fetch_add(1, Ordering::SeqCst);

        let row = ReminderRow {
            id,
            account_id: draft.account_id,
            customer_id: draft.customer_id,
            description: draft.description.clone(),
            datetime: draft.datetime,
            is_done: draft.is_done,
            is_deleted: false,
        };

        self.reminders.lock().await.insert(id, row);

        Ok(id)
    }

    async fn update_reminder(&self, id: i64, account_id: i64, draft: &ReminderDraft) -> Result<()> {
        self.update_row(id, account_id, "update reminder", |row| {
            row.description = draft.description.clone();
            row.datetime = draft.datetime;
            row.is_done = draft.is_done;
            row.customer_id = draft.customer_id;
        })
        .await
    }

    async fn delete_reminder(&self, id: i64, account_id: i64) -> Result<()> {
        self.update_row(id, account_id, "delete reminder", |row| {
            row.is_deleted = true;
        })
        .await
    }

    async fn mark_reminder_done(&self, id: i64, account_id: i64) -> Result<()> {
        self.update_row(id, account_id, "mark reminder as done", |row| {
            row.is_done = true;
        })
        .await
    }

    async fn find_single_customer_by_id(
        &self,
        id: i64,
        account_id: i64,
    ) -> Result<Option<Customer>> {
        Ok(self
            .customers
            .lock()
            .await
            .get(&id)
            .filter(|row| !row.is_deleted && row.account_id == account_id)
            .map(|row| Customer {
                id: row.id,
                name: row.name.clone(),
                phone: row.phone.clone(),
            }))
    }
}
