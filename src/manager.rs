//! Reminder orchestration
//!
//! One manager method per logical operation: validate the input, dispatch to
//! storage, enrich the result with customer metadata, and translate failures
//! into classified domain errors.

use crate::customers::CustomerManager;
use crate::customers::CustomerMeta;
use crate::error::Error;
use crate::reminders::Reminder;
use crate::reminders::ReminderForm;
use crate::storage::Storage;
use crate::validation::validate_date;
use crate::validation::validate_id;
use crate::validation::validate_ids;
use crate::validation::validate_month;
use crate::validation::validate_year;

/// A read request, as assembled by the controller
///
/// The discriminant-specific fields stay optional here; which of them are
/// required depends on `type` and is the manager's call
#[derive(Debug, Default)]
pub struct ReadRequest {
    pub r#type: Option<String>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub month: Option<i64>,
    pub year: Option<i64>,
    pub customer_id: Option<i64>,
    pub account_id: i64,
}

/// A reminder enriched with related customer metadata
#[derive(Debug)]
pub struct EnrichedReminder {
    pub reminder: Reminder,
    pub customer: Option<CustomerMeta>,
}

/// Orchestrates one logical reminder operation per method
pub struct ReminderManager<S> {
    storage: S,
}

impl<S: Storage> ReminderManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get reminders by query type
    ///
    /// Dispatches on `type` in `{all, day, month, range}`; an unrecognized
    /// type skips every branch and yields an empty set without an error,
    /// which is the documented behavior of this endpoint
    ///
    /// # Errors
    ///
    /// Will return `Err` when the ids or the discriminant-specific fields are
    /// invalid, or when the query or its enrichment fails
    pub async fn get(&self, request: &ReadRequest) -> Result<Vec<EnrichedReminder>, Error> {
        validate_id("account_id", request.account_id)?;

        if let Some(customer_id) = request.customer_id {
            validate_id("customer_id", customer_id)?;
        }

        let reminders = match request.r#type.as_deref() {
            Some("all") => self
                .storage
                .find_all_reminders(request.account_id, request.customer_id)
                .await
                .map_err(fetch_error)?,

            Some("day") => {
                let date = validate_date("date", request.date.as_deref())?;

                self.storage
                    .find_reminders_by_date(date, request.account_id, request.customer_id)
                    .await
                    .map_err(fetch_error)?
            }

            Some("month") => {
                let month = validate_month("month", request.month)?;
                let year = validate_year("year", request.year)?;

                self.storage
                    .find_reminders_by_month(month, year, request.account_id, request.customer_id)
                    .await
                    .map_err(fetch_error)?
            }

            Some("range") => {
                let from = validate_date("from", request.from.as_deref())?;
                let to = validate_date("to", request.to.as_deref())?;

                self.storage
                    .find_reminders_by_range(from, to, request.account_id, request.customer_id)
                    .await
                    .map_err(fetch_error)?
            }

            _ => Vec::new(),
        };

        tracing::debug!("Fetched {} reminders", reminders.len());

        self.populate_customers(reminders, request.account_id).await
    }

    /// Create a reminder
    ///
    /// Persists the validated payload, re-reads the created row for the
    /// canonical projection and enriches it
    ///
    /// # Errors
    ///
    /// Will return `Err` when the payload is invalid, or when the insert, the
    /// re-read or the enrichment fails
    pub async fn create(
        &self,
        form: &ReminderForm,
        account_id: i64,
    ) -> Result<EnrichedReminder, Error> {
        let draft = form.validate(account_id)?;

        let id = self
            .storage
            .create_reminder(&draft)
            .await
            .map_err(|err| Error::persistence("An error occurred while saving the reminder", err))?;

        tracing::debug!("Created reminder {id}");

        let reminder = self.find_by_id(id, account_id).await?;

        self.populate_customer(reminder, account_id).await
    }

    /// Update a reminder
    ///
    /// The ids are checked before the payload so a malformed path fails fast;
    /// the write is scoped by `(id, account_id)`
    ///
    /// # Errors
    ///
    /// Will return `Err` when the ids or the payload are invalid, or when the
    /// update, the re-read or the enrichment fails
    pub async fn update(
        &self,
        id: i64,
        form: &ReminderForm,
        account_id: i64,
    ) -> Result<EnrichedReminder, Error> {
        validate_ids(&[("id", id), ("account_id", account_id)])?;

        let draft = form.validate(account_id)?;

        self.storage
            .update_reminder(id, account_id, &draft)
            .await
            .map_err(|err| {
                Error::persistence("An error occurred while updating the reminder", err)
            })?;

        tracing::debug!("Updated reminder {id}");

        let reminder = self.find_by_id(id, account_id).await?;

        self.populate_customer(reminder, account_id).await
    }

    /// Remove a reminder
    ///
    /// Soft-delete: flips the deleted flag, the row stays around
    ///
    /// # Errors
    ///
    /// Will return `Err` when the ids are invalid, the reminder does not
    /// exist for this account, or the write fails
    pub async fn remove(&self, id: i64, account_id: i64) -> Result<(), Error> {
        validate_ids(&[("id", id), ("account_id", account_id)])?;

        self.exists(id, account_id).await?;

        self.storage
            .delete_reminder(id, account_id)
            .await
            .map_err(|err| {
                Error::persistence("An error occurred while removing the reminder", err)
            })?;

        tracing::debug!("Removed reminder {id}");

        Ok(())
    }

    /// Mark a reminder as done
    ///
    /// # Errors
    ///
    /// Will return `Err` when the ids are invalid, the reminder does not
    /// exist for this account, or the write fails
    pub async fn mark_as_done(&self, id: i64, account_id: i64) -> Result<(), Error> {
        validate_ids(&[("id", id), ("account_id", account_id)])?;

        self.exists(id, account_id).await?;

        self.storage
            .mark_reminder_done(id, account_id)
            .await
            .map_err(|err| {
                Error::persistence("An error occurred while marking the reminder as done", err)
            })?;

        tracing::debug!("Marked reminder {id} as done");

        Ok(())
    }

    /// Get a single reminder, failing when it is missing or deleted
    async fn find_by_id(&self, id: i64, account_id: i64) -> Result<Reminder, Error> {
        self.storage
            .find_single_reminder_by_id(id, account_id)
            .await
            .map_err(fetch_error)?
            .ok_or_else(|| Error::not_found("Reminder not found"))
    }

    /// Existence gate used before remove/mark-as-done
    async fn exists(&self, id: i64, account_id: i64) -> Result<(), Error> {
        self.find_by_id(id, account_id).await.map(|_| ())
    }

    /// Attach customer metadata to every reminder that references a customer
    ///
    /// One lookup per reminder, sequential on purpose; the lookups are
    /// tenant-scoped by the already validated account id
    async fn populate_customers(
        &self,
        reminders: Vec<Reminder>,
        account_id: i64,
    ) -> Result<Vec<EnrichedReminder>, Error> {
        let customer_manager = CustomerManager::new(self.storage.clone());

        let mut enriched = Vec::with_capacity(reminders.len());

        for reminder in reminders {
            let customer = match reminder.customer_id {
                Some(customer_id) if customer_id > 0 => Some(
                    customer_manager
                        .get_meta(customer_id, account_id)
                        .await
                        .map_err(|err| {
                            Error::upstream_lookup(
                                "An error occurred while populating customers in the reminders",
                                err,
                            )
                        })?,
                ),
                _ => None,
            };

            enriched.push(EnrichedReminder { reminder, customer });
        }

        Ok(enriched)
    }

    /// Attach customer metadata to a single reminder
    async fn populate_customer(
        &self,
        reminder: Reminder,
        account_id: i64,
    ) -> Result<EnrichedReminder, Error> {
        let mut enriched = self.populate_customers(vec![reminder], account_id).await?;

        Ok(enriched.remove(0))
    }
}

/// Wrap a storage failure of a read operation
fn fetch_error(err: crate::storage::Error) -> Error {
    Error::persistence("An error occurred while fetching the reminders", err)
}
