use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;

use crate::customers::CustomerMeta;
use crate::manager::EnrichedReminder;
use crate::manager::ReadRequest;
use crate::manager::ReminderManager;
use crate::reminders::ReminderForm;
use crate::storage::Storage;

use super::CurrentAccount;
use super::Error;
use super::Form;
use super::PathParameters;
use super::QueryParameters;
use super::Success;

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub id: i64,
    pub description: String,
    pub customer_id: Option<i64>,
    pub datetime: NaiveDateTime,
    pub is_done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerMeta>,
}

impl ReminderResponse {
    fn from_reminder(enriched: EnrichedReminder) -> Self {
        Self {
            id: enriched.reminder.id,
            description: enriched.reminder.description,
            customer_id: enriched.reminder.customer_id,
            datetime: enriched.reminder.datetime,
            is_done: enriched.reminder.is_done,
            customer: enriched.customer,
        }
    }

    fn from_reminder_multiple(reminders: Vec<EnrichedReminder>) -> Vec<Self> {
        reminders
            .into_iter()
            .map(Self::from_reminder)
            .collect::<Vec<Self>>()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParameters {
    pub r#type: Option<String>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub month: Option<i64>,
    pub year: Option<i64>,
    pub customer_id: Option<i64>,
}

pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_account: CurrentAccount,
    QueryParameters(parameters): QueryParameters<ListParameters>,
) -> Result<Success<Vec<ReminderResponse>>, Error> {
    let request = ReadRequest {
        r#type: parameters.r#type,
        date: parameters.date,
        from: parameters.from,
        to: parameters.to,
        month: parameters.month,
        year: parameters.year,
        customer_id: parameters.customer_id,
        account_id: current_account.account_id,
    };

    let reminders = ReminderManager::new(storage).get(&request).await?;

    Ok(Success::ok(ReminderResponse::from_reminder_multiple(
        reminders,
    )))
}

pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_account: CurrentAccount,
    Form(form): Form<ReminderForm>,
) -> Result<Success<ReminderResponse>, Error> {
    let reminder = ReminderManager::new(storage)
        .create(&form, current_account.account_id)
        .await?;

    Ok(Success::created(ReminderResponse::from_reminder(reminder)))
}

pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    current_account: CurrentAccount,
    PathParameters(id): PathParameters<i64>,
    Form(form): Form<ReminderForm>,
) -> Result<Success<ReminderResponse>, Error> {
    let reminder = ReminderManager::new(storage)
        .update(id, &form, current_account.account_id)
        .await?;

    Ok(Success::ok(ReminderResponse::from_reminder(reminder)))
}

pub async fn remove<S: Storage>(
    Extension(storage): Extension<S>,
    current_account: CurrentAccount,
    PathParameters(id): PathParameters<i64>,
) -> Result<Success<&'static str>, Error> {
    ReminderManager::new(storage)
        .remove(id, current_account.account_id)
        .await?;

    Ok(Success::<&'static str>::no_content())
}

pub async fn mark_as_done<S: Storage>(
    Extension(storage): Extension<S>,
    current_account: CurrentAccount,
    PathParameters(id): PathParameters<i64>,
) -> Result<Success<&'static str>, Error> {
    ReminderManager::new(storage)
        .mark_as_done(id, current_account.account_id)
        .await?;

    Ok(Success::<&'static str>::no_content())
}
