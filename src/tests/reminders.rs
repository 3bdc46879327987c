use axum::http::StatusCode;
use serde_json::json;

use crate::tests::helper;

#[tokio::test]
async fn test_reminder_lifecycle() {
    let (mut app, storage) = helper::setup_test_app();

    let access_token = helper::token_for_account(1);

    let customer_id = storage
        .add_customer(1, "Jane Jansen", Some("0612345678"))
        .await;

    // create a reminder linked to a customer, numeric done flag
    let payload = helper::reminder_payload_with_customer(
        "Call back about the quote",
        "2024-03-01 10:00:00",
        json!(0),
        customer_id,
    );
    let (status_code, reminder, _) =
        helper::maybe_create_reminder(&mut app, &access_token, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);

    let reminder = reminder.unwrap();
    assert_eq!("Call back about the quote", reminder.description);
    assert_eq!("2024-03-01T10:00:00", reminder.datetime);
    assert!(!reminder.is_done);
    assert_eq!(Some(customer_id), reminder.customer_id);

    // the response embeds the customer metadata
    let customer = reminder.customer.unwrap();
    assert_eq!("Jane Jansen", customer.name);
    assert_eq!(Some("0612345678".to_string()), customer.phone);

    let reminder_id = reminder.id;

    // create a bare reminder, no customer
    let payload = helper::reminder_payload("Water the plants", "2024-03-02 09:00:00", json!(true));
    let (status_code, bare, _) =
        helper::maybe_create_reminder(&mut app, &access_token, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);

    let bare = bare.unwrap();
    assert_eq!(None, bare.customer_id);
    assert_eq!(None, bare.customer);
    assert!(bare.is_done);

    // both show up in the full listing, ordered by id
    let (status_code, reminders, _) =
        helper::list_reminders(&mut app, &access_token, "type=all").await;
    assert_eq!(StatusCode::OK, status_code);

    let reminders = reminders.unwrap();
    assert_eq!(2, reminders.len());
    assert_eq!(reminder_id, reminders[0].id);
    assert_eq!(bare.id, reminders[1].id);

    // update replaces the whole payload
    let payload =
        helper::reminder_payload("Call back about the invoice", "2024-03-05 14:30:00", json!(1));
    let (status_code, updated, _) =
        helper::maybe_update_reminder(&mut app, &access_token, reminder_id, &payload).await;
    assert_eq!(StatusCode::OK, status_code);

    let updated = updated.unwrap();
    assert_eq!(reminder_id, updated.id);
    assert_eq!("Call back about the invoice", updated.description);
    assert_eq!("2024-03-05T14:30:00", updated.datetime);
    assert!(updated.is_done);
    // updating without a customer id unlinks the customer
    assert_eq!(None, updated.customer_id);

    // mark the bare reminder as done
    let (status_code, _) =
        helper::maybe_mark_reminder_done(&mut app, &access_token, bare.id).await;
    assert_eq!(StatusCode::NO_CONTENT, status_code);

    let (_, reminders, _) = helper::list_reminders(&mut app, &access_token, "type=all").await;
    assert!(reminders.unwrap().iter().all(|reminder| reminder.is_done));

    // delete one of them
    let (status_code, _) =
        helper::maybe_delete_reminder(&mut app, &access_token, reminder_id).await;
    assert_eq!(StatusCode::NO_CONTENT, status_code);

    let (_, reminders, _) = helper::list_reminders(&mut app, &access_token, "type=all").await;
    let reminders = reminders.unwrap();
    assert_eq!(1, reminders.len());
    assert_eq!(bare.id, reminders[0].id);

    // a second delete no longer finds the reminder
    let (status_code, error) =
        helper::maybe_delete_reminder(&mut app, &access_token, reminder_id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Reminder not found", error.unwrap().message);
}

#[tokio::test]
async fn test_mark_done_of_unknown_reminder() {
    let (mut app, _storage) = helper::setup_test_app();

    let access_token = helper::token_for_account(1);

    let (status_code, error) =
        helper::maybe_mark_reminder_done(&mut app, &access_token, 42).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Reminder not found", error.unwrap().message);
}

#[tokio::test]
async fn test_update_of_unknown_reminder() {
    let (mut app, _storage) = helper::setup_test_app();

    let access_token = helper::token_for_account(1);

    // the write is attempted without an existence check; affecting zero rows
    // surfaces as a server side failure
    let payload = helper::reminder_payload("Anything", "2024-03-01 10:00:00", json!(false));
    let (status_code, _, error) =
        helper::maybe_update_reminder(&mut app, &access_token, 42, &payload).await;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status_code);
    assert_eq!(
        "An error occurred while updating the reminder",
        error.unwrap().message
    );
}

#[tokio::test]
async fn test_create_with_unknown_customer() {
    let (mut app, _storage) = helper::setup_test_app();

    let access_token = helper::token_for_account(1);

    // the customer id is in range, so the reminder is stored; the enrichment
    // lookup afterwards fails
    let payload = helper::reminder_payload_with_customer(
        "Call back",
        "2024-03-01 10:00:00",
        json!(false),
        99,
    );
    let (status_code, _, error) =
        helper::maybe_create_reminder(&mut app, &access_token, &payload).await;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status_code);
    assert_eq!(
        "An error occurred while populating customers in the reminders",
        error.unwrap().message
    );
}

#[tokio::test]
async fn test_customer_without_phone_omits_the_field() {
    let (mut app, storage) = helper::setup_test_app();

    let access_token = helper::token_for_account(1);

    let customer_id = storage.add_customer(1, "Piet de Vries", None).await;

    let payload = helper::reminder_payload_with_customer(
        "Send the contract",
        "2024-04-01 10:00:00",
        json!(false),
        customer_id,
    );
    let (status_code, reminder, _) =
        helper::maybe_create_reminder(&mut app, &access_token, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);

    let customer = reminder.unwrap().customer.unwrap();
    assert_eq!("Piet de Vries", customer.name);
    assert_eq!(None, customer.phone);
}
