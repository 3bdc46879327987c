use axum::http::Method;
use axum::http::StatusCode;
use serde_json::json;

use crate::tests::helper;

#[tokio::test]
async fn test_reminders_are_scoped_to_their_account() {
    let (mut app, _storage) = helper::setup_test_app();

    let first_account = helper::token_for_account(1);
    let second_account = helper::token_for_account(2);

    let payload = helper::reminder_payload("Only for account 1", "2024-03-01 10:00:00", json!(false));
    let (status_code, reminder, _) =
        helper::maybe_create_reminder(&mut app, &first_account, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let reminder_id = reminder.unwrap().id;

    // the other account sees nothing
    let (status_code, reminders, _) =
        helper::list_reminders(&mut app, &second_account, "type=all").await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(reminders.unwrap().is_empty());

    // and cannot remove or complete the reminder
    let (status_code, _) =
        helper::maybe_delete_reminder(&mut app, &second_account, reminder_id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    let (status_code, _) =
        helper::maybe_mark_reminder_done(&mut app, &second_account, reminder_id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    // an update attempt is a blind write; affecting zero rows is a server
    // side failure, not a not-found
    let payload = helper::reminder_payload("Hijacked", "2024-03-01 10:00:00", json!(false));
    let (status_code, _, _) =
        helper::maybe_update_reminder(&mut app, &second_account, reminder_id, &payload).await;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status_code);

    // the reminder is untouched for its owner
    let (_, reminders, _) = helper::list_reminders(&mut app, &first_account, "type=all").await;
    let reminders = reminders.unwrap();
    assert_eq!(1, reminders.len());
    assert_eq!("Only for account 1", reminders[0].description);
    assert!(!reminders[0].is_done);
}

#[tokio::test]
async fn test_customers_are_scoped_to_their_account() {
    let (mut app, storage) = helper::setup_test_app();

    let customer_id = storage.add_customer(1, "Jane Jansen", None).await;

    // another account referencing the customer stores the reminder, but the
    // enrichment lookup cannot see the customer
    let second_account = helper::token_for_account(2);
    let payload = helper::reminder_payload_with_customer(
        "Cross-tenant",
        "2024-03-01 10:00:00",
        json!(false),
        customer_id,
    );
    let (status_code, _, _) =
        helper::maybe_create_reminder(&mut app, &second_account, &payload).await;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status_code);
}

#[tokio::test]
async fn test_requests_without_a_token_are_rejected() {
    let (mut app, _storage) = helper::setup_test_app();

    for (method, uri) in [
        (Method::GET, "/api/reminder?type=all"),
        (Method::POST, "/api/reminder"),
        (Method::PUT, "/api/reminder/1"),
        (Method::DELETE, "/api/reminder/1"),
        (Method::PATCH, "/api/reminder/done/1"),
    ] {
        let status_code = helper::request_without_token(&mut app, method, uri).await;
        assert_eq!(StatusCode::FORBIDDEN, status_code);
    }
}

#[tokio::test]
async fn test_requests_with_a_bogus_token_are_rejected() {
    let (mut app, _storage) = helper::setup_test_app();

    let (status_code, _, error) =
        helper::list_reminders(&mut app, "Bearer not-a-jwt", "type=all").await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert!(error.unwrap().message.starts_with("Invalid token"));
}
