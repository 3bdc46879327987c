//! All API endpoint setup

use axum::Router;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::routing::put;

pub use current_account::CurrentAccount;
pub use current_account::JwtKeys;
pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use response::Error;
pub use response::Success;

use crate::storage::Storage;

mod current_account;
mod reminders;
mod request;
mod response;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    Router::new()
        .route("/reminder", get(reminders::list::<S>))
        .route("/reminder", post(reminders::create::<S>))
        .route("/reminder/{id}", put(reminders::update::<S>))
        .route("/reminder/{id}", delete(reminders::remove::<S>))
        .route("/reminder/done/{id}", patch(reminders::mark_as_done::<S>))
}
