//! Customer lookups
//!
//! Customers are owned elsewhere; this service only reads them to enrich
//! reminders with a lightweight metadata projection.

use serde::Serialize;

use crate::error::Error;
use crate::storage::Storage;
use crate::validation::validate_ids;

/// A customer, as stored
#[derive(Clone, Debug)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
}

/// The metadata projection attached to enriched reminders
#[derive(Clone, Debug, Serialize)]
pub struct CustomerMeta {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CustomerMeta {
    /// Create the metadata projection from a customer
    fn from_customer(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            phone: customer.phone,
        }
    }
}

/// Read-only manager for customer lookups
pub struct CustomerManager<S> {
    storage: S,
}

impl<S: Storage> CustomerManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get the metadata of a single customer, scoped to an account
    ///
    /// # Errors
    ///
    /// Will return `Err` when an id is out of range, the customer does not
    /// exist for this account, or the lookup itself fails
    pub async fn get_meta(&self, customer_id: i64, account_id: i64) -> Result<CustomerMeta, Error> {
        validate_ids(&[("customer_id", customer_id), ("account_id", account_id)])?;

        let customer = self
            .storage
            .find_single_customer_by_id(customer_id, account_id)
            .await
            .map_err(|err| Error::persistence("An error occurred while fetching the customer", err))?
            .ok_or_else(|| Error::not_found("Customer not found"))?;

        Ok(CustomerMeta::from_customer(customer))
    }
}
