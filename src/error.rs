//! Domain error taxonomy
//!
//! Every failure the managers raise carries a client-vs-server classification;
//! the response layer decides the HTTP status from it.

use thiserror::Error as ThisError;

use crate::storage;
use crate::validation::ValidationError;

/// A failed reminder operation
#[derive(Debug, ThisError)]
pub enum Error {
    /// The input was malformed; carries one detail per violated field
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The targeted record does not exist, or is not visible to this account
    #[error("{0}")]
    NotFound(String),

    /// The store returned an unexpected affected-row count or a malformed
    /// result
    #[error("{context}")]
    Persistence {
        context: String,
        #[source]
        source: storage::Error,
    },

    /// Enriching a result with related data failed
    #[error("{context}")]
    UpstreamLookup {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not-found failure
    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::NotFound(message.into())
    }

    /// Wrap a storage failure with the attempted operation's description
    pub fn persistence<C: Into<String>>(context: C, source: storage::Error) -> Self {
        Self::Persistence {
            context: context.into(),
            source,
        }
    }

    /// Wrap an enrichment failure with the attempted operation's description
    pub fn upstream_lookup<C: Into<String>>(context: C, source: Error) -> Self {
        Self::UpstreamLookup {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Is this failure correctable by the caller?
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}
