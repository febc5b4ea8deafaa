//! Application error types

use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    /// The post-login marker never appeared within the deadline.
    #[error("login failed for '{0}': post-login marker never appeared")]
    Credentials(String),

    /// An instrument search or lookup yielded nothing.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// A window operation was invoked outside the `Open` state.
    #[error("window operation invalid in state {0}")]
    Window(&'static str),

    /// The broker surfaced a validation/error widget at submission.
    #[error("order rejected by broker widget: {0}")]
    Widget(String),

    /// Quantity above the broker-enforced maximum.
    #[error("quantity above broker maximum of {0}")]
    MaxQuantity(f64),

    /// Quantity below the broker-enforced minimum.
    #[error("quantity below broker minimum of {0}")]
    MinQuantity(f64),

    /// A table row could not be decoded into a domain object.
    #[error("failed to parse {entity} row: {detail}")]
    Parsing {
        entity: &'static str,
        detail: String,
    },

    /// Element-access retries exhausted.
    #[error("automation failure: {0}")]
    Automation(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// A key fell outside a closed lookup table.
    #[error("lookup error: {0}")]
    Lookup(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a row-level decode failure, naming the entity being parsed.
    pub fn parsing(entity: &'static str, cause: impl std::fmt::Display) -> Self {
        Error::Parsing {
            entity,
            detail: cause.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
