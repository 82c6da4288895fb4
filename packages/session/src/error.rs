//! Error types for wallet, hub, and linking operations.
//!
//! Public [`SessionManager`](crate::SessionManager) operations never return
//! these for declined prompts or failed reads; they log and degrade to
//! `None`/`false`. The types surface from the lower-level pieces
//! ([`HubClient`](crate::HubClient), [`HubFiles`](crate::HubFiles),
//! [`Signer`](crate::Signer)) and from account linking.

use biolink::{AddressError, MessageError};

/// Failures reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No provider of the requested kind is installed or configured.
    #[error("no wallet provider available")]
    Unavailable,

    /// The user rejected an account or signature request.
    #[error("user denied the request")]
    Denied,

    /// The user closed the pairing prompt.
    #[error("user cancelled the pairing")]
    Cancelled,

    #[error("provider returned no accounts")]
    NoAccounts,

    #[error("provider returned an invalid account: {0}")]
    InvalidAccount(String),

    #[error("provider error: {0}")]
    Failed(String),
}

impl ProviderError {
    /// `true` for outcomes caused by the user rather than a fault.
    pub fn is_user_declined(&self) -> bool {
        matches!(self, ProviderError::Denied | ProviderError::Cancelled)
    }
}

impl From<AddressError> for ProviderError {
    fn from(e: AddressError) -> Self {
        ProviderError::InvalidAccount(e.to_string())
    }
}

/// Failures of [`Signer::sign`](crate::Signer::sign).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignError {
    /// A deferred signer could not re-establish its provider connection.
    #[error("wallet handshake did not complete: {0}")]
    Handshake(ProviderError),

    #[error("signature request failed: {0}")]
    Provider(ProviderError),
}

/// Errors from the hub HTTP client and the per-session file cache.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The HTTP request or response failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The hub returned a non-2xx HTTP status code.
    #[error("hub returned status {0}")]
    BadStatus(u16),

    #[error("hub returned malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// A visitor session tried to upload files.
    #[error("session is read-only")]
    ReadOnly,

    #[error("invalid file: {0}")]
    InvalidFile(#[from] MessageError),

    #[error(transparent)]
    Sign(#[from] SignError),
}

/// Why [`SessionManager::link_additional_account`](crate::SessionManager::link_additional_account)
/// produced no link.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// There is no active session to link the account to.
    #[error("Not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Internal failure of a connect attempt; logged, then reported as `None`.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConnectError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("initial sync failed: {0}")]
    Hub(#[from] HubError),
}
