//! Public surface for the `biolink-session` crate.
//!
//! A [`SessionManager`] connects a user through a browser wallet or a remote
//! signer bridge, persists the session in a [`SessionStore`], restores it on
//! restart, and serves hub reads with an address-scoped asset-profile cache.
//!
//! Wallets are plugged in through the traits in [`provider`]; the hub is
//! reached over HTTP with [`HubClient`].

pub mod config;
pub mod error;
pub mod files;
pub mod hub;
pub mod manager;
pub mod provider;
pub mod session;
pub mod signer;
pub mod store;

pub use config::{ConfigError, SessionConfig};
pub use error::{HubError, LinkError, ProviderError, SignError};
pub use files::HubFiles;
pub use hub::HubClient;
pub use manager::SessionManager;
pub use provider::{
    BridgeConnector, DisconnectEvent, DisconnectListener, InjectedProvider, LiveProvider,
    RemoteBridge, TracingPrompt, UserPrompt, Wallets,
};
pub use session::Session;
pub use signer::Signer;
pub use store::{memory::MemoryStore, sqlite::SqliteStore, SessionStore, StoreError};
