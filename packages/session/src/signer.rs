//! The signing capability bound to an authenticated session.
//!
//! A [`Signer`] is either *ready* (the connect flow already holds a live
//! provider) or *deferred* (restored from the persisted record). A deferred
//! signer performs the provider handshake the first time a signature is
//! needed and keeps the resulting [`LiveProvider`] for the rest of the
//! session, so merely viewing synced data never prompts the user.
//!
//! A failed handshake is not cached; the next `sign` tries again.

use std::sync::Arc;

use biolink::{Address, ConnectMethod};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, SignError};
use crate::provider::{ListenerFactory, LiveProvider, UserPrompt, Wallets};

pub struct Signer {
    method: ConnectMethod,
    address: String,
    live: OnceCell<LiveProvider>,
    wallets: Wallets,
    prompt: Arc<dyn UserPrompt>,
    listener: Option<ListenerFactory>,
}

impl Signer {
    /// A signer over an already established connection.
    pub fn ready(live: LiveProvider, address: impl Into<String>, prompt: Arc<dyn UserPrompt>) -> Self {
        Self {
            method: live.method(),
            address: address.into(),
            live: OnceCell::new_with(Some(live)),
            wallets: Wallets::none(),
            prompt,
            listener: None,
        }
    }

    /// A signer that connects through `wallets` on first use.
    ///
    /// `listener` is registered on the bridge if the handshake pairs one.
    pub fn deferred(
        method: ConnectMethod,
        address: impl Into<String>,
        wallets: Wallets,
        prompt: Arc<dyn UserPrompt>,
        listener: Option<ListenerFactory>,
    ) -> Self {
        Self {
            method,
            address: address.into(),
            live: OnceCell::new(),
            wallets,
            prompt,
            listener,
        }
    }

    pub fn method(&self) -> ConnectMethod {
        self.method
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// The live connection, if one has been established.
    pub fn live(&self) -> Option<&LiveProvider> {
        self.live.get()
    }

    /// Sign `message` with the session's account.
    pub async fn sign(&self, message: &str) -> Result<String, SignError> {
        let live = self
            .live
            .get_or_try_init(|| self.handshake())
            .await
            .map_err(SignError::Handshake)?;

        live.sign(message, &self.address, self.prompt.as_ref())
            .await
            .map_err(SignError::Provider)
    }

    async fn handshake(&self) -> Result<LiveProvider, ProviderError> {
        info!(method = %self.method, "signer: re-establishing provider connection");
        let listener = self.listener.as_ref().map(|factory| factory());
        let (live, accounts) = self.wallets.establish(self.method, listener).await?;

        let exposes_address = accounts.iter().any(|a| {
            Address::parse(a).is_ok_and(|parsed| parsed.as_str() == self.address)
        });
        if !exposes_address {
            warn!(
                address = %self.address,
                "signer: provider did not expose the session address; signing anyway"
            );
        } else {
            debug!("signer: provider connection restored");
        }
        Ok(live)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("method", &self.method)
            .field("address", &self.address)
            .field("live", &self.live.initialized())
            .finish()
    }
}
