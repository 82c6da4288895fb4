//! Wallet provider seams.
//!
//! The session layer never talks to a wallet directly. Hosts plug in:
//!
//! - an [`InjectedProvider`] for a wallet living in the same browser context;
//! - a [`BridgeConnector`] that opens fresh [`RemoteBridge`] pairings for a
//!   QR-paired out-of-band signer;
//! - a [`UserPrompt`] used to warn the user before a remote signature.
//!
//! Once a connection exists it is held as a [`LiveProvider`], the tagged
//! variant every signature and disconnect is dispatched through.

use std::sync::Arc;

use async_trait::async_trait;
use biolink::{Address, ConnectMethod};
use tracing::{info, warn};

use crate::error::ProviderError;

/// Shown before every remote signature request.
pub const REMOTE_SIGN_ALERT: &str = "Ready to sign... You may need to prepare your wallet.";

/// Why a remote bridge dropped the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectEvent {
    pub code: u16,
    pub reason: String,
}

/// Callback a [`RemoteBridge`] invokes when the remote side disconnects.
pub type DisconnectListener = Box<dyn Fn(DisconnectEvent) + Send + Sync>;

/// Produces a fresh [`DisconnectListener`] each time a bridge is paired.
pub type ListenerFactory = Arc<dyn Fn() -> DisconnectListener + Send + Sync>;

// ---------------------------------------------------------------------------
// Provider traits
// ---------------------------------------------------------------------------

/// A wallet injected into the host (e.g. a browser extension).
#[async_trait]
pub trait InjectedProvider: Send + Sync {
    /// Ask the user to expose their accounts. May prompt.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// `personal_sign` of `message` by `address`. Returns the hex signature.
    async fn personal_sign(&self, message: &str, address: &str) -> Result<String, ProviderError>;
}

/// One pairing with an out-of-band signer.
#[async_trait]
pub trait RemoteBridge: Send + Sync {
    /// Run the pairing handshake (QR code) and return the exposed accounts.
    /// A closed prompt is [`ProviderError::Cancelled`].
    async fn enable(&self) -> Result<Vec<String>, ProviderError>;

    async fn personal_sign(&self, message: &str, address: &str) -> Result<String, ProviderError>;

    /// Ask the remote side to end the pairing.
    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Register a callback for remote-initiated disconnection.
    fn on_disconnect(&self, listener: DisconnectListener);
}

/// Opens new [`RemoteBridge`] pairings.
pub trait BridgeConnector: Send + Sync {
    fn open(&self) -> Arc<dyn RemoteBridge>;
}

/// Blocking notice to the user.
pub trait UserPrompt: Send + Sync {
    fn alert(&self, message: &str);
}

/// A [`UserPrompt`] that only logs. Suitable for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPrompt;

impl UserPrompt for TracingPrompt {
    fn alert(&self, message: &str) {
        info!("prompt: {message}");
    }
}

// ---------------------------------------------------------------------------
// Wallets
// ---------------------------------------------------------------------------

/// The providers available to a host. Either may be absent.
#[derive(Clone, Default)]
pub struct Wallets {
    pub injected: Option<Arc<dyn InjectedProvider>>,
    pub bridge: Option<Arc<dyn BridgeConnector>>,
}

impl Wallets {
    /// No providers at all: every connect yields `None`.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_injected(mut self, provider: Arc<dyn InjectedProvider>) -> Self {
        self.injected = Some(provider);
        self
    }

    pub fn with_bridge(mut self, connector: Arc<dyn BridgeConnector>) -> Self {
        self.bridge = Some(connector);
        self
    }

    pub fn injected(&self) -> Result<Arc<dyn InjectedProvider>, ProviderError> {
        self.injected.clone().ok_or(ProviderError::Unavailable)
    }

    /// Establish a live connection for `method` and return it together with
    /// the accounts it exposed.
    ///
    /// This is the single dispatch point over provider kinds. For a remote
    /// bridge, `listener` is registered before pairing starts.
    pub async fn establish(
        &self,
        method: ConnectMethod,
        listener: Option<DisconnectListener>,
    ) -> Result<(LiveProvider, Vec<String>), ProviderError> {
        match method {
            ConnectMethod::BrowserWallet => {
                let provider = self.injected()?;
                let accounts = provider.request_accounts().await?;
                Ok((LiveProvider::BrowserWallet(provider), accounts))
            }
            ConnectMethod::RemoteBridge => {
                let connector = self.bridge.clone().ok_or(ProviderError::Unavailable)?;
                let bridge = connector.open();
                if let Some(listener) = listener {
                    bridge.on_disconnect(listener);
                }
                let accounts = bridge.enable().await?;
                Ok((LiveProvider::RemoteBridge(bridge), accounts))
            }
        }
    }
}

/// The first account in `accounts`, checksummed.
pub fn first_account(accounts: &[String]) -> Result<String, ProviderError> {
    let raw = accounts.first().ok_or(ProviderError::NoAccounts)?;
    Ok(Address::parse(raw)?.into_string())
}

// ---------------------------------------------------------------------------
// LiveProvider
// ---------------------------------------------------------------------------

/// An established provider connection.
#[derive(Clone)]
pub enum LiveProvider {
    BrowserWallet(Arc<dyn InjectedProvider>),
    RemoteBridge(Arc<dyn RemoteBridge>),
}

impl LiveProvider {
    pub fn method(&self) -> ConnectMethod {
        match self {
            LiveProvider::BrowserWallet(_) => ConnectMethod::BrowserWallet,
            LiveProvider::RemoteBridge(_) => ConnectMethod::RemoteBridge,
        }
    }

    /// Sign `message` as `address`. Remote signatures alert the user first.
    pub async fn sign(
        &self,
        message: &str,
        address: &str,
        prompt: &dyn UserPrompt,
    ) -> Result<String, ProviderError> {
        match self {
            LiveProvider::BrowserWallet(provider) => provider.personal_sign(message, address).await,
            LiveProvider::RemoteBridge(bridge) => {
                prompt.alert(REMOTE_SIGN_ALERT);
                bridge.personal_sign(message, address).await
            }
        }
    }

    /// Whether `self` and `other` are the same underlying connection.
    pub fn same_connection(&self, other: &LiveProvider) -> bool {
        match (self, other) {
            (LiveProvider::BrowserWallet(a), LiveProvider::BrowserWallet(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (LiveProvider::RemoteBridge(a), LiveProvider::RemoteBridge(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }

    /// End the connection. Injected wallets have nothing to close.
    pub async fn disconnect(&self) {
        if let LiveProvider::RemoteBridge(bridge) = self {
            if let Err(e) = bridge.disconnect().await {
                warn!("provider: bridge disconnect failed: {e}");
            }
        }
    }
}

impl std::fmt::Debug for LiveProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LiveProvider({})", self.method())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_account_checksums() {
        let accounts = vec!["0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string()];
        assert_eq!(
            first_account(&accounts).unwrap(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn first_account_empty() {
        assert_eq!(first_account(&[]), Err(ProviderError::NoAccounts));
    }

    #[test]
    fn first_account_invalid() {
        let accounts = vec!["not-an-address".to_string()];
        assert!(matches!(
            first_account(&accounts),
            Err(ProviderError::InvalidAccount(_))
        ));
    }

    #[tokio::test]
    async fn establish_without_providers_is_unavailable() {
        let wallets = Wallets::none();
        for method in [ConnectMethod::BrowserWallet, ConnectMethod::RemoteBridge] {
            let result = wallets.establish(method, None).await;
            assert!(matches!(result, Err(ProviderError::Unavailable)));
        }
    }
}
