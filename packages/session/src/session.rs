//! A connected (or visiting) user.

use std::sync::Arc;

use biolink::ConnectMethod;

use crate::files::HubFiles;
use crate::hub::HubClient;
use crate::signer::Signer;

/// Handle to one session. Cheap to clone; clones share the signer and the
/// file cache.
///
/// An authenticated session always has an address and a signer. A visitor
/// session has neither and its [`HubFiles`] are read-only.
#[derive(Debug, Clone)]
pub struct Session {
    signer: Option<Arc<Signer>>,
    files: Arc<HubFiles>,
    generation: u64,
}

impl Session {
    pub(crate) fn authenticated(hub: HubClient, signer: Arc<Signer>, generation: u64) -> Self {
        Self {
            files: Arc::new(HubFiles::new(hub, Arc::clone(&signer))),
            signer: Some(signer),
            generation,
        }
    }

    pub(crate) fn visitor(hub: HubClient) -> Self {
        Self {
            signer: None,
            files: Arc::new(HubFiles::read_only(hub)),
            generation: 0,
        }
    }

    /// Checksummed address of the connected account.
    pub fn address(&self) -> Option<&str> {
        self.signer.as_deref().map(Signer::address)
    }

    pub fn method(&self) -> Option<ConnectMethod> {
        self.signer.as_deref().map(Signer::method)
    }

    pub fn is_visitor(&self) -> bool {
        self.signer.is_none()
    }

    pub fn signer(&self) -> Option<&Arc<Signer>> {
        self.signer.as_ref()
    }

    pub fn files(&self) -> &HubFiles {
        &self.files
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}
