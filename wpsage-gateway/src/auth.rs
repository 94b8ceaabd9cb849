//! Shared-secret verification for the protected routes.
//!
//! The guard holds the one valid API key for the process. The key is
//! injected at construction and only changes through [`AuthGuard::reload`]
//! or [`AuthGuard::set_key`].

use std::sync::{Arc, PoisonError, RwLock};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use wpsage_core::API_KEY_OPTION;
use wpsage_store::{ConfigStore, StoreError};

use crate::error::GatewayError;

/// Reload `guard` from `store` on the blocking pool.
///
/// A SQLite-backed store serializes access behind a mutex, so a long
/// `run-sql` would otherwise stall the runtime worker handling the reload.
///
/// # Errors
/// Returns [`GatewayError::Store`] if the option cannot be read and
/// [`GatewayError::ReloadTask`] if the blocking task does not complete.
pub async fn reload_blocking(
    guard: Arc<AuthGuard>,
    store: Arc<dyn ConfigStore>,
) -> Result<(), GatewayError> {
    tokio::task::spawn_blocking(move || guard.reload(store.as_ref()))
        .await
        .map_err(|e| GatewayError::ReloadTask(e.to_string()))?
        .map_err(GatewayError::from)
}

/// Verifies the `api_key` supplied with a request against the stored key.
#[derive(Debug)]
pub struct AuthGuard {
    key: RwLock<String>,
    allow_empty_key: bool,
}

impl AuthGuard {
    /// Create a guard for `key`.
    ///
    /// With `allow_empty_key` set, an empty stored key authorizes requests
    /// that also supply an empty key. Otherwise an empty stored key locks
    /// every protected route.
    #[must_use]
    pub fn new(key: impl Into<String>, allow_empty_key: bool) -> Self {
        let key = key.into();
        warn_if_unset(&key, allow_empty_key);
        Self { key: RwLock::new(key), allow_empty_key }
    }

    /// Create a guard from the key stored under [`API_KEY_OPTION`].
    ///
    /// # Errors
    /// Returns [`StoreError`] if the option cannot be read.
    pub fn from_store(store: &dyn ConfigStore, allow_empty_key: bool) -> Result<Self, StoreError> {
        let key = store.get(API_KEY_OPTION)?.unwrap_or_default();
        Ok(Self::new(key, allow_empty_key))
    }

    /// Re-read the key from `store` and swap it in.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the option cannot be read. The current key
    /// stays in effect.
    pub fn reload(&self, store: &dyn ConfigStore) -> Result<(), StoreError> {
        let key = store.get(API_KEY_OPTION)?.unwrap_or_default();
        self.set_key(key);
        Ok(())
    }

    /// Replace the key in memory.
    pub fn set_key(&self, key: impl Into<String>) {
        let key = key.into();
        warn_if_unset(&key, self.allow_empty_key);
        info!(fingerprint = %fingerprint(&key), "api key updated");
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = key;
    }

    /// `true` if `supplied` is byte-for-byte equal to the stored key.
    ///
    /// This is a plain comparison: an empty stored key matches an empty
    /// supplied key regardless of `allow_empty_key`.
    #[must_use]
    pub fn matches(&self, supplied: &str) -> bool {
        *self.key.read().unwrap_or_else(PoisonError::into_inner) == supplied
    }

    /// Authorize a request carrying `supplied`.
    ///
    /// # Errors
    /// Returns [`GatewayError::Forbidden`] if the key does not match, or if
    /// no key is configured and empty keys are not allowed.
    pub fn verify(&self, supplied: &str) -> Result<(), GatewayError> {
        let key = self.key.read().unwrap_or_else(PoisonError::into_inner);
        if key.is_empty() && !self.allow_empty_key {
            warn!("rejected request: no api key configured");
            return Err(GatewayError::Forbidden);
        }
        if *key == supplied {
            Ok(())
        } else {
            debug!(supplied = %fingerprint(supplied), "rejected request: api key mismatch");
            Err(GatewayError::Forbidden)
        }
    }
}

fn warn_if_unset(key: &str, allow_empty_key: bool) {
    if key.is_empty() {
        if allow_empty_key {
            warn!("no api key configured: protected routes are open to requests without a key");
        } else {
            warn!("no api key configured: protected routes will reject every request");
        }
    }
}

/// First 8 hex digits of the key's SHA-256, safe to log.
#[must_use]
pub fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    digest.iter().take(4).map(|b| format!("{b:02x}")).collect()
}
