//! Credential Store Adapter.
//!
//! The verifier never talks to the account service directly. It receives the
//! tenant's key set from an [`AccessKeyStore`], which production code backs
//! with the account service and tests back with [`StaticAccessKeyStore`].

use std::fmt;

use async_trait::async_trait;
use tritonshim_core::TenantContext;

use crate::error::CredentialStoreError;

/// An access key pair issued by the account service.
///
/// The secret is only ever read to seed the signing-key chain. `Debug` output
/// redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    /// Public key identifier sent by clients in the credential scope.
    pub access_key_id: String,
    /// Shared secret.
    pub secret_access_key: String,
}

impl AccessKey {
    /// Create a new access key pair.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Source of the valid access keys for a tenant.
///
/// Implementations are read-through: keys are fetched per request and never
/// cached or mutated by the gateway.
#[async_trait]
pub trait AccessKeyStore: Send + Sync + fmt::Debug {
    /// List the access keys currently valid for the tenant in `ctx`.
    ///
    /// # Errors
    ///
    /// [`CredentialStoreError::UpstreamUnavailable`] when the account service
    /// cannot be reached, [`CredentialStoreError::UpstreamProtocolError`] when
    /// its response cannot be decoded.
    async fn list_access_keys(
        &self,
        ctx: &TenantContext,
    ) -> Result<Vec<AccessKey>, CredentialStoreError>;
}

/// A fixed, in-memory key set. Used in tests and local development.
///
/// # Examples
///
/// ```
/// use tritonshim_auth::credentials::{AccessKey, StaticAccessKeyStore};
///
/// let store = StaticAccessKeyStore::new(vec![AccessKey::new("AKIDEXAMPLE", "secret")]);
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticAccessKeyStore {
    keys: Vec<AccessKey>,
}

impl StaticAccessKeyStore {
    /// Create a store serving `keys` to every tenant.
    pub fn new(keys: impl IntoIterator<Item = AccessKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl AccessKeyStore for StaticAccessKeyStore {
    async fn list_access_keys(
        &self,
        _ctx: &TenantContext,
    ) -> Result<Vec<AccessKey>, CredentialStoreError> {
        Ok(self.keys.clone())
    }
}
