//! Access keys from the account service.

use async_trait::async_trait;
use tracing::{debug, warn};
use tritonshim_auth::{AccessKey, AccessKeyStore, CredentialStoreError};
use tritonshim_core::TenantContext;

use crate::model::AccessKeyRecord;

const ACTIVE_STATUS: &str = "Active";

/// [`AccessKeyStore`] that reads `GET {base}/{account}/accesskeys`.
///
/// Only keys whose status is `Active` (or unset) are returned. Nothing is
/// cached between requests.
#[derive(Debug, Clone)]
pub struct HttpAccessKeyStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAccessKeyStore {
    /// Create a store sharing `http`'s connection pool.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AccessKeyStore for HttpAccessKeyStore {
    async fn list_access_keys(
        &self,
        ctx: &TenantContext,
    ) -> Result<Vec<AccessKey>, CredentialStoreError> {
        let url = format!(
            "{}/{}/accesskeys",
            self.base_url.trim_end_matches('/'),
            ctx.account
        );

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("request-id", &ctx.request_id)
            .send()
            .await
            .map_err(|e| CredentialStoreError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, request_id = %ctx.request_id, "account service refused access key listing");
            return Err(CredentialStoreError::UpstreamUnavailable(format!(
                "HTTP response returned status code {status}"
            )));
        }

        let records: Vec<AccessKeyRecord> = response
            .json()
            .await
            .map_err(|e| CredentialStoreError::UpstreamProtocolError(e.to_string()))?;

        let keys: Vec<AccessKey> = records
            .into_iter()
            .filter(|r| r.status.as_deref().is_none_or(|s| s == ACTIVE_STATUS))
            .map(|r| AccessKey::new(r.access_key_id, r.secret))
            .collect();
        debug!(count = keys.len(), request_id = %ctx.request_id, "loaded access keys");
        Ok(keys)
    }
}
