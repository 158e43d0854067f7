//! Backing-provider client.
//!
//! [`ComputeClient`] is the seam the resource translator depends on.
//! [`TritonHttpClient`] implements it against VMAPI, IMGAPI and PAPI over one
//! shared, bounded connection pool.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use tritonshim_core::{TenantContext, UpstreamConfig};

use crate::error::ProviderError;
use crate::model::{Image, Package, Vm};

/// VMAPI list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmFilter {
    /// Restrict to these VM UUIDs.
    pub uuids: Vec<String>,
    /// Restrict to VMs owned by this account.
    pub owner_uuid: Option<String>,
}

/// IMGAPI list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageFilter {
    /// Restrict to images owned by this account.
    pub owner: Option<String>,
}

/// PAPI list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilter {
    /// Restrict to packages with these names.
    pub names: Vec<String>,
}

/// Read-only access to the backing provider's resources.
///
/// Calls are not retried. Dropping the returned future cancels the
/// in-flight request.
#[async_trait]
pub trait ComputeClient: Send + Sync + fmt::Debug {
    /// List VMs matching `filter`.
    async fn list_instances(
        &self,
        ctx: &TenantContext,
        filter: &VmFilter,
    ) -> Result<Vec<Vm>, ProviderError>;

    /// List images matching `filter`.
    async fn list_images(
        &self,
        ctx: &TenantContext,
        filter: &ImageFilter,
    ) -> Result<Vec<Image>, ProviderError>;

    /// List packages matching `filter`.
    async fn list_instance_types(
        &self,
        ctx: &TenantContext,
        filter: &PackageFilter,
    ) -> Result<Vec<Package>, ProviderError>;
}

/// Build the shared upstream HTTP client from pool settings.
///
/// # Errors
///
/// Fails if the TLS backend cannot be initialised.
pub fn build_http_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("triton-shim/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Service endpoints for [`TritonHttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TritonEndpoints {
    /// VMAPI base URL.
    pub vmapi: String,
    /// IMGAPI base URL.
    pub imgapi: String,
    /// PAPI base URL.
    pub papi: String,
}

/// [`ComputeClient`] backed by the Triton internal HTTP APIs.
#[derive(Debug, Clone)]
pub struct TritonHttpClient {
    http: reqwest::Client,
    endpoints: TritonEndpoints,
}

impl TritonHttpClient {
    /// Create a client sharing `http`'s connection pool.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoints: TritonEndpoints) -> Self {
        Self { http, endpoints }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &TenantContext,
        base: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{path}", base.trim_end_matches('/'));
        debug!(%url, ?query, request_id = %ctx.request_id, "calling Triton API");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("accept-version", "*")
            .header("request-id", &ctx.request_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<UpstreamErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("HTTP response returned status code {status}"));
            return Err(ProviderError::from_status(status, message));
        }

        Ok(response.json::<T>().await?)
    }
}

#[derive(serde::Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

#[async_trait]
impl ComputeClient for TritonHttpClient {
    async fn list_instances(
        &self,
        ctx: &TenantContext,
        filter: &VmFilter,
    ) -> Result<Vec<Vm>, ProviderError> {
        let mut query = Vec::new();
        if !filter.uuids.is_empty() {
            query.push(("uuids", filter.uuids.join(",")));
        }
        if let Some(owner) = &filter.owner_uuid {
            query.push(("owner_uuid", owner.clone()));
        }
        self.get_json(ctx, &self.endpoints.vmapi, "/vms", &query)
            .await
    }

    async fn list_images(
        &self,
        ctx: &TenantContext,
        filter: &ImageFilter,
    ) -> Result<Vec<Image>, ProviderError> {
        let mut query = Vec::new();
        if let Some(owner) = &filter.owner {
            query.push(("owner", owner.clone()));
        }
        self.get_json(ctx, &self.endpoints.imgapi, "/images", &query)
            .await
    }

    async fn list_instance_types(
        &self,
        ctx: &TenantContext,
        filter: &PackageFilter,
    ) -> Result<Vec<Package>, ProviderError> {
        let mut query = Vec::new();
        if !filter.names.is_empty() {
            let names = serde_json::to_string(&filter.names)
                .map_err(|e| ProviderError::InvalidArgument(e.to_string()))?;
            query.push(("name", names));
        }
        self.get_json(ctx, &self.endpoints.papi, "/packages", &query)
            .await
    }
}
