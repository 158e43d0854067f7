//! End-to-end tests for the Triton EC2 shim.
//!
//! Each test starts the real hyper service on `127.0.0.1:0` with an
//! in-memory compute backend and a static access key set, then drives it
//! over TCP with `reqwest`.

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use async_trait::async_trait;
use chrono::Utc;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tritonshim_auth::{
    AccessKey, AuditEvent, MemoryAuditSink, SigV4Verifier, SigningParams, StaticAccessKeyStore,
    sign_request,
};
use tritonshim_core::{AccountUuid, TenantContext};
use tritonshim_ec2_core::{TritonEc2Handler, TritonEc2Provider};
use tritonshim_ec2_http::{Ec2HttpConfig, Ec2HttpService};
use tritonshim_triton::model::{Image, Package, Vm};
use tritonshim_triton::{ComputeClient, ImageFilter, PackageFilter, ProviderError, VmFilter};

/// Account the test server is bound to.
pub const TENANT: &str = "930896af-bf8c-48d4-885c-6573a94b1853";

/// Access key id known to the test server.
pub const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";

/// Secret of [`ACCESS_KEY_ID`].
pub const SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Compute backend returning canned records.
#[derive(Debug, Default)]
pub struct FakeCompute {
    /// VMs returned by `list_instances`.
    pub vms: Vec<Vm>,
    /// Images returned by `list_images`.
    pub images: Vec<Image>,
    /// Packages returned by `list_instance_types`.
    pub packages: Vec<Package>,
}

#[async_trait]
impl ComputeClient for FakeCompute {
    async fn list_instances(
        &self,
        _ctx: &TenantContext,
        filter: &VmFilter,
    ) -> Result<Vec<Vm>, ProviderError> {
        Ok(self
            .vms
            .iter()
            .filter(|vm| filter.uuids.is_empty() || filter.uuids.contains(&vm.uuid))
            .cloned()
            .collect())
    }

    async fn list_images(
        &self,
        _ctx: &TenantContext,
        _filter: &ImageFilter,
    ) -> Result<Vec<Image>, ProviderError> {
        Ok(self.images.clone())
    }

    async fn list_instance_types(
        &self,
        _ctx: &TenantContext,
        filter: &PackageFilter,
    ) -> Result<Vec<Package>, ProviderError> {
        Ok(self
            .packages
            .iter()
            .filter(|p| filter.names.is_empty() || filter.names.contains(&p.name))
            .cloned()
            .collect())
    }
}

/// A shim instance serving on an ephemeral local port.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    audit: Arc<MemoryAuditSink>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by `compute`.
    pub async fn start(compute: FakeCompute) -> Self {
        init_tracing();

        let audit = Arc::new(MemoryAuditSink::new());
        let provider = TritonEc2Provider::new(Arc::new(compute));
        let handler = TritonEc2Handler::new(Arc::new(provider));
        let config = Ec2HttpConfig {
            account: AccountUuid::new(TENANT).expect("valid tenant"),
            ..Ec2HttpConfig::default()
        };
        let store = StaticAccessKeyStore::new([AccessKey::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY)]);
        let service = Ec2HttpService::new(
            Arc::new(handler),
            config,
            Arc::new(store),
            SigV4Verifier::new(audit.clone()),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");

        let task = tokio::spawn(async move {
            let http = HttpConnBuilder::new(TokioExecutor::new());
            loop {
                let Ok((stream, peer)) = listener.accept().await else {
                    continue;
                };
                let conn = http
                    .serve_connection(TokioIo::new(stream), service.for_peer(peer))
                    .into_owned();
                tokio::spawn(async move {
                    let _ = conn.await;
                });
            }
        });

        Self { addr, audit, task }
    }

    /// Absolute URL for `path_and_query` on this server.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.addr)
    }

    /// Authentication rejections recorded so far.
    #[must_use]
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit.events()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// HTTP client that never goes through a proxy.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build reqwest client")
}

/// Headers of a request signed with `key`, including `Authorization`.
///
/// `extra` headers are added before signing and therefore signed too.
#[must_use]
pub fn signed_headers(
    method: &str,
    url: &str,
    body: &str,
    key: &AccessKey,
    extra: &[(&str, &str)],
) -> http::HeaderMap {
    let mut builder = http::Request::builder().method(method).uri(url);
    if !body.is_empty() {
        builder = builder.header("content-type", "application/x-www-form-urlencoded");
    }
    for (name, value) in extra {
        builder = builder.header(*name, *value);
    }
    let (mut parts, ()) = builder.body(()).expect("valid request").into_parts();

    let params = SigningParams {
        access_key: key,
        region: "us-east-1",
        service: "ec2",
        timestamp: Utc::now(),
    };
    sign_request(&mut parts, body.as_bytes(), &params).expect("sign request");
    parts.headers
}

/// The default test credential.
#[must_use]
pub fn test_key() -> AccessKey {
    AccessKey::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY)
}

/// Send a request signed with the test credential.
pub async fn send_signed(method: &str, url: &str, body: &str) -> reqwest::Response {
    let headers = signed_headers(method, url, body, &test_key(), &[]);
    client()
        .request(method.parse().expect("valid method"), url)
        .headers(headers)
        .body(body.to_owned())
        .send()
        .await
        .expect("request sent")
}

mod test_auth;
mod test_describe;
mod test_interop;
mod test_protocol;
