//! Triton EC2 shim server.
//!
//! Serves a subset of the EC2 query API for one Triton account, backed by
//! the VMAPI, IMGAPI and PAPI internal services.
//!
//! # Usage
//!
//! ```text
//! TRITON_ACCOUNT=930896af-bf8c-48d4-885c-6573a94b1853 \
//! VMAPI_URL=http://vmapi.local IMGAPI_URL=http://imgapi.local \
//! PAPI_URL=http://papi.local ACCOUNT_API_URL=http://mahi.local \
//! tritonshim-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SHIM_LISTEN` | `0.0.0.0:9090` | Bind address |
//! | `TRITON_ACCOUNT` | nil UUID | Account served |
//! | `VMAPI_URL` / `IMGAPI_URL` / `PAPI_URL` | `http://127.0.0.1` | Backing services |
//! | `ACCOUNT_API_URL` | `http://127.0.0.1` | Access key source |
//! | `SHIM_SKIP_SIGNATURE_VALIDATION` | `false` | Skip SigV4 verification |
//! | `SHIM_MAX_CLOCK_SKEW_SECS` | *(unset)* | Reject requests signed further from now |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tritonshim_auth::{SigV4Verifier, TracingAuditSink};
use tritonshim_core::{LogFormat, ShimConfig};
use tritonshim_ec2_core::{TritonEc2Handler, TritonEc2Provider};
use tritonshim_ec2_http::{Ec2HttpConfig, Ec2HttpService};
use tritonshim_triton::{HttpAccessKeyStore, TritonEndpoints, TritonHttpClient, build_http_client};

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

type Service = Ec2HttpService<TritonEc2Handler>;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }

    Ok(())
}

/// Build the [`Ec2HttpConfig`] from the [`ShimConfig`].
fn build_http_config(config: &ShimConfig) -> Ec2HttpConfig {
    Ec2HttpConfig {
        account: config.account.clone(),
        skip_signature_validation: config.skip_signature_validation,
        max_body_bytes: config.max_body_bytes,
        debug_http: config.debug_http,
    }
}

/// Wire the Triton collaborators into the HTTP service.
///
/// One upstream connection pool is shared by every backing service.
fn build_service(config: &ShimConfig) -> Result<Service> {
    let http = build_http_client(&config.upstream).context("failed to build upstream client")?;

    let endpoints = TritonEndpoints {
        vmapi: config.vmapi_url.clone(),
        imgapi: config.imgapi_url.clone(),
        papi: config.papi_url.clone(),
    };
    let compute = Arc::new(TritonHttpClient::new(http.clone(), endpoints));
    let provider = TritonEc2Provider::new(compute);
    let handler = TritonEc2Handler::new(Arc::new(provider));

    let access_keys = Arc::new(HttpAccessKeyStore::new(
        http,
        config.account_api_url.clone(),
    ));
    let verifier =
        SigV4Verifier::new(Arc::new(TracingAuditSink)).with_max_clock_skew(config.max_clock_skew);

    Ok(Ec2HttpService::new(
        Arc::new(handler),
        build_http_config(config),
        access_keys,
        verifier,
    ))
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: Service) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.for_peer(peer_addr);
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by requesting `/ping` from the running server.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /ping HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("pong") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ShimConfig::from_env().context("invalid configuration")?;

    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level, config.log_format)?;

    if config.skip_signature_validation {
        warn!("SIGNATURE VALIDATION IS DISABLED: every request is served unauthenticated");
    }

    let service = build_service(&config)?;

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        account = %config.account,
        region = %config.region,
        vmapi = %config.vmapi_url,
        imgapi = %config.imgapi_url,
        papi = %config.papi_url,
        version = VERSION,
        "starting Triton EC2 shim",
    );

    serve(listener, service).await
}
