//! EC2 HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;

use tritonshim_auth::{AccessKeyStore, RequestOrigin, SigV4Verifier};
use tritonshim_core::{AccountUuid, TenantContext};
use tritonshim_ec2_model::{Ec2Error, Ec2Params, ErrorKind};

use crate::body::Ec2ResponseBody;
use crate::dispatch::{Ec2Handler, dispatch_operation};
use crate::response::{
    CONTENT_TYPE, REQUEST_ID_HEADER, SERVER_NAME, auth_error, credential_store_error,
    error_to_response,
};
use crate::router::resolve_operation;

/// Path answered with `pong` before routing and authentication.
pub const HEALTH_PATH: &str = "/ping";

/// The only path EC2 requests are accepted on.
pub const SERVICE_PATH: &str = "/";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Header values never written to the debug dump.
const REDACTED_HEADERS: [&str; 2] = ["authorization", "x-amz-security-token"];

/// Configuration for the EC2 HTTP service.
#[derive(Debug, Clone)]
pub struct Ec2HttpConfig {
    /// Account every request is served for.
    pub account: AccountUuid,
    /// Whether to skip signature validation. Development only.
    pub skip_signature_validation: bool,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Dump requests and responses at debug level.
    pub debug_http: bool,
}

impl Default for Ec2HttpConfig {
    fn default() -> Self {
        Self {
            account: AccountUuid::default(),
            skip_signature_validation: false,
            max_body_bytes: 1024 * 1024,
            debug_http: false,
        }
    }
}

/// Hyper `Service` implementation for the EC2 query protocol.
///
/// Runs the gateway pipeline for each request: health probe, method and
/// path check, body collection, action routing, credential lookup,
/// signature verification and dispatch to the [`Ec2Handler`]. Every request
/// ends with one access log line.
#[derive(Debug)]
pub struct Ec2HttpService<H: Ec2Handler> {
    handler: Arc<H>,
    config: Arc<Ec2HttpConfig>,
    credentials: Arc<dyn AccessKeyStore>,
    verifier: SigV4Verifier,
    peer: Option<SocketAddr>,
}

impl<H: Ec2Handler> Ec2HttpService<H> {
    /// Create a new `Ec2HttpService`.
    pub fn new(
        handler: Arc<H>,
        config: Ec2HttpConfig,
        credentials: Arc<dyn AccessKeyStore>,
        verifier: SigV4Verifier,
    ) -> Self {
        Self {
            handler,
            config: Arc::new(config),
            credentials,
            verifier,
            peer: None,
        }
    }

    /// A copy of this service bound to one accepted connection.
    #[must_use]
    pub fn for_peer(&self, peer: SocketAddr) -> Self {
        Self {
            peer: Some(peer),
            ..self.clone()
        }
    }

    /// Run one request through the pipeline.
    ///
    /// Never fails: every error is rendered as an EC2 error response.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Ec2ResponseBody>
    where
        B: http_body::Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let started = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();
        let line = RequestLine::of(&req);

        let mut response = add_common_headers(self.process(req, &request_id).await, &request_id);
        if self.config.debug_http {
            response = dump_response(response, &request_id).await;
        }

        log_access(&line, response.status(), started.elapsed(), self.peer, &request_id);
        response
    }

    async fn process<B>(
        &self,
        req: http::Request<B>,
        request_id: &str,
    ) -> http::Response<Ec2ResponseBody>
    where
        B: http_body::Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, incoming) = req.into_parts();

        // 1. Health probe.
        if parts.uri.path() == HEALTH_PATH {
            return pong();
        }

        // 2. GET or POST on the service root only.
        if let Err(err) = check_request_line(&parts) {
            return reject(&err, request_id);
        }

        // 3. Collect body.
        let body = match collect_body(incoming, self.config.max_body_bytes).await {
            Ok(body) => body,
            Err(err) => return reject(&err, request_id),
        };
        if self.config.debug_http {
            tracing::debug!(
                request_id,
                method = %parts.method,
                uri = %parts.uri,
                headers = ?redacted_headers(&parts.headers),
                body = %String::from_utf8_lossy(&body),
                "request dump",
            );
        }

        // 4. Route: extract the operation from the `Action` parameter.
        let params = request_params(&parts, &body);
        let op = match resolve_operation(&params) {
            Ok(op) => op,
            Err(err) => return reject(&err, request_id),
        };

        let ctx = TenantContext::new(self.config.account.clone(), request_id);

        // 5. Authenticate (if enabled).
        if self.config.skip_signature_validation {
            tracing::debug!(request_id, "signature validation skipped");
        } else if let Err(err) = self.authenticate(&parts, &body, &ctx).await {
            return reject(&err, request_id);
        }

        tracing::debug!(operation = %op, request_id, "routing EC2 request");

        // 6. Dispatch to handler.
        match dispatch_operation(self.handler.as_ref(), op, params, ctx).await {
            Ok(response) => response,
            Err(err) => reject(&err, request_id),
        }
    }

    async fn authenticate(
        &self,
        parts: &http::request::Parts,
        body: &[u8],
        ctx: &TenantContext,
    ) -> Result<(), Ec2Error> {
        // Without a header the verifier rejects before any lookup.
        let credentials = if parts.headers.contains_key(http::header::AUTHORIZATION) {
            self.credentials
                .list_access_keys(ctx)
                .await
                .map_err(credential_store_error)?
        } else {
            Vec::new()
        };

        let origin = RequestOrigin {
            request_id: &ctx.request_id,
            source: self.peer,
        };
        let result = self
            .verifier
            .verify(parts, body, &credentials, &origin)
            .map_err(|err| auth_error(&err))?;

        tracing::debug!(
            request_id = %ctx.request_id,
            access_key_id = %result.access_key_id,
            "request authenticated",
        );
        Ok(())
    }
}

impl<H: Ec2Handler> Clone for Ec2HttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
            credentials: Arc::clone(&self.credentials),
            verifier: self.verifier.clone(),
            peer: self.peer,
        }
    }
}

impl<H: Ec2Handler> hyper::service::Service<http::Request<Incoming>> for Ec2HttpService<H> {
    type Response = http::Response<Ec2ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

/// Collect the body into a single buffer, refusing anything over `limit`.
async fn collect_body<B>(body: B, limit: usize) -> Result<Bytes, Ec2Error>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Limited::new(body, limit)
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                Ec2Error::invalid_parameter_value(format!(
                    "Request body exceeds the limit of {limit} bytes"
                ))
            } else {
                Ec2Error::internal_error(format!("Failed to read request body: {e}"))
            }
        })
}

fn check_request_line(parts: &http::request::Parts) -> Result<(), Ec2Error> {
    if parts.method != http::Method::GET && parts.method != http::Method::POST {
        return Err(Ec2Error::unsupported_http_verb(parts.method.as_str()));
    }
    if parts.uri.path() != SERVICE_PATH {
        return Err(Ec2Error::unknown_path(parts.uri.path()));
    }
    Ok(())
}

/// Query parameters, followed by form fields for form-encoded POST requests.
///
/// A POST body with any other content type is ignored.
fn request_params(parts: &http::request::Parts, body: &[u8]) -> Ec2Params {
    let mut params = Ec2Params::parse(parts.uri.query().unwrap_or(""));
    if parts.method == http::Method::POST && !body.is_empty() && is_form_encoded(&parts.headers) {
        params.extend(Ec2Params::from_pairs(
            form_urlencoded::parse(body).into_owned(),
        ));
    }
    params
}

fn is_form_encoded(headers: &http::HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Request line fields kept for the access log.
struct RequestLine {
    method: http::Method,
    path: String,
    user_agent: String,
}

impl RequestLine {
    fn of<B>(req: &http::Request<B>) -> Self {
        let uri = req.uri();
        let path = match uri.query() {
            Some(query) => format!("{}?{query}", uri.path()),
            None => uri.path().to_owned(),
        };
        let user_agent = req
            .headers()
            .get(http::header::USER_AGENT)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();
        Self {
            method: req.method().clone(),
            path,
            user_agent,
        }
    }
}

/// One line per request, at a level chosen by the response status.
fn log_access(
    line: &RequestLine,
    status: http::StatusCode,
    latency: Duration,
    peer: Option<SocketAddr>,
    request_id: &str,
) {
    let status = status.as_u16();
    let latency_ms = latency.as_secs_f64() * 1000.0;
    let ip = peer.map(|p| p.ip().to_string()).unwrap_or_default();
    let ip = ip.as_str();
    let method = line.method.as_str();
    let path = line.path.as_str();
    let user_agent = line.user_agent.as_str();

    match status {
        400..=499 => tracing::warn!(request_id, status, method, path, ip, latency_ms, user_agent, "request"),
        500.. => tracing::error!(request_id, status, method, path, ip, latency_ms, user_agent, "request"),
        _ => tracing::info!(request_id, status, method, path, ip, latency_ms, user_agent, "request"),
    }
}

fn redacted_headers(headers: &http::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if REDACTED_HEADERS.contains(&name.as_str()) {
                "<redacted>".to_owned()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.as_str().to_owned(), shown)
        })
        .collect()
}

/// Log the response, then rebuild it from the buffered body.
async fn dump_response(
    response: http::Response<Ec2ResponseBody>,
    request_id: &str,
) -> http::Response<Ec2ResponseBody> {
    let (parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            tracing::debug!(request_id, error = %err, "response body unavailable for dump");
            Bytes::new()
        }
    };
    tracing::debug!(
        request_id,
        status = parts.status.as_u16(),
        headers = ?redacted_headers(&parts.headers),
        body = %String::from_utf8_lossy(&bytes),
        "response dump",
    );
    http::Response::from_parts(parts, Ec2ResponseBody::from_bytes(bytes))
}

fn reject(err: &Ec2Error, request_id: &str) -> http::Response<Ec2ResponseBody> {
    match err.kind() {
        ErrorKind::Upstream | ErrorKind::Internal => tracing::error!(
            request_id,
            code = %err.code,
            source = ?err.source,
            "request failed",
        ),
        ErrorKind::Authentication => {
            tracing::warn!(request_id, code = %err.code, "request rejected");
        }
        ErrorKind::Protocol => {
            tracing::debug!(request_id, code = %err.code, message = %err.message, "bad request");
        }
    }
    error_to_response(err, request_id)
}

fn pong() -> http::Response<Ec2ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", "text/plain")
        .body(Ec2ResponseBody::from_bytes("pong"))
        .expect("valid pong response")
}

/// Add common response headers to every EC2 response.
fn add_common_headers(
    mut response: http::Response<Ec2ResponseBody>,
    request_id: &str,
) -> http::Response<Ec2ResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    headers
        .entry("content-type")
        .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));

    headers.insert("server", http::HeaderValue::from_static(SERVER_NAME));

    response
}
