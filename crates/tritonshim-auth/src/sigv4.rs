//! AWS Signature Version 4 verification.
//!
//! [`SigV4Verifier::verify`] re-derives the expected signature from the
//! tenant's own secret and compares it with what the client sent:
//!
//! 1. Extract the `Authorization` header.
//! 2. Parse it into an [`AuthorizationHeader`].
//! 3. Find the single access key matching the claimed id.
//! 4. Parse `x-amz-date`, optionally enforcing a clock-skew bound.
//! 5. Reduce the request headers to the claimed signed set.
//! 6. Build the canonical request, hashing the actual body.
//! 7. Derive the signing key chain.
//! 8. Build the string to sign and the expected signature.
//! 9. Compare in constant time.
//!
//! Every rejection is reported to the injected [`AuditSink`].

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::audit::{AuditEvent, AuditSink};
use crate::canonical::build_canonical_request;
use crate::credentials::AccessKey;
use crate::error::AuthError;

/// The only signing algorithm accepted.
pub const SUPPORTED_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Header carrying the request timestamp.
pub const DATE_HEADER: &str = "x-amz-date";

/// ISO 8601 basic format used by `x-amz-date`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Fixed last component of every credential scope.
pub const SCOPE_TERMINATOR: &str = "aws4_request";

type HmacSha256 = Hmac<Sha256>;

/// The result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    /// The access key id that signed the request.
    pub access_key_id: String,
    /// Region from the credential scope.
    pub region: String,
    /// Service from the credential scope.
    pub service: String,
    /// Header names covered by the signature, lowercase.
    pub signed_headers: Vec<String>,
}

/// Parsed components of a SigV4 `Authorization` header.
///
/// ```text
/// AWS4-HMAC-SHA256 Credential=AKID/20150830/us-east-1/ec2/aws4_request,
///   SignedHeaders=host;x-amz-date,
///   Signature=<hex-signature>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationHeader {
    /// Signing algorithm, always [`SUPPORTED_ALGORITHM`].
    pub algorithm: String,
    /// Claimed access key id.
    pub access_key_id: String,
    /// Scope date (`YYYYMMDD`).
    pub date_stamp: String,
    /// Scope region.
    pub region: String,
    /// Scope service.
    pub service: String,
    /// Signed header names in the order given, lowercased.
    pub signed_headers: Vec<String>,
    /// Hex signature as sent.
    pub signature: String,
}

impl AuthorizationHeader {
    /// `date/region/service/aws4_request`.
    #[must_use]
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{SCOPE_TERMINATOR}",
            self.date_stamp, self.region, self.service
        )
    }
}

/// Parse a SigV4 `Authorization` header value.
///
/// Parsing is strict: every component must appear exactly once, unknown
/// components are refused, and nothing is partially matched.
///
/// # Errors
///
/// Returns [`AuthError::MalformedAuthorization`] describing the first problem found.
pub fn parse_authorization_header(header: &str) -> Result<AuthorizationHeader, AuthError> {
    let (algorithm, rest) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| AuthError::malformed("missing credential components"))?;

    if algorithm != SUPPORTED_ALGORITHM {
        return Err(AuthError::malformed(format!(
            "unsupported algorithm {algorithm}"
        )));
    }

    let mut credential = None;
    let mut signed_headers = None;
    let mut signature = None;

    for part in rest.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or_else(|| AuthError::malformed("expected key=value component"))?;
        let slot = match key {
            "Credential" => &mut credential,
            "SignedHeaders" => &mut signed_headers,
            "Signature" => &mut signature,
            other => {
                return Err(AuthError::malformed(format!("unknown component {other}")));
            }
        };
        if slot.replace(value).is_some() {
            return Err(AuthError::malformed(format!("duplicate component {key}")));
        }
    }

    let credential = credential.ok_or_else(|| AuthError::malformed("missing Credential"))?;
    let signed_headers =
        signed_headers.ok_or_else(|| AuthError::malformed("missing SignedHeaders"))?;
    let signature = signature.ok_or_else(|| AuthError::malformed("missing Signature"))?;

    let scope: Vec<&str> = credential.split('/').collect();
    let &[access_key_id, date_stamp, region, service, terminator] = scope.as_slice() else {
        return Err(AuthError::malformed(
            "credential must be AKID/date/region/service/aws4_request",
        ));
    };
    if terminator != SCOPE_TERMINATOR {
        return Err(AuthError::malformed("credential scope terminator"));
    }
    if access_key_id.is_empty() || region.is_empty() || service.is_empty() {
        return Err(AuthError::malformed("empty credential component"));
    }
    if date_stamp.len() != 8 || !date_stamp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AuthError::malformed("credential date must be YYYYMMDD"));
    }

    let signed_headers: Vec<String> = signed_headers
        .split(';')
        .map(|name| name.trim().to_ascii_lowercase())
        .collect();
    let mut seen = HashSet::with_capacity(signed_headers.len());
    for name in &signed_headers {
        if name.is_empty() {
            return Err(AuthError::malformed("empty signed header name"));
        }
        if !seen.insert(name.as_str()) {
            return Err(AuthError::malformed(format!("duplicate signed header {name}")));
        }
    }

    if signature.is_empty() || !signature.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AuthError::malformed("signature must be hex encoded"));
    }

    Ok(AuthorizationHeader {
        algorithm: algorithm.to_owned(),
        access_key_id: access_key_id.to_owned(),
        date_stamp: date_stamp.to_owned(),
        region: region.to_owned(),
        service: service.to_owned(),
        signed_headers,
        signature: signature.to_owned(),
    })
}

/// Build the string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256\n
/// <ISO8601 timestamp>\n
/// <credential_scope>\n
/// <hex(SHA256(canonical_request))>
/// ```
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{SUPPORTED_ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the signing key through the HMAC-SHA256 chain.
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, date)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
///
/// The result is secret material and must not be logged.
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, SCOPE_TERMINATOR.as_bytes())
}

/// Hex-encoded HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Hex-encoded SHA-256 of the payload.
///
/// # Examples
///
/// ```
/// use tritonshim_auth::sigv4::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Where a request came from, for audit records.
#[derive(Debug, Clone, Copy)]
pub struct RequestOrigin<'a> {
    /// Gateway-generated request id.
    pub request_id: &'a str,
    /// Peer address of the connection, when known.
    pub source: Option<SocketAddr>,
}

/// Header-based SigV4 verifier.
///
/// Holds no per-request state. Verifying the same request twice yields the
/// same verdict (apart from the wall clock when a skew bound is set).
#[derive(Debug, Clone)]
pub struct SigV4Verifier {
    audit: Arc<dyn AuditSink>,
    max_clock_skew: Option<Duration>,
}

impl SigV4Verifier {
    /// Create a verifier reporting rejections to `audit`. No skew bound.
    #[must_use]
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self {
            audit,
            max_clock_skew: None,
        }
    }

    /// Reject requests whose timestamp is further than `skew` from now.
    #[must_use]
    pub fn with_max_clock_skew(mut self, skew: Option<Duration>) -> Self {
        self.max_clock_skew = skew;
        self
    }

    /// Verify a request against the tenant's credential set.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] for the first failing step. The rejection has
    /// already been recorded on the audit sink.
    pub fn verify(
        &self,
        parts: &http::request::Parts,
        body: &[u8],
        credentials: &[AccessKey],
        origin: &RequestOrigin<'_>,
    ) -> Result<AuthResult, AuthError> {
        self.verify_at(parts, body, credentials, origin, Utc::now())
    }

    /// Same as [`Self::verify`] with an explicit notion of "now".
    ///
    /// # Errors
    ///
    /// See [`Self::verify`].
    pub fn verify_at(
        &self,
        parts: &http::request::Parts,
        body: &[u8],
        credentials: &[AccessKey],
        origin: &RequestOrigin<'_>,
        now: DateTime<Utc>,
    ) -> Result<AuthResult, AuthError> {
        let mut claimed = None;
        let result = self.check(parts, body, credentials, now, &mut claimed);
        if let Err(err) = &result {
            self.audit.record(&AuditEvent {
                request_id: origin.request_id.to_owned(),
                reason: err.reason(),
                access_key_id: claimed,
                source: origin.source,
            });
        }
        result
    }

    fn check(
        &self,
        parts: &http::request::Parts,
        body: &[u8],
        credentials: &[AccessKey],
        now: DateTime<Utc>,
        claimed: &mut Option<String>,
    ) -> Result<AuthResult, AuthError> {
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .ok_or(AuthError::MissingAuthentication)?
            .to_str()
            .map_err(|_| AuthError::malformed("non-ASCII Authorization header"))?;

        let parsed = parse_authorization_header(auth_header)?;
        *claimed = Some(parsed.access_key_id.clone());

        let mut matches = credentials
            .iter()
            .filter(|key| key.access_key_id == parsed.access_key_id);
        let key = match (matches.next(), matches.next()) {
            (Some(key), None) => key,
            _ => return Err(AuthError::UnknownAccessKey(parsed.access_key_id.clone())),
        };

        let (timestamp, signed_at) = parse_timestamp(parts)?;
        if signed_at.format("%Y%m%d").to_string() != parsed.date_stamp {
            return Err(AuthError::MissingOrInvalidTimestamp);
        }
        if let Some(max) = self.max_clock_skew {
            let skew = (now - signed_at).abs().to_std().unwrap_or(Duration::MAX);
            if skew > max {
                debug!(skew_secs = skew.as_secs(), "request timestamp outside skew bound");
                return Err(AuthError::MissingOrInvalidTimestamp);
            }
        }

        debug!(
            access_key_id = %parsed.access_key_id,
            region = %parsed.region,
            service = %parsed.service,
            "verifying SigV4 signature"
        );

        let header_pairs = collect_signed_headers(parts, &parsed.signed_headers);
        let header_refs: Vec<(&str, &str)> = header_pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let signed_refs: Vec<&str> = parsed.signed_headers.iter().map(String::as_str).collect();

        let canonical_request = build_canonical_request(
            parts.method.as_str(),
            parts.uri.path(),
            parts.uri.query().unwrap_or(""),
            &header_refs,
            &signed_refs,
            &hash_payload(body),
        );
        let canonical_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));

        let string_to_sign =
            build_string_to_sign(&timestamp, &parsed.credential_scope(), &canonical_hash);
        let signing_key = derive_signing_key(
            &key.secret_access_key,
            &parsed.date_stamp,
            &parsed.region,
            &parsed.service,
        );
        let expected = compute_signature(&signing_key, &string_to_sign);

        if expected.as_bytes().ct_eq(parsed.signature.as_bytes()).into() {
            debug!(access_key_id = %parsed.access_key_id, "signature verified");
            Ok(AuthResult {
                access_key_id: parsed.access_key_id,
                region: parsed.region,
                service: parsed.service,
                signed_headers: parsed.signed_headers,
            })
        } else {
            Err(AuthError::SignatureMismatch)
        }
    }
}

/// Parse `x-amz-date`, requiring the exact basic ISO 8601 form.
fn parse_timestamp(parts: &http::request::Parts) -> Result<(String, DateTime<Utc>), AuthError> {
    let raw = parts
        .headers
        .get(DATE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingOrInvalidTimestamp)?;
    let parsed = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| AuthError::MissingOrInvalidTimestamp)?;
    if parsed.format(TIMESTAMP_FORMAT).to_string() != raw {
        return Err(AuthError::MissingOrInvalidTimestamp);
    }
    Ok((raw.to_owned(), parsed.and_utc()))
}

/// Collect the values of the signed headers, dropping everything else.
///
/// `authorization` is never included. A signed `host` that is not present as
/// a header (HTTP/2) is taken from the URI authority.
pub(crate) fn collect_signed_headers(
    parts: &http::request::Parts,
    signed_headers: &[String],
) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(signed_headers.len());
    for name in signed_headers {
        if name == "authorization" {
            continue;
        }
        let before = pairs.len();
        for value in parts.headers.get_all(name.as_str()) {
            if let Ok(value) = value.to_str() {
                pairs.push((name.clone(), value.to_owned()));
            }
        }
        if pairs.len() == before && name == "host" {
            if let Some(authority) = parts.uri.authority() {
                pairs.push((name.clone(), authority.as_str().to_owned()));
            }
        }
    }
    pairs
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
