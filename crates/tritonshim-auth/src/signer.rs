//! Client-side SigV4 signing.
//!
//! Uses the same canonicalization as the verifier, so a request signed here
//! is accepted by [`crate::SigV4Verifier`] for the same key.

use chrono::{DateTime, Utc};
use http::HeaderValue;
use http::header::{AUTHORIZATION, HOST, InvalidHeaderValue};
use sha2::{Digest, Sha256};

use crate::canonical::{build_canonical_request, build_signed_headers_string};
use crate::credentials::AccessKey;
use crate::sigv4::{
    DATE_HEADER, SUPPORTED_ALGORITHM, TIMESTAMP_FORMAT, build_string_to_sign,
    collect_signed_headers, compute_signature, derive_signing_key, hash_payload,
};

/// Inputs for [`sign_request`].
#[derive(Debug, Clone, Copy)]
pub struct SigningParams<'a> {
    /// Key pair to sign with.
    pub access_key: &'a AccessKey,
    /// Scope region.
    pub region: &'a str,
    /// Scope service.
    pub service: &'a str,
    /// Signing time, written to `x-amz-date`.
    pub timestamp: DateTime<Utc>,
}

/// Sign `parts` in place.
///
/// Sets `x-amz-date`, adds `host` from the URI authority when missing, signs
/// every header present, and writes the `Authorization` header.
///
/// # Errors
///
/// Fails only if the access key id cannot be carried in a header value.
pub fn sign_request(
    parts: &mut http::request::Parts,
    body: &[u8],
    params: &SigningParams<'_>,
) -> Result<(), InvalidHeaderValue> {
    let timestamp = params.timestamp.format(TIMESTAMP_FORMAT).to_string();
    parts
        .headers
        .insert(DATE_HEADER, HeaderValue::from_str(&timestamp)?);
    if !parts.headers.contains_key(HOST) {
        if let Some(authority) = parts.uri.authority() {
            let host = HeaderValue::from_str(authority.as_str())?;
            parts.headers.insert(HOST, host);
        }
    }
    parts.headers.remove(AUTHORIZATION);

    let mut signed: Vec<String> = parts.headers.keys().map(|k| k.as_str().to_owned()).collect();
    signed.sort_unstable();
    let signed_refs: Vec<&str> = signed.iter().map(String::as_str).collect();

    let header_pairs = collect_signed_headers(parts, &signed);
    let header_refs: Vec<(&str, &str)> = header_pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let canonical_request = build_canonical_request(
        parts.method.as_str(),
        parts.uri.path(),
        parts.uri.query().unwrap_or(""),
        &header_refs,
        &signed_refs,
        &hash_payload(body),
    );
    let canonical_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));

    let date_stamp = params.timestamp.format("%Y%m%d").to_string();
    let scope = format!(
        "{date_stamp}/{}/{}/aws4_request",
        params.region, params.service
    );
    let string_to_sign = build_string_to_sign(&timestamp, &scope, &canonical_hash);
    let signing_key = derive_signing_key(
        &params.access_key.secret_access_key,
        &date_stamp,
        params.region,
        params.service,
    );
    let signature = compute_signature(&signing_key, &string_to_sign);

    let authorization = format!(
        "{SUPPORTED_ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
        params.access_key.access_key_id,
        build_signed_headers_string(&signed_refs),
    );
    parts
        .headers
        .insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);
    Ok(())
}
