//! AWS Signature Version 4 request authentication for the Triton EC2 shim.
//!
//! Inbound EC2 requests are authenticated by independently re-deriving the
//! expected signature from the tenant's access keys and comparing it with the
//! one the client sent. Only header-based signing is supported.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tritonshim_auth::{AccessKey, SigV4Verifier, TracingAuditSink};
//!
//! let verifier = SigV4Verifier::new(Arc::new(TracingAuditSink));
//! let keys = vec![AccessKey::new("AKIDEXAMPLE", "secret")];
//! # let _ = (verifier, keys);
//! ```
//!
//! - [`canonical`] - canonical request construction
//! - [`credentials`] - access key type and the Credential Store Adapter trait
//! - [`audit`] - injected audit sink for rejections
//! - [`sigv4`] - parsing, key derivation and verification
//! - [`signer`] - client-side signing with the same canonicalization

pub mod audit;
pub mod canonical;
pub mod credentials;
pub mod error;
pub mod signer;
pub mod sigv4;

pub use audit::{AuditEvent, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use credentials::{AccessKey, AccessKeyStore, StaticAccessKeyStore};
pub use error::{AuthError, CredentialStoreError};
pub use signer::{SigningParams, sign_request};
pub use sigv4::{AuthResult, AuthorizationHeader, RequestOrigin, SigV4Verifier, hash_payload};
