//! Tenant identity types shared across the shim.

use std::fmt;

/// Triton account (owner) UUID.
///
/// Stored in its canonical lowercase hyphenated form so that it can be passed
/// verbatim to the internal APIs as an `owner_uuid` filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccountUuid(String);

impl AccountUuid {
    /// Placeholder account used when none is configured.
    pub const DEFAULT: &str = "00000000-0000-0000-0000-000000000000";

    /// Create a new account UUID from a string.
    ///
    /// # Errors
    /// Returns an error if the value is not a valid UUID.
    pub fn new(id: impl Into<String>) -> Result<Self, crate::ShimError> {
        let id = id.into();
        let parsed =
            uuid::Uuid::parse_str(&id).map_err(|_| crate::ShimError::InvalidAccount(id.clone()))?;
        Ok(Self(parsed.hyphenated().to_string()))
    }

    /// Get the account UUID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccountUuid {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AccountUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The tenant a single inbound request is served for.
///
/// Created fresh per request and passed down to every collaborator that
/// needs to scope its work (credential lookup, provider queries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// Owner of the resources and access keys.
    pub account: AccountUuid,
    /// Request id generated by the gateway, never derived from client input.
    pub request_id: String,
}

impl TenantContext {
    /// Create a context for `account` with the given request id.
    #[must_use]
    pub fn new(account: AccountUuid, request_id: impl Into<String>) -> Self {
        Self {
            account,
            request_id: request_id.into(),
        }
    }
}
