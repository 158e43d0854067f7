//! Audit trail for rejected requests.
//!
//! The sink is handed to the verifier at construction time so tests can
//! substitute [`MemoryAuditSink`] and inspect what would have been logged.

use std::fmt;
use std::net::SocketAddr;

use parking_lot::Mutex;

/// One rejected authentication attempt.
///
/// Only identifiers are recorded. Secrets, derived keys and the raw
/// `Authorization` value never reach an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Gateway-generated request id.
    pub request_id: String,
    /// Stable rejection reason, see [`crate::AuthError::reason`].
    pub reason: &'static str,
    /// Access key id the client claimed, when the header got far enough to parse.
    pub access_key_id: Option<String>,
    /// Peer address of the connection.
    pub source: Option<SocketAddr>,
}

/// Receiver of audit events.
pub trait AuditSink: Send + Sync + fmt::Debug {
    /// Record a rejected request.
    fn record(&self, event: &AuditEvent);
}

/// Emits audit events as `tracing` warnings under the `tritonshim::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        tracing::warn!(
            target: "tritonshim::audit",
            request_id = %event.request_id,
            reason = event.reason,
            access_key_id = event.access_key_id.as_deref().unwrap_or("-"),
            source = ?event.source,
            "authentication rejected"
        );
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_capture_events_in_order() {
        let sink = MemoryAuditSink::new();
        sink.record(&AuditEvent {
            request_id: "r1".to_owned(),
            reason: "MissingAuthentication",
            access_key_id: None,
            source: None,
        });
        sink.record(&AuditEvent {
            request_id: "r2".to_owned(),
            reason: "SignatureMismatch",
            access_key_id: Some("AKID".to_owned()),
            source: "127.0.0.1:4000".parse().ok(),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].request_id, "r1");
        assert_eq!(events[1].access_key_id.as_deref(), Some("AKID"));
    }

    #[test]
    fn test_should_accept_events_on_tracing_sink() {
        TracingAuditSink.record(&AuditEvent {
            request_id: "r1".to_owned(),
            reason: "UnknownAccessKey",
            access_key_id: Some("AKID".to_owned()),
            source: None,
        });
    }
}
