use tracing::{error, info};

use crate::domain::audit::{entities::AuditEvent, ports::AuditEventSink};

/// Emits audit events as structured log records under the `audit` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditEventSink for TracingAuditSink {
    fn publish(&self, event: AuditEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(target: "audit", event = %payload, "audit event"),
            Err(e) => error!(target: "audit", "Failed to serialize audit event {:?}: {}", event, e),
        }
    }
}
