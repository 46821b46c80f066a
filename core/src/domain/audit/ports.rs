use crate::domain::audit::entities::AuditEvent;

/// Best-effort notification collaborator. Delivery failures are the sink's
/// problem and never reach the operation that produced the event.
#[cfg_attr(test, mockall::automock)]
pub trait AuditEventSink: Send + Sync {
    fn publish(&self, event: AuditEvent);
}
