//! `authx-gate` — authorization decisions with an audit trail.
//!
//! Composes policy evaluation with an audit sink: every call produces
//! exactly one allow/deny decision and exactly one audit record. The sink is
//! an isolated side channel; its failures never alter the decision.

pub mod audit;
pub mod gate;

pub use audit::{
    AuditError, AuditOutcome, AuditRecord, AuditRequest, AuditSink, MemoryAuditSink,
    TracingAuditSink,
};
pub use gate::{AccessRule, AuthorizationGate};
