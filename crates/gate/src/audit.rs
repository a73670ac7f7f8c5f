use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use authx_core::{Principal, RequestContext};

/// Decision recorded for one authorization call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Allow,
    Deny,
}

impl core::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AuditOutcome::Allow => f.write_str("allow"),
            AuditOutcome::Deny => f.write_str("deny"),
        }
    }
}

/// Request half of an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRequest {
    pub method: String,
    pub path: String,
}

impl From<&RequestContext> for AuditRequest {
    fn from(context: &RequestContext) -> Self {
        Self {
            method: context.method.clone(),
            path: context.path.clone(),
        }
    }
}

/// One authorization decision, as recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub at: DateTime<Utc>,
    pub guard_name: String,
    pub principal: Option<Principal>,
    pub request: AuditRequest,
    pub result: AuditOutcome,
    /// Denial reason. Captured here only; never returned to the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Audit sink failure. Logged by the gate and then dropped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("audit sink failure: {0}")]
pub struct AuditError(pub String);

/// Receives one record per authorization decision.
///
/// Implementations must not assume their failures influence anything: the
/// gate treats this as a fire-and-forget side channel.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditRecord) -> Result<(), AuditError>;
}

/// Sink that emits each record as a structured tracing event.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &AuditRecord) -> Result<(), AuditError> {
        let subject = entry
            .principal
            .as_ref()
            .map(|p| p.subject_id.to_string());

        tracing::info!(
            target: "authx::audit",
            guard = %entry.guard_name,
            method = %entry.request.method,
            path = %entry.request.path,
            result = %entry.result,
            subject = subject.as_deref().unwrap_or("-"),
            reason = entry.reason.as_deref().unwrap_or(""),
            "authorization decision"
        );
        Ok(())
    }
}

/// Collecting sink.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, entry: &AuditRecord) -> Result<(), AuditError> {
        self.records
            .write()
            .map_err(|_| AuditError("lock poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }
}
