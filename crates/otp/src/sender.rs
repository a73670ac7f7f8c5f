use thiserror::Error;

use crate::ticket::Channel;

/// Code delivery failure.
///
/// Delivery failures never roll back the already-persisted ticket/code;
/// the entries are left to expire naturally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("code delivery failed: {0}")]
pub struct SendError(pub String);

/// Delivery collaborator for issued codes.
///
/// Implementations wrap whatever gateway the deployment uses (SMTP relay,
/// SMS provider). The engine calls this once per issuance for channels that
/// require dispatch.
pub trait CodeSender: Send + Sync {
    fn send_code(&self, subject: &str, channel: Channel, code: &str) -> Result<(), SendError>;
}

/// Sender that logs instead of delivering.
///
/// Intended for tests/dev. The code itself is logged at debug level only.
#[derive(Debug, Clone, Default)]
pub struct LoggingSender;

impl LoggingSender {
    pub fn new() -> Self {
        Self
    }
}

impl CodeSender for LoggingSender {
    fn send_code(&self, subject: &str, channel: Channel, code: &str) -> Result<(), SendError> {
        tracing::info!(subject, %channel, "dispatching one-time code");
        tracing::debug!(subject, code, "one-time code (dev sender)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_sender_always_delivers() {
        let sender = LoggingSender::new();
        assert!(sender.send_code("a@b.com", Channel::Email, "123456").is_ok());
    }
}
