use std::sync::Arc;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::Rng;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::OtpConfig;
use crate::sender::CodeSender;
use crate::store::{KvStore, StoreError};
use crate::ticket::{Channel, OtpTicket, TicketId};

/// OTP issuance/verification failure.
///
/// Only the issuance path surfaces errors. Verification collapses every
/// failure into a plain denial so callers can never distinguish a wrong code
/// from an expired or exhausted ticket.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OtpError {
    /// A code was already issued for this subject within the cooldown
    /// window. Caller-actionable, safe to disclose.
    #[error("a code was recently issued for this subject")]
    CooldownActive,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("ticket serialization failed: {0}")]
    Serialize(String),

    /// Delivery failed after the ticket/code were persisted; the entries are
    /// left to expire naturally.
    #[error("code delivery failed: {0}")]
    Delivery(String),
}

/// Receipt for an issued code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedCode {
    pub ticket_id: TicketId,
    pub expires_in: u64,
}

/// Issues and verifies short numeric one-time codes.
///
/// All durable state lives behind the [`KvStore`]; the service itself is
/// immutable after construction and safe to share across threads. Per ticket
/// the lifecycle is issued → verified (consumed) on a correct, timely,
/// attempt-budgeted match; issued → exhausted once attempts reach the
/// configured maximum; issued → expired when the store's TTL elapses.
pub struct OtpService {
    store: Arc<dyn KvStore>,
    sender: Option<Arc<dyn CodeSender>>,
    config: OtpConfig,
}

impl OtpService {
    /// Build a service over a provisioned store.
    ///
    /// The store handle is required: there is no deferred-connection mode.
    pub fn new(store: Arc<dyn KvStore>, config: OtpConfig) -> Self {
        Self {
            store,
            sender: None,
            config,
        }
    }

    /// Attach a delivery collaborator for email/sms channels.
    pub fn with_sender(mut self, sender: Arc<dyn CodeSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Issue a code for a subject.
    ///
    /// Fails with [`OtpError::CooldownActive`] when a code was issued for
    /// this subject within the cooldown window. Persists the ticket, the
    /// code, and a cooldown marker as three TTL-bound entries, then
    /// dispatches through the sender for channels that require it. Delivery
    /// failure does not roll the entries back.
    pub fn request_code(&self, subject: &str, channel: Channel) -> Result<IssuedCode, OtpError> {
        let cooldown_key = self.cooldown_key(subject);
        if self.store.get(&cooldown_key)?.is_some() {
            return Err(OtpError::CooldownActive);
        }

        let ticket_id = TicketId::new();
        let code = generate_code(self.config.effective_code_length());
        let ticket = OtpTicket {
            ticket_id,
            subject: subject.to_string(),
            channel,
            created_at: Utc::now(),
            ttl_seconds: self.config.ttl_secs,
            attempts: 0,
        };
        let payload =
            serde_json::to_string(&ticket).map_err(|e| OtpError::Serialize(e.to_string()))?;

        // Three independent round trips; a crash in between can leave a
        // ticket without its paired code, which verification treats as a
        // plain denial.
        self.store
            .set_with_ttl(&self.ticket_key(&ticket_id), &payload, self.config.ttl_secs)?;
        self.store
            .set_with_ttl(&self.code_key(&ticket_id), &code, self.config.ttl_secs)?;
        self.store
            .set_with_ttl(&cooldown_key, "1", self.config.cooldown_secs)?;

        tracing::info!(%ticket_id, %channel, "one-time code issued");

        if channel.requires_dispatch() {
            if let Some(sender) = &self.sender {
                sender
                    .send_code(subject, channel, &code)
                    .map_err(|e| OtpError::Delivery(e.to_string()))?;
            }
        }

        Ok(IssuedCode {
            ticket_id,
            expires_in: self.config.ttl_secs,
        })
    }

    /// Verify a supplied code against a ticket.
    ///
    /// Returns the ticket's subject on the first correct, timely,
    /// attempt-budgeted match and consumes the ticket (single use). Every
    /// other outcome (missing/expired/exhausted ticket, wrong code, store
    /// trouble) is `None` with no further detail. Each non-exhausted
    /// attempt increments the persisted counter under the ticket's
    /// *remaining* TTL, never resetting it.
    pub fn verify_code(&self, ticket_id: &TicketId, code: &str) -> Option<String> {
        let ticket_key = self.ticket_key(ticket_id);

        let raw = match self.store.get(&ticket_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%ticket_id, error = %e, "ticket lookup failed");
                return None;
            }
        };

        let mut ticket: OtpTicket = match serde_json::from_str(&raw) {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::warn!(%ticket_id, error = %e, "ticket payload corrupt");
                return None;
            }
        };

        if ticket.is_exhausted(self.config.max_attempts) {
            return None;
        }

        // Count this attempt whatever the outcome.
        ticket.attempts += 1;
        self.persist_attempt(&ticket_key, &ticket);

        let stored = match self.store.get(&self.code_key(ticket_id)) {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%ticket_id, error = %e, "code lookup failed");
                return None;
            }
        };

        if !codes_match(code.as_bytes(), stored.as_bytes()) {
            return None;
        }

        // Single use: consume both entries before reporting success.
        if let Err(e) = self.store.delete(&self.code_key(ticket_id)) {
            tracing::warn!(%ticket_id, error = %e, "consumed code entry not deleted");
        }
        if let Err(e) = self.store.delete(&ticket_key) {
            tracing::warn!(%ticket_id, error = %e, "consumed ticket entry not deleted");
        }

        tracing::info!(%ticket_id, "one-time code verified");
        Some(ticket.subject)
    }

    /// Re-persist a ticket under its remaining TTL.
    ///
    /// Failures here are logged, not surfaced: the verification outcome is
    /// already determined by the comparison, and the counter write must not
    /// extend the ticket's life.
    fn persist_attempt(&self, ticket_key: &str, ticket: &OtpTicket) {
        let remaining = match self.store.ttl(ticket_key) {
            Ok(Some(secs)) if secs > 0 => secs,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(error = %e, "remaining ttl lookup failed");
                return;
            }
        };

        match serde_json::to_string(ticket) {
            Ok(payload) => {
                if let Err(e) = self.store.set_with_ttl(ticket_key, &payload, remaining) {
                    tracing::warn!(error = %e, "attempt counter not persisted");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "attempt counter not serialized");
            }
        }
    }

    fn ticket_key(&self, ticket_id: &TicketId) -> String {
        format!("{}:otp:t:{}", self.config.namespace, ticket_id)
    }

    fn code_key(&self, ticket_id: &TicketId) -> String {
        format!("{}:otp:c:{}", self.config.namespace, ticket_id)
    }

    fn cooldown_key(&self, subject: &str) -> String {
        format!("{}:otp:cd:{}", self.config.namespace, subject)
    }
}

/// Generate a numeric code from the OS CSPRNG.
fn generate_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Compare supplied and stored codes.
///
/// Length is checked first; on mismatch a self-comparison runs so the
/// content-comparison cost stays uniform either way. Equal-length content
/// comparison is constant-time.
fn codes_match(supplied: &[u8], stored: &[u8]) -> bool {
    if supplied.len() != stored.len() {
        std::hint::black_box(stored.ct_eq(stored));
        return false;
    }
    supplied.ct_eq(stored).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryKvStore;
    use std::sync::Mutex;

    struct RecordingSender {
        calls: Mutex<Vec<(String, Channel, String)>>,
    }

    impl RecordingSender {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Channel, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CodeSender for RecordingSender {
        fn send_code(
            &self,
            subject: &str,
            channel: Channel,
            code: &str,
        ) -> Result<(), crate::sender::SendError> {
            self.calls
                .lock()
                .unwrap()
                .push((subject.to_string(), channel, code.to_string()));
            Ok(())
        }
    }

    struct FailingSender;

    impl CodeSender for FailingSender {
        fn send_code(
            &self,
            _subject: &str,
            _channel: Channel,
            _code: &str,
        ) -> Result<(), crate::sender::SendError> {
            Err(crate::sender::SendError("gateway down".to_string()))
        }
    }

    fn config() -> OtpConfig {
        OtpConfig {
            namespace: "authx".to_string(),
            code_length: 6,
            ttl_secs: 300,
            max_attempts: 5,
            cooldown_secs: 60,
        }
    }

    fn setup() -> (Arc<InMemoryKvStore>, OtpService) {
        let store = Arc::new(InMemoryKvStore::new());
        let service = OtpService::new(store.clone(), config());
        (store, service)
    }

    fn stored_code(store: &InMemoryKvStore, ticket_id: &TicketId) -> String {
        store
            .get(&format!("authx:otp:c:{ticket_id}"))
            .unwrap()
            .expect("code entry present")
    }

    fn stored_attempts(store: &InMemoryKvStore, ticket_id: &TicketId) -> u32 {
        let raw = store
            .get(&format!("authx:otp:t:{ticket_id}"))
            .unwrap()
            .expect("ticket entry present");
        serde_json::from_str::<OtpTicket>(&raw).unwrap().attempts
    }

    #[test]
    fn request_persists_ticket_code_and_cooldown() {
        let (store, service) = setup();

        let issued = service.request_code("a@b.com", Channel::Email).unwrap();
        assert_eq!(issued.expires_in, 300);

        let ticket_raw = store
            .get(&format!("authx:otp:t:{}", issued.ticket_id))
            .unwrap()
            .expect("ticket entry");
        let ticket: OtpTicket = serde_json::from_str(&ticket_raw).unwrap();
        assert_eq!(ticket.subject, "a@b.com");
        assert_eq!(ticket.channel, Channel::Email);
        assert_eq!(ticket.attempts, 0);
        assert_eq!(ticket.ttl_seconds, 300);

        let code = stored_code(&store, &issued.ticket_id);
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| b.is_ascii_digit()));

        assert!(store.get("authx:otp:cd:a@b.com").unwrap().is_some());
    }

    #[test]
    fn second_request_within_cooldown_fails() {
        let (_store, service) = setup();

        service.request_code("a@b.com", Channel::Email).unwrap();
        let result = service.request_code("a@b.com", Channel::Email);

        assert!(matches!(result, Err(OtpError::CooldownActive)));
    }

    #[test]
    fn cooldown_is_per_subject() {
        let (_store, service) = setup();

        service.request_code("a@b.com", Channel::Email).unwrap();
        assert!(service.request_code("c@d.com", Channel::Email).is_ok());
    }

    #[test]
    fn correct_code_verifies_exactly_once() {
        let (store, service) = setup();

        let issued = service.request_code("a@b.com", Channel::Email).unwrap();
        let code = stored_code(&store, &issued.ticket_id);

        assert_eq!(
            service.verify_code(&issued.ticket_id, &code),
            Some("a@b.com".to_string())
        );

        // Consumed: both entries are gone and any further attempt denies.
        assert!(store
            .get(&format!("authx:otp:t:{}", issued.ticket_id))
            .unwrap()
            .is_none());
        assert!(store
            .get(&format!("authx:otp:c:{}", issued.ticket_id))
            .unwrap()
            .is_none());
        assert!(service.verify_code(&issued.ticket_id, &code).is_none());
    }

    #[test]
    fn attempts_climb_and_exhaust_at_the_maximum() {
        let (store, service) = setup();

        let issued = service.request_code("a@b.com", Channel::Email).unwrap();
        let code = stored_code(&store, &issued.ticket_id);
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for expected in 1..=4u32 {
            assert!(service.verify_code(&issued.ticket_id, wrong).is_none());
            assert_eq!(stored_attempts(&store, &issued.ticket_id), expected);
        }

        // Fifth wrong attempt exhausts the ticket.
        assert!(service.verify_code(&issued.ticket_id, wrong).is_none());
        assert_eq!(stored_attempts(&store, &issued.ticket_id), 5);

        // Even the correct code is denied now, and the counter stays put.
        assert!(service.verify_code(&issued.ticket_id, &code).is_none());
        assert_eq!(stored_attempts(&store, &issued.ticket_id), 5);
    }

    #[test]
    fn attempt_counter_keeps_remaining_ttl() {
        let (store, service) = setup();

        let issued = service.request_code("a@b.com", Channel::Email).unwrap();
        let ticket_key = format!("authx:otp:t:{}", issued.ticket_id);

        assert!(service.verify_code(&issued.ticket_id, "wrong!").is_none());

        let remaining = store.ttl(&ticket_key).unwrap().unwrap();
        assert!(remaining <= 300);
        assert!(remaining >= 295);
    }

    #[test]
    fn unknown_ticket_denies() {
        let (_store, service) = setup();
        assert!(service.verify_code(&TicketId::new(), "123456").is_none());
    }

    #[test]
    fn expired_ticket_denies() {
        let (store, service) = setup();

        let issued = service.request_code("a@b.com", Channel::Email).unwrap();
        let code = stored_code(&store, &issued.ticket_id);

        // Simulate the store's TTL reaper.
        store
            .delete(&format!("authx:otp:t:{}", issued.ticket_id))
            .unwrap();
        store
            .delete(&format!("authx:otp:c:{}", issued.ticket_id))
            .unwrap();

        assert!(service.verify_code(&issued.ticket_id, &code).is_none());
    }

    #[test]
    fn ticket_without_paired_code_denies() {
        let (store, service) = setup();

        let issued = service.request_code("a@b.com", Channel::Email).unwrap();
        let code = stored_code(&store, &issued.ticket_id);

        // The dual-write inconsistency window: ticket present, code gone.
        store
            .delete(&format!("authx:otp:c:{}", issued.ticket_id))
            .unwrap();

        assert!(service.verify_code(&issued.ticket_id, &code).is_none());
        // The attempt still counted.
        assert_eq!(stored_attempts(&store, &issued.ticket_id), 1);
    }

    #[test]
    fn email_channel_dispatches_the_stored_code() {
        let store = Arc::new(InMemoryKvStore::new());
        let sender = Arc::new(RecordingSender::new());
        let service = OtpService::new(store.clone(), config()).with_sender(sender.clone());

        let issued = service.request_code("a@b.com", Channel::Email).unwrap();

        let calls = sender.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "a@b.com");
        assert_eq!(calls[0].1, Channel::Email);
        assert_eq!(calls[0].2, stored_code(&store, &issued.ticket_id));
    }

    #[test]
    fn totp_channel_skips_dispatch() {
        let store = Arc::new(InMemoryKvStore::new());
        let sender = Arc::new(RecordingSender::new());
        let service = OtpService::new(store, config()).with_sender(sender.clone());

        service.request_code("a@b.com", Channel::Totp).unwrap();
        assert!(sender.calls().is_empty());
    }

    #[test]
    fn delivery_failure_leaves_entries_in_place() {
        let store = Arc::new(InMemoryKvStore::new());
        let service = OtpService::new(store.clone(), config()).with_sender(Arc::new(FailingSender));

        let result = service.request_code("a@b.com", Channel::Sms);
        assert!(matches!(result, Err(OtpError::Delivery(_))));

        // Ticket, code, and cooldown marker all survive to expire naturally.
        assert!(store.get("authx:otp:cd:a@b.com").unwrap().is_some());
        let verifiable = service.request_code("a@b.com", Channel::Sms);
        assert!(matches!(verifiable, Err(OtpError::CooldownActive)));
    }

    #[test]
    fn generated_codes_honor_the_clamp() {
        assert_eq!(generate_code(6).len(), 6);

        let mut config = config();
        config.code_length = 12;
        assert_eq!(config.effective_code_length(), 8);
    }

    #[test]
    fn code_comparison_requires_exact_match() {
        assert!(codes_match(b"123456", b"123456"));
        assert!(!codes_match(b"123457", b"123456"));
        assert!(!codes_match(b"12345", b"123456"));
        assert!(!codes_match(b"", b"123456"));
    }
}
