/// OTP issuance/verification configuration.
///
/// Consumed, not owned: values come from whatever configuration layer the
/// embedding application uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpConfig {
    /// Key prefix isolating this deployment's entries in a shared store.
    pub namespace: String,
    /// Requested code length in digits. Clamped to 4..=8 at generation time.
    pub code_length: usize,
    /// Ticket and code lifetime, seconds.
    pub ttl_secs: u64,
    /// Verification attempts permitted before a ticket is exhausted.
    pub max_attempts: u32,
    /// Minimum gap between issuances for the same subject, seconds.
    pub cooldown_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            namespace: "authx".to_string(),
            code_length: 6,
            ttl_secs: 300,
            max_attempts: 5,
            cooldown_secs: 60,
        }
    }
}

impl OtpConfig {
    /// Code length actually used for generation.
    pub fn effective_code_length(&self) -> usize {
        self.code_length.clamp(4, 8)
    }
}
