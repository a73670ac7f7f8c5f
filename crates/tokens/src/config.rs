use thiserror::Error;

/// Key material and algorithm selection, fixed at construction.
///
/// Pinning the mode once eliminates algorithm-confusion: the verifier only
/// ever accepts tokens signed under the constructed algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningMode {
    /// Shared-secret HMAC (HS256).
    HmacSecret(String),
    /// RSA key pair (RS256), PEM-encoded.
    KeyPair {
        private_key_pem: String,
        public_key_pem: String,
    },
}

/// Token service configuration.
///
/// Consumed, not owned: issuer/audience/TTLs come from whatever configuration
/// layer the embedding application uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub signing: SigningMode,
}

impl TokenConfig {
    /// Configuration with conventional TTLs (15-minute access, 7-day refresh).
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        signing: SigningMode,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
            signing,
        }
    }

    pub fn with_access_ttl(mut self, secs: u64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    pub fn with_refresh_ttl(mut self, secs: u64) -> Self {
        self.refresh_ttl_secs = secs;
        self
    }
}

/// Construction-time misconfiguration. Fatal, fail-fast: a service is never
/// built over unusable key material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenConfigError {
    #[error("no signing key material configured")]
    MissingKeyMaterial,

    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
}
