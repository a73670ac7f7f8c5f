use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use authx_core::Principal;

use crate::claims::{Claims, TOKEN_TYPE_REFRESH};
use crate::config::{SigningMode, TokenConfig, TokenConfigError};

/// An access/refresh pair, immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Result of a successful rotation: a fresh pair plus the principal the
/// surrendered refresh token described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatedTokens {
    pub tokens: TokenPair,
    pub principal: Principal,
}

/// Issuance-path failure. Verification failures never surface here; they
/// collapse into `None` on the verify/rotate paths.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Signs, verifies, and rotates access/refresh tokens bound to a principal.
///
/// Stateless beyond read-only key material; safe to share across threads.
pub struct TokenService {
    issuer: String,
    audience: String,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Build a service over the configured signing mode.
    ///
    /// Fails fast when the selected mode lacks usable key material; all
    /// later failures on the verification paths are soft.
    pub fn new(config: TokenConfig) -> Result<Self, TokenConfigError> {
        let (algorithm, encoding_key, decoding_key) = match &config.signing {
            SigningMode::HmacSecret(secret) => {
                if secret.is_empty() {
                    return Err(TokenConfigError::MissingKeyMaterial);
                }
                (
                    Algorithm::HS256,
                    EncodingKey::from_secret(secret.as_bytes()),
                    DecodingKey::from_secret(secret.as_bytes()),
                )
            }
            SigningMode::KeyPair {
                private_key_pem,
                public_key_pem,
            } => {
                if private_key_pem.is_empty() || public_key_pem.is_empty() {
                    return Err(TokenConfigError::MissingKeyMaterial);
                }
                let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
                    .map_err(|e| TokenConfigError::InvalidKeyMaterial(e.to_string()))?;
                let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
                    .map_err(|e| TokenConfigError::InvalidKeyMaterial(e.to_string()))?;
                (Algorithm::RS256, encoding_key, decoding_key)
            }
        };

        // One decode validates signature, algorithm, issuer, audience, and
        // expiry together. Zero leeway: `exp` must be in the future.
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.leeway = 0;

        Ok(Self {
            issuer: config.issuer,
            audience: config.audience,
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
            algorithm,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Issue a short-lived access token for a principal.
    pub fn sign_access(&self, principal: &Principal) -> Result<String, TokenError> {
        let claims = self.claims_for(principal, self.access_ttl_secs, false);
        self.sign(&claims)
    }

    /// Issue a refresh token: longer-lived, carries a unique nonce and the
    /// `typ=refresh` marker that separates it from access tokens.
    pub fn sign_refresh(&self, principal: &Principal) -> Result<String, TokenError> {
        let claims = self.claims_for(principal, self.refresh_ttl_secs, true);
        self.sign(&claims)
    }

    /// Issue a fresh access+refresh pair.
    pub fn issue_pair(&self, principal: &Principal) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign_access(principal)?,
            refresh_token: self.sign_refresh(principal)?,
            expires_in: self.access_ttl_secs,
        })
    }

    /// Verify an access token and derive its principal.
    ///
    /// Any failure (signature, issuer, audience, expiry, refresh token
    /// presented as access) yields `None` with no further detail: the cause
    /// is logged, never returned.
    pub fn verify_access(&self, token: &str) -> Option<Principal> {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "access token rejected");
                return None;
            }
        };

        if data.claims.is_refresh() {
            tracing::debug!("refresh token presented as access credential");
            return None;
        }

        Some(data.claims.to_principal())
    }

    /// Rotate a refresh token into a fresh access+refresh pair.
    ///
    /// The surrendered token must verify AND carry `typ=refresh`: an access
    /// token presented here is rejected even though it verifies structurally.
    /// Verification failures collapse to `Ok(None)`; signing failures on the
    /// re-issue path propagate.
    pub fn rotate(&self, refresh_token: &str) -> Result<Option<RotatedTokens>, TokenError> {
        let data = match decode::<Claims>(refresh_token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "refresh token rejected");
                return Ok(None);
            }
        };

        if !data.claims.is_refresh() {
            tracing::debug!("non-refresh token presented for rotation");
            return Ok(None);
        }

        let principal = data.claims.to_principal();
        let tokens = self.issue_pair(&principal)?;

        Ok(Some(RotatedTokens { tokens, principal }))
    }

    fn claims_for(&self, principal: &Principal, ttl_secs: u64, refresh: bool) -> Claims {
        let now = Utc::now();
        Claims {
            sub: principal.subject_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
            email: principal.email.clone(),
            roles: principal.roles.clone(),
            perms: principal.permissions.clone(),
            sid: principal.session_id,
            typ: refresh.then(|| TOKEN_TYPE_REFRESH.to_string()),
            jti: refresh.then(Uuid::now_v7),
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
