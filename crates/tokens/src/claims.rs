use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authx_core::{Permission, Principal, Role, SessionId, SubjectId};

/// `typ` marker distinguishing refresh tokens from access tokens.
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims model.
///
/// `roles`/`perms` default to empty on decode so tokens minted by older
/// issuers without those claims still verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / principal identifier.
    pub sub: SubjectId,

    pub iss: String,
    pub aud: String,

    /// Issued-at, seconds since epoch.
    pub iat: i64,

    /// Expiration, seconds since epoch. Must be strictly in the future at
    /// verification (zero leeway).
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default)]
    pub perms: Vec<Permission>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<SessionId>,

    /// Token type marker; `"refresh"` for refresh tokens, absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Unique nonce; set on refresh tokens so each rotation mints a distinct
    /// credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<Uuid>,
}

impl Claims {
    pub fn is_refresh(&self) -> bool {
        self.typ.as_deref() == Some(TOKEN_TYPE_REFRESH)
    }

    /// Derive the principal these claims describe.
    pub fn to_principal(&self) -> Principal {
        Principal {
            subject_id: self.sub,
            email: self.email.clone(),
            roles: self.roles.clone(),
            permissions: self.perms.clone(),
            session_id: self.sid,
        }
    }
}
