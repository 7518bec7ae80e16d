/// Session token validation
///
/// The identity provider signs session tokens (HS256 JWTs) with a shared
/// secret. The planner never logs users in; it only checks that a presented
/// token is authentic, unexpired and meant for this audience, then reads the
/// user id from `sub`.
///
/// # Example
///
/// ```
/// use studioplan_shared::auth::session::{issue_token, validate_token, SessionClaims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let claims = SessionClaims::new(Uuid::new_v4(), None, "authenticated", Duration::hours(1));
/// let token = issue_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret, "authenticated")?;
/// assert_eq!(validated.sub, claims.sub);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience the identity provider puts on signed-in sessions
pub const DEFAULT_AUDIENCE: &str = "authenticated";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Missing session token")]
    Missing,

    #[error("Session has expired")]
    Expired,

    #[error("Invalid session token: {0}")]
    Invalid(String),

    #[error("Failed to sign session token: {0}")]
    Signing(String),
}

/// Claims read from a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub aud: String,

    pub iat: i64,

    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl SessionClaims {
    pub fn new(
        user_id: Uuid,
        email: Option<String>,
        audience: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email,
            aud: audience.into(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            role: Some("authenticated".to_string()),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims; used by tests and local tooling
pub fn issue_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SessionError::Signing(e.to_string()))
}

/// Verifies signature, expiry and audience
pub fn validate_token(
    token: &str,
    secret: &str,
    audience: &str,
) -> Result<SessionClaims, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation.validate_exp = true;
    // Zero leeway keeps expiry checks exact
    validation.leeway = 0;

    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::Invalid(e.to_string()),
        })
}

/// Picks the session token from a request
///
/// A `Bearer` Authorization header wins; otherwise the named cookie is read
/// from the raw `Cookie` header.
pub fn extract_token<'a>(
    authorization: Option<&'a str>,
    cookie_header: Option<&'a str>,
    cookie_name: &str,
) -> Option<&'a str> {
    if let Some(token) = authorization
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        return Some(token);
    }

    cookie_header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_issue_and_validate() {
        let user_id = Uuid::new_v4();
        let claims = SessionClaims::new(
            user_id,
            Some("creator@example.com".into()),
            DEFAULT_AUDIENCE,
            Duration::hours(1),
        );
        let token = issue_token(&claims, SECRET).unwrap();

        let validated = validate_token(&token, SECRET, DEFAULT_AUDIENCE).unwrap();
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.email.as_deref(), Some("creator@example.com"));
    }

    #[test]
    fn test_wrong_secret_or_audience_is_rejected() {
        let claims = SessionClaims::new(Uuid::new_v4(), None, DEFAULT_AUDIENCE, Duration::hours(1));
        let token = issue_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, "another-secret-that-is-32-bytes-long!", DEFAULT_AUDIENCE),
            Err(SessionError::Invalid(_))
        ));
        assert!(matches!(
            validate_token(&token, SECRET, "service_role"),
            Err(SessionError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let claims = SessionClaims::new(
            Uuid::new_v4(),
            None,
            DEFAULT_AUDIENCE,
            Duration::seconds(-3600),
        );
        assert!(claims.is_expired());

        let token = issue_token(&claims, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET, DEFAULT_AUDIENCE),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn test_extract_token_prefers_bearer() {
        assert_eq!(
            extract_token(Some("Bearer abc"), Some("sb-access-token=xyz"), "sb-access-token"),
            Some("abc")
        );
        assert_eq!(
            extract_token(None, Some("theme=dark; sb-access-token=xyz"), "sb-access-token"),
            Some("xyz")
        );
        assert_eq!(extract_token(Some("Basic abc"), None, "sb-access-token"), None);
        assert_eq!(extract_token(None, Some("sb-access-token="), "sb-access-token"), None);
    }
}
