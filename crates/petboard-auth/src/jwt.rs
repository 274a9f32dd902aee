//! JWT token management
//!
//! Two independent token classes are issued: short-lived access tokens and
//! long-lived refresh tokens. Each has its own secret and lifetime, and the
//! token kind is also signed into the claims, so neither can stand in for
//! the other.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use petboard_db::User;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Authorization scheme expected in front of the token
pub const BEARER_SCHEME: &str = "Bearer";

/// Token class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(rename = "sub")]
    pub subject_id: String,
    /// Token class
    pub kind: TokenKind,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Subject as a user ID, if it is one
    pub fn user_id(&self) -> Option<i64> {
        self.subject_id.parse().ok()
    }
}

#[derive(Clone)]
struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKey {
    fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }
}

/// Issues and verifies access and refresh tokens
#[derive(Clone)]
pub struct TokenIssuer {
    access: SigningKey,
    refresh: SigningKey,
    access_ttl_secs: i64,
    validation: Validation,
}

impl TokenIssuer {
    /// Create a token issuer from the startup configuration
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: SigningKey::new(config.access_secret(), config.access_ttl_secs()),
            refresh: SigningKey::new(config.refresh_secret(), config.refresh_ttl_secs()),
            access_ttl_secs: config.access_ttl_secs(),
            validation,
        }
    }

    /// Lifetime of access tokens in seconds
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Issue a short-lived access token for a user
    pub fn issue_access_token(&self, user: &User) -> Result<String, AuthError> {
        self.sign(TokenKind::Access, &user.id.to_string(), Utc::now())
    }

    /// Issue a long-lived refresh token for a user
    pub fn issue_refresh_token(&self, user: &User) -> Result<String, AuthError> {
        self.sign(TokenKind::Refresh, &user.id.to_string(), Utc::now())
    }

    /// Parse an `Authorization` header value and verify its token as `kind`
    pub fn verify_and_decode(
        &self,
        header: Option<&str>,
        kind: TokenKind,
    ) -> Result<Claims, AuthError> {
        let token = parse_bearer(header)?;
        self.decode_token(token, kind)
    }

    /// Verify a bare token as `kind`
    ///
    /// Tampering, expiry and a kind mismatch all surface as
    /// `InvalidSignatureOrExpired`.
    pub fn decode_token(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.key(kind).decoding, &self.validation)
            .map_err(|e| {
                debug!("{} token rejected: {}", kind.as_str(), e);
                AuthError::InvalidSignatureOrExpired
            })?;

        let claims = token_data.claims;

        // exp must be strictly in the future
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::InvalidSignatureOrExpired);
        }
        if claims.kind != kind {
            debug!(
                "Token kind mismatch: expected {}, got {}",
                kind.as_str(),
                claims.kind.as_str()
            );
            return Err(AuthError::InvalidSignatureOrExpired);
        }

        Ok(claims)
    }

    fn key(&self, kind: TokenKind) -> &SigningKey {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn sign(
        &self,
        kind: TokenKind,
        subject_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let key = self.key(kind);
        let expires_at = issued_at.checked_add_signed(key.ttl).ok_or_else(|| {
            AuthError::Configuration(format!("{} token lifetime overflows", kind.as_str()))
        })?;
        let claims = Claims {
            subject_id: subject_id.to_string(),
            kind,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        debug!("Issuing {} token for user: {}", kind.as_str(), subject_id);

        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding).map_err(AuthError::Jwt)
    }
}

/// Extract the token from a `Bearer <token>` header value
///
/// The value must split into exactly two whitespace-separated parts, the
/// first of which is literally `Bearer`.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MalformedHeader)?;
    let mut parts = header.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petboard_db::UserRole;

    fn issuer() -> TokenIssuer {
        let config = AuthConfig::new(
            Some("access-secret".to_string()),
            Some("refresh-secret".to_string()),
            1800,
            5 * 24 * 3600,
        )
        .unwrap();
        TokenIssuer::new(&config)
    }

    fn user(id: i64) -> User {
        User {
            id,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: String::new(),
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn test_access_token_round_trip() {
        let issuer = issuer();
        let token = issuer.issue_access_token(&user(42)).unwrap();

        let claims = issuer
            .verify_and_decode(Some(&bearer(&token)), TokenKind::Access)
            .unwrap();
        assert_eq!(claims.subject_id, "42");
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let issuer = issuer();
        let token = issuer.issue_refresh_token(&user(7)).unwrap();

        let claims = issuer
            .verify_and_decode(Some(&bearer(&token)), TokenKind::Refresh)
            .unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.exp - claims.iat, 5 * 24 * 3600);
    }

    #[test]
    fn test_cross_key_rejection() {
        let issuer = issuer();
        let access = issuer.issue_access_token(&user(1)).unwrap();
        let refresh = issuer.issue_refresh_token(&user(1)).unwrap();

        assert!(matches!(
            issuer.decode_token(&refresh, TokenKind::Access),
            Err(AuthError::InvalidSignatureOrExpired)
        ));
        assert!(matches!(
            issuer.decode_token(&access, TokenKind::Refresh),
            Err(AuthError::InvalidSignatureOrExpired)
        ));
    }

    #[test]
    fn test_key_checked_independently_of_kind_claim() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let forge = |kind: TokenKind, secret: &str| {
            let claims = Claims {
                subject_id: "1".to_string(),
                kind,
                iat: now,
                exp: now + 600,
            };
            encode(
                &Header::new(Algorithm::HS256),
                &claims,
                &EncodingKey::from_secret(secret.as_bytes()),
            )
            .unwrap()
        };

        // Correct kind claim, wrong key
        let access_claims_refresh_key = forge(TokenKind::Access, "refresh-secret");
        assert!(matches!(
            issuer.decode_token(&access_claims_refresh_key, TokenKind::Access),
            Err(AuthError::InvalidSignatureOrExpired)
        ));
        let refresh_claims_access_key = forge(TokenKind::Refresh, "access-secret");
        assert!(matches!(
            issuer.decode_token(&refresh_claims_access_key, TokenKind::Refresh),
            Err(AuthError::InvalidSignatureOrExpired)
        ));

        // Same claims under the right key are accepted
        let access = forge(TokenKind::Access, "access-secret");
        assert!(issuer.decode_token(&access, TokenKind::Access).is_ok());
        let refresh = forge(TokenKind::Refresh, "refresh-secret");
        assert!(issuer.decode_token(&refresh, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn test_issue_near_max_date_is_an_error() {
        let issuer = issuer();
        let result = issuer.sign(TokenKind::Refresh, "1", DateTime::<Utc>::MAX_UTC);

        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let issued_at = Utc::now() - Duration::seconds(1801);
        let token = issuer.sign(TokenKind::Access, "1", issued_at).unwrap();

        assert!(matches!(
            issuer.decode_token(&token, TokenKind::Access),
            Err(AuthError::InvalidSignatureOrExpired)
        ));
    }

    #[test]
    fn test_zero_lifetime_token_rejected() {
        let issuer = issuer();
        let issued_at = Utc::now() - Duration::seconds(1800);
        let token = issuer.sign(TokenKind::Access, "1", issued_at).unwrap();

        assert!(issuer.decode_token(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let issuer = issuer();
        let token = issuer.issue_access_token(&user(1)).unwrap();

        let mut chars: Vec<char> = token.chars().collect();
        let last = chars.len() - 2;
        chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        assert!(issuer.decode_token(&tampered, TokenKind::Access).is_err());
        assert!(issuer.decode_token("invalid-token", TokenKind::Access).is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = TokenIssuer::new(
            &AuthConfig::new(
                Some("other-access".to_string()),
                Some("other-refresh".to_string()),
                1800,
                3600,
            )
            .unwrap(),
        );
        let token = other.issue_access_token(&user(1)).unwrap();

        assert!(issuer().decode_token(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(parse_bearer(Some("Bearer   abc")).unwrap(), "abc");

        for header in [None, Some(""), Some("Bearer "), Some("Token abc"), Some("bearer abc"), Some("Bearer a b"), Some("abc")] {
            assert!(
                matches!(parse_bearer(header), Err(AuthError::MalformedHeader)),
                "header {:?} should be malformed",
                header
            );
        }
    }
}
