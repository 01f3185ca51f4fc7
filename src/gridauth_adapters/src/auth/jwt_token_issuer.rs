use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gridauth_core::{
    AuthTokens, Clock, PENDING_SESSION_TTL_SECONDS, PendingSession, SystemClock, TokenError,
    TokenIssuer, User,
};

#[derive(Clone)]
pub struct JwtConfig {
    pub jwt_secret: Secret<String>,
    pub access_ttl_seconds: i64,
    pub remember_me_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

impl JwtConfig {
    pub fn new(jwt_secret: Secret<String>) -> Self {
        Self {
            jwt_secret,
            access_ttl_seconds: 3_600,
            remember_me_ttl_seconds: 2_592_000,
            refresh_ttl_seconds: 2_592_000,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

/// Claims of a pending-2FA session token. `is_2fa_session` is a required
/// field, so a final token (which never carries it) fails to decode here
/// and the two shapes stay mutually unacceptable.
#[derive(Debug, Serialize, Deserialize)]
struct PendingClaims {
    sub: Uuid,
    tenant_id: Uuid,
    is_2fa_session: bool,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: Uuid,
    tenant_id: Uuid,
    role: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    sub: Uuid,
    tenant_id: Uuid,
    token_use: String,
    iat: i64,
    exp: i64,
}

/// HMAC-signed JWT issuer for both token shapes. Issuance timestamps come
/// from the injected clock; expiry on verification is enforced by the
/// signature library against wall time.
#[derive(Clone)]
pub struct JwtTokenIssuer<C = SystemClock>
where
    C: Clock,
{
    config: JwtConfig,
    clock: C,
}

impl JwtTokenIssuer<SystemClock> {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
        }
    }
}

impl<C> JwtTokenIssuer<C>
where
    C: Clock,
{
    pub fn with_clock(config: JwtConfig, clock: C) -> Self {
        Self { config, clock }
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.config.as_bytes()),
        )
        .map_err(|e| TokenError::UnexpectedError(e.to_string()))
    }

    fn pending_validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Pending sessions are short; no leeway on expiry.
        validation.leeway = 0;
        validation
    }
}

impl<C> TokenIssuer for JwtTokenIssuer<C>
where
    C: Clock,
{
    fn issue_pending(&self, user: &User) -> Result<Secret<String>, TokenError> {
        let iat = self.clock.now();
        let exp = iat + Duration::seconds(PENDING_SESSION_TTL_SECONDS);

        let claims = PendingClaims {
            sub: user.id,
            tenant_id: user.tenant_id,
            is_2fa_session: true,
            iat: iat.timestamp(),
            exp: exp.timestamp(),
        };

        Ok(Secret::from(self.sign(&claims)?))
    }

    fn verify_pending(&self, token: &Secret<String>) -> Result<PendingSession, TokenError> {
        // Bad signature, expiry and a missing or false `is_2fa_session`
        // all collapse into the one generic error.
        let claims = decode::<PendingClaims>(
            token.expose_secret(),
            &DecodingKey::from_secret(self.config.as_bytes()),
            &Self::pending_validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| TokenError::InvalidSession)?;

        if !claims.is_2fa_session {
            return Err(TokenError::InvalidSession);
        }

        let issued_at = DateTime::<Utc>::from_timestamp(claims.iat, 0)
            .ok_or(TokenError::InvalidSession)?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or(TokenError::InvalidSession)?;

        Ok(PendingSession {
            user_id: claims.sub,
            tenant_id: claims.tenant_id,
            issued_at,
            expires_at,
        })
    }

    fn issue_final(&self, user: &User, remember_me: bool) -> Result<AuthTokens, TokenError> {
        let iat = self.clock.now();
        let expires_in = if remember_me {
            self.config.remember_me_ttl_seconds
        } else {
            self.config.access_ttl_seconds
        };

        let access = AccessClaims {
            sub: user.id,
            tenant_id: user.tenant_id,
            role: user.role.clone(),
            iat: iat.timestamp(),
            exp: (iat + Duration::seconds(expires_in)).timestamp(),
        };
        let refresh = RefreshClaims {
            sub: user.id,
            tenant_id: user.tenant_id,
            token_use: "refresh".to_string(),
            iat: iat.timestamp(),
            exp: (iat + Duration::seconds(self.config.refresh_ttl_seconds)).timestamp(),
        };

        Ok(AuthTokens {
            token: Secret::from(self.sign(&access)?),
            refresh_token: Secret::from(self.sign(&refresh)?),
            expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridauth_core::Email;

    fn test_config() -> JwtConfig {
        JwtConfig::new(Secret::from("test-jwt-secret".to_string()))
    }

    fn test_user() -> User {
        User::new(
            Uuid::new_v4(),
            Email::parse("test@example.com").unwrap(),
            Secret::from("hash".to_string()),
            "operator",
        )
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn pending_token_round_trips() {
        let issuer = JwtTokenIssuer::new(test_config());
        let user = test_user();

        let token = issuer.issue_pending(&user).unwrap();
        assert_eq!(token.expose_secret().split('.').count(), 3);

        let session = issuer.verify_pending(&token).unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.tenant_id, user.tenant_id);
        assert_eq!(
            (session.expires_at - session.issued_at).num_seconds(),
            PENDING_SESSION_TTL_SECONDS
        );
    }

    #[test]
    fn expired_pending_token_is_rejected() {
        let past = Utc::now() - Duration::hours(1);
        let issuer = JwtTokenIssuer::with_clock(test_config(), FixedClock(past));
        let user = test_user();

        let token = issuer.issue_pending(&user).unwrap();
        assert_eq!(
            issuer.verify_pending(&token).unwrap_err(),
            TokenError::InvalidSession
        );
    }

    #[test]
    fn final_tokens_never_verify_as_pending() {
        let issuer = JwtTokenIssuer::new(test_config());
        let user = test_user();

        let tokens = issuer.issue_final(&user, false).unwrap();
        assert_eq!(
            issuer.verify_pending(&tokens.token).unwrap_err(),
            TokenError::InvalidSession
        );
        assert_eq!(
            issuer.verify_pending(&tokens.refresh_token).unwrap_err(),
            TokenError::InvalidSession
        );
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let issuer = JwtTokenIssuer::new(test_config());
        let other = JwtTokenIssuer::new(JwtConfig::new(Secret::from("other-secret".to_string())));
        let user = test_user();

        let token = other.issue_pending(&user).unwrap();
        assert_eq!(
            issuer.verify_pending(&token).unwrap_err(),
            TokenError::InvalidSession
        );
    }

    #[test]
    fn remember_me_widens_the_final_ttl() {
        let issuer = JwtTokenIssuer::new(test_config());
        let user = test_user();

        let short = issuer.issue_final(&user, false).unwrap();
        let long = issuer.issue_final(&user, true).unwrap();
        assert_eq!(short.expires_in, 3_600);
        assert_eq!(long.expires_in, 2_592_000);
    }

    #[test]
    fn garbage_is_rejected() {
        let issuer = JwtTokenIssuer::new(test_config());
        assert_eq!(
            issuer
                .verify_pending(&Secret::from("not-a-jwt".to_string()))
                .unwrap_err(),
            TokenError::InvalidSession
        );
    }
}
