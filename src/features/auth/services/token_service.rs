use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;

/// Claims carried by the bearer tokens issued at login/registration
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates the HS256 bearer tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: config.token_ttl,
        }
    }

    /// Issue a token for an authenticated account
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            role: user.role.to_string(),
            iat: now,
            exp: now + self.token_ttl.as_secs() as i64,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
    }

    /// Validate signature and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Jeton invalide ou expiré".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::shared::test_helpers::create_user_with_role;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "une-clef-de-test-suffisamment-longue-0123".to_string(),
            token_ttl: Duration::from_secs(3600),
        }
    }

    #[test]
    fn issued_tokens_validate_and_carry_the_actor() {
        let service = TokenService::new(&config());
        let user = create_user_with_role(Role::Archiviste);

        let token = service.issue(&user).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, "archiviste");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let service = TokenService::new(&config());
        let user = create_user_with_role(Role::Utilisateur);

        let mut token = service.issue(&user).unwrap();
        // Flip a character in the signature segment
        token.pop();
        token.push('A');

        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let service = TokenService::new(&config());
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "une-autre-clef-tout-aussi-longue-456789".to_string(),
            token_ttl: Duration::from_secs(3600),
        });

        let token = other.issue(&create_user_with_role(Role::Admin)).unwrap();
        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let secret = config().jwt_secret;
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 7,
            role: "admin".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let service = TokenService::new(&config());
        assert!(service.validate(&token).is_err());
    }
}
