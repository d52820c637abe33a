//! Access-token creation with RS256 signing.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Creates signed JWT access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// RSA private key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL in minutes.
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    ///
    /// Fails if the configured private key is not valid RSA PEM.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let encoding_key = EncodingKey::from_rsa_pem(config.jwt_private_key.as_bytes())
            .map_err(|e| AppError::configuration(format!("Invalid JWT private key: {e}")))?;

        Ok(Self {
            encoding_key,
            access_ttl_minutes: config.access_ttl_minutes as i64,
        })
    }

    /// Generates a signed access token for the given account.
    ///
    /// Returns the raw token and its expiry instant.
    pub fn generate_access_token(
        &self,
        account_id: Uuid,
        email: &str,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::minutes(self.access_ttl_minutes);

        let claims = Claims {
            sub: account_id,
            email: email.to_string(),
            token_type: TokenType::Access,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok((token, exp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::decoder::JwtDecoder;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_private_key: include_str!("../../testdata/jwt_test_key.pem").to_string(),
            jwt_public_key: include_str!("../../testdata/jwt_test_key.pub.pem").to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let config = test_config();
        let encoder = JwtEncoder::new(&config).unwrap();
        let decoder = JwtDecoder::new(&config).unwrap();

        let account_id = Uuid::new_v4();
        let (token, exp) = encoder
            .generate_access_token(account_id, "alice@example.com")
            .unwrap();

        let claims = decoder.decode_access_token(&token).unwrap();
        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp, exp.timestamp());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_rejects_garbage_key_material() {
        let config = AuthConfig {
            jwt_private_key: "not a pem".to_string(),
            ..Default::default()
        };
        assert!(JwtEncoder::new(&config).is_err());
    }
}
