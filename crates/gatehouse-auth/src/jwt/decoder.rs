//! Access-token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;

use super::claims::Claims;

/// Validates RS256-signed access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// RSA public key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let decoding_key = DecodingKey::from_rsa_pem(config.jwt_public_key.as_bytes())
            .map_err(|e| AppError::configuration(format!("Invalid JWT public key: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Decodes and validates an access token string.
    ///
    /// Every failure mode (bad signature, expiry, malformed payload)
    /// collapses to the same authentication error; callers never learn
    /// which check failed.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AppError::authentication("Invalid or expired token"))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> JwtDecoder {
        JwtDecoder::new(&AuthConfig {
            jwt_public_key: include_str!("../../testdata/jwt_test_key.pub.pem").to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_malformed_token() {
        assert!(decoder().decode_access_token("garbage").is_err());
    }

    #[test]
    fn test_rejects_unsigned_token() {
        // Header and payload of an alg=none token, no signature.
        let token = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJ4In0.";
        assert!(decoder().decode_access_token(token).is_err());
    }
}
