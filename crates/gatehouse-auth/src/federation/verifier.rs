//! Identity-token verification against the provider's signing keys.

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;

use gatehouse_core::config::federation::FederationConfig;
use gatehouse_core::error::{AppError, ErrorKind};

/// The identity asserted by a verified provider token.
#[derive(Debug, Clone)]
pub struct FederatedIdentity {
    /// Provider-scoped stable subject identifier.
    pub subject: String,
    /// Email address asserted by the provider.
    pub email: String,
    /// Human-readable display name, when the provider supplies one.
    pub display_name: Option<String>,
}

/// Claims carried by a provider identity token.
#[derive(Debug, Deserialize)]
struct ProviderClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Verifies provider-issued identity tokens.
///
/// Signing keys are fetched from the tenant's JWKS endpoint on every
/// verification; federation logins are rare enough that a key cache
/// buys little.
#[derive(Debug, Clone)]
pub struct IdentityVerifier {
    /// HTTP client for the JWKS fetch.
    http: reqwest::Client,
    /// Provider configuration.
    config: FederationConfig,
}

impl IdentityVerifier {
    /// Creates a new identity verifier.
    pub fn new(config: FederationConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Verifies an identity token and extracts the asserted identity.
    ///
    /// Checks signature (RS256, keyed by `kid` against the tenant JWKS),
    /// issuer, audience, and expiry. A token without an email claim is
    /// rejected: an account cannot be provisioned without one.
    pub async fn verify(&self, id_token: &str) -> Result<FederatedIdentity, AppError> {
        let header = decode_header(id_token)
            .map_err(|_| AppError::authentication("Malformed identity token"))?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::authentication("Identity token missing key id"))?;

        let jwks = self.fetch_jwks().await?;
        let jwk = jwks
            .find(&kid)
            .ok_or_else(|| AppError::authentication("Unknown identity token signing key"))?;
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| AppError::external_service(format!("Unusable provider key: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[self.config.client_id.clone()]);

        let token_data = decode::<ProviderClaims>(id_token, &key, &validation)
            .map_err(|_| AppError::authentication("Invalid identity token"))?;

        identity_from_claims(token_data.claims)
    }

    /// Fetches the tenant's current signing keys.
    async fn fetch_jwks(&self) -> Result<JwkSet, AppError> {
        let response = self
            .http
            .get(self.config.jwks_url())
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "JWKS fetch failed", e)
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }

        response.json::<JwkSet>().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Malformed JWKS document", e)
        })
    }
}

/// Extracts the asserted identity from verified claims. The email falls
/// back to `preferred_username` (Azure AD often omits `email`) and is
/// lowercased for matching against the credential store.
fn identity_from_claims(claims: ProviderClaims) -> Result<FederatedIdentity, AppError> {
    let email = claims
        .email
        .or(claims.preferred_username)
        .ok_or_else(|| AppError::validation("Identity token carries no email"))?;

    Ok(FederatedIdentity {
        subject: claims.sub,
        email: email.to_lowercase(),
        display_name: claims.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;

    fn claims(email: Option<&str>, preferred: Option<&str>) -> ProviderClaims {
        ProviderClaims {
            sub: "subject-1".to_string(),
            email: email.map(String::from),
            preferred_username: preferred.map(String::from),
            name: Some("Test User".to_string()),
        }
    }

    #[test]
    fn test_email_claim_preferred_over_username() {
        let identity =
            identity_from_claims(claims(Some("Alice@Example.com"), Some("other@example.com")))
                .unwrap();
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.subject, "subject-1");
    }

    #[test]
    fn test_preferred_username_fallback() {
        let identity = identity_from_claims(claims(None, Some("Bob@Example.com"))).unwrap();
        assert_eq!(identity.email, "bob@example.com");
    }

    #[test]
    fn test_missing_email_rejected() {
        let err = identity_from_claims(claims(None, None)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
