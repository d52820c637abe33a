//! Authorization-code flow against the identity provider.

use serde::Deserialize;
use url::Url;

use gatehouse_core::config::federation::FederationConfig;
use gatehouse_core::error::{AppError, ErrorKind};

/// Scopes requested from the provider.
const SCOPES: &str = "openid profile email";

/// Token endpoint response for a successful code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Provider-issued identity token (JWT).
    pub id_token: String,
    /// Provider access token; unused but always present.
    #[serde(default)]
    pub access_token: String,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: u64,
}

/// Client for the provider's OAuth endpoints.
#[derive(Debug, Clone)]
pub struct FederationClient {
    /// HTTP client for the code exchange.
    http: reqwest::Client,
    /// Provider configuration.
    config: FederationConfig,
}

impl FederationClient {
    /// Creates a new federation client.
    pub fn new(config: FederationConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Whether federation login is enabled at all.
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Builds the authorization URL the end user is redirected to,
    /// carrying the caller-supplied opaque state.
    pub fn build_authorization_url(&self, state: &str) -> Result<String, AppError> {
        let mut url = Url::parse(&self.config.authorize_url())
            .map_err(|e| AppError::configuration(format!("Invalid authorize endpoint: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("scope", SCOPES)
            .append_pair("state", state);

        Ok(url.into())
    }

    /// Exchanges an authorization code for provider tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", SCOPES),
        ];

        let response = self
            .http
            .post(self.config.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Identity provider token request failed",
                    e,
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(format!(
                "Identity provider rejected code exchange: {status} {detail}"
            )));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Malformed token response from identity provider",
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_carries_required_params() {
        let client = FederationClient::new(FederationConfig {
            enabled: true,
            tenant_id: "contoso".to_string(),
            client_id: "app-123".to_string(),
            redirect_uri: "https://app.example.com/auth/azure/callback".to_string(),
            ..Default::default()
        });

        let url = client.build_authorization_url("xyzzy").unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().collect();

        assert!(url.starts_with("https://login.microsoftonline.com/contoso/oauth2/v2.0/authorize"));
        assert_eq!(pairs["client_id"], "app-123");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["scope"], "openid profile email");
        assert_eq!(pairs["state"], "xyzzy");
    }
}
