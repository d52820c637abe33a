//! Identity-provider federation configuration.

use serde::{Deserialize, Serialize};

/// OAuth identity-provider (Azure AD) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Whether federation login is offered at all.
    #[serde(default)]
    pub enabled: bool,
    /// Directory (tenant) identifier.
    #[serde(default)]
    pub tenant_id: String,
    /// Application (client) identifier; also the expected token audience.
    #[serde(default)]
    pub client_id: String,
    /// Client secret for the code exchange.
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URI registered with the provider.
    #[serde(default)]
    pub redirect_uri: String,
    /// Authority base URL; the tenant id is appended to form endpoints.
    #[serde(default = "default_authority")]
    pub authority: String,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            authority: default_authority(),
        }
    }
}

impl FederationConfig {
    /// The expected `iss` claim of provider-issued identity tokens.
    pub fn issuer(&self) -> String {
        format!("{}/{}/v2.0", self.authority, self.tenant_id)
    }

    /// The JWKS endpoint publishing the provider's signing keys.
    pub fn jwks_url(&self) -> String {
        format!("{}/{}/discovery/v2.0/keys", self.authority, self.tenant_id)
    }

    /// The authorization endpoint the end user is redirected to.
    pub fn authorize_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/authorize", self.authority, self.tenant_id)
    }

    /// The token endpoint used for the code exchange.
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority, self.tenant_id)
    }
}

fn default_authority() -> String {
    "https://login.microsoftonline.com".to_string()
}
