//! External identity providers for OAuth2 sign-in.
//!
//! The callback route only ever deals with the [`IdentityProvider`] trait: hand over the authorization code, get
//! back a verified profile. [`GoogleOauthProvider`] is the production implementation, doing the two-legged dance
//! against Google's token and userinfo endpoints. Endpoint tests substitute a mock.

use log::debug;
use serde::Deserialize;
use sfs_common::Secret;
use storefront_engine::db_types::{ExternalUserInfo, Provider};
use thiserror::Error;

use crate::config::GoogleOauthConfig;

#[derive(Debug, Clone, Error)]
pub enum OauthProviderError {
    #[error("The authorization code could not be exchanged for an access token. {0}")]
    CodeExchangeFailed(String),
    #[error("The provider did not return a usable profile. {0}")]
    InvalidProfile(String),
}

#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Exchanges an authorization code for the profile of the user who granted it.
    async fn fetch_profile(&self, code: &str) -> Result<ExternalUserInfo, OauthProviderError>;
}

#[derive(Debug, Clone, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    name: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOauthProvider {
    client_id: String,
    client_secret: Secret<String>,
    redirect_uri: String,
    token_url: String,
    userinfo_url: String,
    client: reqwest::Client,
}

impl GoogleOauthProvider {
    pub fn new(config: &GoogleOauthConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            token_url: config.token_url.clone(),
            userinfo_url: config.userinfo_url.clone(),
            client: reqwest::Client::new(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OauthProviderError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.reveal().as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];
        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| OauthProviderError::CodeExchangeFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OauthProviderError::CodeExchangeFailed(format!("{status}: {body}")));
        }
        let token = response
            .json::<TokenExchangeResponse>()
            .await
            .map_err(|e| OauthProviderError::CodeExchangeFailed(e.to_string()))?;
        Ok(token.access_token)
    }
}

impl IdentityProvider for GoogleOauthProvider {
    async fn fetch_profile(&self, code: &str) -> Result<ExternalUserInfo, OauthProviderError> {
        let access_token = self.exchange_code(code).await?;
        debug!("🌍️ Authorization code exchanged. Fetching the Google profile.");
        let info = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OauthProviderError::InvalidProfile(e.to_string()))?
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| OauthProviderError::InvalidProfile(e.to_string()))?;
        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| OauthProviderError::InvalidProfile("profile has no email address".to_string()))?;
        Ok(ExternalUserInfo { email, name: info.name, provider: Provider::Google })
    }
}
