//! OAuth 2.0 token refresh for YouTube API access.
//!
//! Only the refresh-token grant is supported. Obtaining the refresh token in the first place
//! (the interactive consent flow) is left to other tooling; its output is what
//! [`crate::credentials::Credentials`] reads.

use crate::credentials::Credentials;
use eyre::Context;
use oauth2::basic::{BasicClient, BasicTokenResponse, BasicTokenType};
use oauth2::{
    AccessToken, ClientId, ClientSecret, EmptyExtraTokenFields, RefreshToken, TokenResponse,
    TokenUrl, reqwest,
};

/// Google OAuth2 token endpoint URL used for token refresh.
pub const TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v3/token";

/// Exchanges refresh tokens for access tokens on behalf of one OAuth client.
#[derive(Debug, Clone)]
pub struct OAuthManager {
    client_id: String,
    client_secret: String,
    token_url: String,
}

impl OAuthManager {
    /// Creates a manager for the client identified by `credentials`.
    ///
    /// Absent fields are sent as empty strings; the token endpoint will reject them.
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            client_id: credentials.client_id.clone().unwrap_or_default(),
            client_secret: credentials.client_secret.clone().unwrap_or_default(),
            token_url: TOKEN_URL.to_string(),
        }
    }

    /// Points token refresh at a different endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Builds a token that holds only the stored refresh token.
    ///
    /// The access token is empty, so the token must be refreshed before first use.
    pub fn stored_token(credentials: &Credentials) -> BasicTokenResponse {
        let mut token = BasicTokenResponse::new(
            AccessToken::new(String::new()),
            BasicTokenType::Bearer,
            EmptyExtraTokenFields {},
        );
        token.set_refresh_token(credentials.refresh_token.clone().map(RefreshToken::new));
        token
    }

    /// Attempts to refresh an existing OAuth token using its refresh token.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(new_token))` - Refresh succeeded, new token is available
    /// * `Ok(None)` - No refresh token is available, or the grant was rejected as invalid
    /// * `Err(_)` - Network or other error occurred during the refresh attempt
    pub async fn refresh_token(
        &self,
        token: BasicTokenResponse,
    ) -> eyre::Result<Option<BasicTokenResponse>> {
        let Some(refresh_token) = token.refresh_token() else {
            tracing::warn!("no refresh token available, cannot refresh");
            return Ok(None);
        };

        tracing::debug!("attempting to refresh OAuth token");

        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(
                TokenUrl::new(self.token_url.clone()).context("parse token endpoint URL")?,
            );

        let http_client = reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build token refresh HTTP client")?;

        match client
            .exchange_refresh_token(refresh_token)
            .request_async(&http_client)
            .await
        {
            Ok(new_token) => {
                tracing::debug!("successfully refreshed OAuth token");
                Ok(Some(new_token))
            }
            Err(ref e @ oauth2::RequestTokenError::ServerResponse(ref sr))
                if matches!(
                    sr.error(),
                    oauth2::basic::BasicErrorResponseType::InvalidGrant
                ) =>
            {
                tracing::warn!("OAuth refresh token considered invalid grant: {}", e);
                Ok(None)
            }
            Err(e) => Err(e).context("exchange refresh token"),
        }
    }
}
