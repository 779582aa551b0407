//! Loading of the locally stored OAuth client credentials.
//!
//! The credentials file is produced by whatever tool performed the initial OAuth consent; this
//! crate only ever reads it. None of the fields are checked here: a missing or empty field
//! surfaces later as an authorization failure on the first remote call.

use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the credentials file, relative to the working directory.
pub const DEFAULT_CREDENTIALS_PATH: &str = "tokens.json";

/// OAuth client identity plus the long-lived refresh token used to mint access tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Credentials {
    /// Reads credentials from `path`.
    ///
    /// An absent file yields [`Credentials::default`] (every field unset). A file that exists
    /// but cannot be read or parsed is an error.
    pub async fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("check for credentials file {}", path.display()))?
        {
            tracing::debug!(path = %path.display(), "no credentials file, using empty credentials");
            return Ok(Self::default());
        }

        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read credentials file {}", path.display()))?;
        let credentials: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parse credentials file {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            has_client_id = credentials.client_id.is_some(),
            has_refresh_token = credentials.refresh_token.is_some(),
            "loaded credentials"
        );
        Ok(credentials)
    }
}
