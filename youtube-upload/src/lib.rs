use crate::args::{Args, UploadRequest};
use crate::credentials::Credentials;
use crate::oauth::OAuthManager;
use crate::report::{Diagnostic, Outcome};
use crate::upload::VideoHost;
use crate::youtube_api::{TimeBoundAccessToken, YouTubeClient};
use eyre::Context;
use std::sync::Arc;

pub mod args;
pub mod credentials;
pub mod oauth;
pub mod report;
pub mod upload;
pub mod youtube_api;

#[cfg(test)]
pub(crate) mod mock;

/// Builds the one API client used for the whole run.
///
/// No network traffic happens here. The stored refresh token is exchanged for an access token
/// on the first API call, so bad credentials surface as an `authError` from that call.
pub fn setup_youtube_client(credentials: &Credentials) -> eyre::Result<YouTubeClient> {
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build HTTP client")?;
    let oauth_manager = Arc::new(OAuthManager::new(credentials));
    let token = TimeBoundAccessToken::expired(OAuthManager::stored_token(credentials));
    Ok(YouTubeClient::new(token, oauth_manager, client))
}

/// Validates `args` and, if they hold up, publishes the video through `host`.
///
/// Nothing is sent to `host` unless validation passes. Remote failures are folded into the
/// returned [`Outcome`] rather than returned as errors.
pub async fn run(host: &impl VideoHost, args: &Args) -> Outcome {
    let request = match UploadRequest::from_args(args) {
        Ok(request) => request,
        Err(errors) => {
            tracing::debug!(?errors, "rejected command line");
            return Outcome::Invalid(errors);
        }
    };

    match upload::publish(host, &request, args.playlist_error_policy()).await {
        Ok(video_id) => Outcome::Uploaded { video_id },
        Err(e) => {
            tracing::error!("upload failed: {e:?}");
            Outcome::Failed(Diagnostic::from_report(&e))
        }
    }
}
