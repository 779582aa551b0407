//! Core YouTube API client functionality and authentication management.

use crate::oauth::OAuthManager;
use crate::youtube_api::{
    error::ApiError,
    playlist_items::{PlaylistItem, PlaylistItemInsertRequest},
    playlists::{Playlist, PlaylistInsertRequest, PlaylistListResponse},
    types::{Page, paged},
    videos::{MultipartRelated, Video, VideoInsertRequest},
};
use eyre::Context;
use http::Method;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use oauth2::basic::BasicTokenResponse;
use oauth2::{CsrfToken, TokenResponse};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio_stream::Stream;
use tracing::instrument;

/// Root that both the Data API and the media upload endpoints hang off.
pub const API_BASE: &str = "https://www.googleapis.com";

/// The largest page size `playlists.list` accepts.
const PLAYLIST_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone)]
pub struct TimeBoundAccessToken {
    token: BasicTokenResponse,
    /// When the current access token expires (with safety buffer)
    expires_at: SystemTime,
}

impl TimeBoundAccessToken {
    /// Wraps a token that is already expired, forcing a refresh before first use.
    ///
    /// This is how tokens loaded from storage start out, since only their refresh token is
    /// known to be meaningful.
    pub fn expired(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: SystemTime::UNIX_EPOCH,
            token,
        }
    }

    /// Wraps a freshly issued token, computing its expiry from `expires_in`.
    pub fn new(token: BasicTokenResponse) -> Self {
        Self {
            expires_at: Self::calculate_token_expiry(&token),
            token,
        }
    }

    /// Refreshes this token using the provided OAuth manager, preserving the refresh token.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Token was successfully refreshed
    /// * `Ok(false)` - Refresh failed (invalid grant, no refresh token, etc.)
    /// * `Err(_)` - Network or other error occurred
    pub async fn refresh(&mut self, oauth_manager: &OAuthManager) -> eyre::Result<bool> {
        tracing::trace!("refreshing token");
        match oauth_manager
            .refresh_token(self.token.clone())
            .await
            .context("refresh OAuth token")?
        {
            Some(new_token) => {
                let old_token = std::mem::replace(&mut self.token, new_token);

                // Google usually omits the refresh token from refresh responses.
                if self.token.refresh_token().is_none() {
                    tracing::trace!("new token lacks refresh token, preserving original");
                    self.token
                        .set_refresh_token(old_token.refresh_token().cloned());
                }

                self.expires_at = Self::calculate_token_expiry(&self.token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Uses the current time + expires_in duration - 5 minute safety buffer.
    /// If no expires_in is provided, assumes a conservative 55-minute lifetime.
    fn calculate_token_expiry(token: &BasicTokenResponse) -> SystemTime {
        let now = SystemTime::now();
        if let Some(expires_in) = token.expires_in() {
            (now + expires_in)
                .checked_sub(Duration::from_secs(300))
                .unwrap_or(now)
        } else {
            now + Duration::from_secs(3300)
        }
    }
}

/// Client for the parts of the YouTube Data API v3 needed to publish a video.
///
/// The client is constructed once per process and passed to whatever needs it. It refreshes
/// its access token on demand before each call using the stored refresh token, so building a
/// client never touches the network and never fails on bad credentials; the first API call
/// does.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    token: Arc<Mutex<TimeBoundAccessToken>>,
    oauth_manager: Arc<OAuthManager>,
    client: reqwest::Client,
    api_base: String,
}

impl YouTubeClient {
    /// Creates a new YouTube API client talking to [`API_BASE`].
    pub fn new(
        token: TimeBoundAccessToken,
        oauth_manager: Arc<OAuthManager>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            token: Arc::new(Mutex::new(token)),
            oauth_manager,
            client,
            api_base: API_BASE.to_string(),
        }
    }

    /// Sends all API calls to `api_base` instead of [`API_BASE`].
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Gets a guaranteed-fresh access token, refreshing if necessary.
    ///
    /// Any failure to obtain one is reported as an `authError` [`ApiError`].
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub(crate) async fn fresh_access_token(&self) -> eyre::Result<String> {
        let mut token = self.token.lock().await;

        if SystemTime::now() >= token.expires_at {
            tracing::debug!("access token expired, attempting refresh");

            match token.refresh(&self.oauth_manager).await {
                Ok(true) => tracing::debug!("access token successfully refreshed"),
                Ok(false) => {
                    tracing::error!("access token refresh failed, client is unusable");
                    return Err(ApiError::unauthorized("unable to refresh expired access token")
                        .into());
                }
                Err(e) => {
                    tracing::error!("access token refresh errored: {e:#}");
                    return Err(eyre::Report::new(ApiError::unauthorized(format!("{e:#}")))
                        .wrap_err("obtain access token"));
                }
            }
        }

        Ok(token.token.access_token().secret().to_string())
    }

    /// Makes an authenticated JSON request to the YouTube API.
    ///
    /// Handles token freshness, the authorization header, query parameters, an optional JSON
    /// body, and turns non-success statuses into an [`ApiError`].
    #[instrument(skip(self, json_body), level = tracing::Level::TRACE)]
    pub(crate) async fn make_authenticated_request(
        &self,
        method: Method,
        url: &str,
        query_params: Option<&[(&str, &str)]>,
        json_body: Option<&impl Serialize>,
    ) -> eyre::Result<reqwest::Response> {
        let access_token = self.fresh_access_token().await?;

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", access_token));

        if let Some(params) = query_params {
            request = request.query(params);
        }

        if let Some(body) = json_body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("send {} request to YouTube API: {}", method, url))?;

        ensure_success(&method, url, response).await
    }

    /// Uploads a video file together with its metadata in a single request.
    ///
    /// Uses the `videos.insert` API with `uploadType=multipart`. The file is streamed from disk
    /// as the request body is sent. There is no chunking, resumption, or retry.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube.upload`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/insert>
    #[instrument(skip(self), ret)]
    pub async fn insert_video(
        &self,
        metadata: &VideoInsertRequest,
        media: &Path,
    ) -> eyre::Result<Video> {
        let url = format!("{}/upload/youtube/v3/videos", self.api_base);
        let query_params = [("uploadType", "multipart"), ("part", "snippet,status")];

        let file = tokio::fs::File::open(media)
            .await
            .with_context(|| format!("open video file {}", media.display()))?;
        let media_len = file
            .metadata()
            .await
            .with_context(|| format!("stat video file {}", media.display()))?
            .len();

        // Any unguessable token works as a boundary; the CSRF generator is a handy source.
        let boundary = format!("upload_{}", CsrfToken::new_random().secret());
        let body = MultipartRelated::new(boundary, metadata)?;

        let access_token = self.fresh_access_token().await?;
        let request = self
            .client
            .post(&url)
            .query(&query_params)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .header(CONTENT_TYPE, body.content_type())
            .header(CONTENT_LENGTH, body.content_length(media_len))
            .body(reqwest::Body::wrap_stream(body.into_stream(file)));

        tracing::debug!(bytes = media_len, "uploading video");
        let response = request
            .send()
            .await
            .with_context(|| format!("send upload request to YouTube API: {}", url))?;
        let response = ensure_success(&Method::POST, &url, response).await?;

        let video: Video = response
            .json()
            .await
            .context("parse YouTube videos.insert response as JSON")?;

        tracing::debug!(video_id = video.id, "video uploaded");

        Ok(video)
    }

    /// Returns the authenticated user's playlists as a lazy sequence of pages.
    ///
    /// Uses the `playlists.list` API with `mine=true`. Each page is only requested once the
    /// previous one has been consumed, and the sequence ends at the first page without a
    /// `nextPageToken`.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube.readonly`
    /// * `https://www.googleapis.com/auth/youtube`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlists/list>
    #[instrument(skip(self))]
    pub fn list_my_playlists(
        &self,
    ) -> impl Stream<Item = eyre::Result<Page<Playlist>>> + use<'_> {
        paged(move |page_token| async move {
            let response = self
                .list_playlists_internal(PLAYLIST_PAGE_SIZE, page_token)
                .await?;
            Ok(Page {
                items: response.items,
                next_page_token: response.next_page_token,
            })
        })
    }

    /// Creates a playlist owned by the authenticated user.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlists/insert>
    #[instrument(skip(self), ret)]
    pub async fn insert_playlist(&self, request: &PlaylistInsertRequest) -> eyre::Result<Playlist> {
        let url = format!("{}/youtube/v3/playlists", self.api_base);
        let query_params = [("part", "id,snippet,status")];

        let response = self
            .make_authenticated_request(Method::POST, &url, Some(&query_params), Some(request))
            .await?;

        let playlist: Playlist = response
            .json()
            .await
            .context("parse YouTube playlists.insert response as JSON")?;

        tracing::debug!(
            playlist_id = playlist.id,
            title = playlist.snippet.title,
            "created playlist"
        );

        Ok(playlist)
    }

    /// Adds a resource to a playlist.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
    #[instrument(skip(self), ret)]
    pub async fn insert_playlist_item(
        &self,
        request: &PlaylistItemInsertRequest,
    ) -> eyre::Result<PlaylistItem> {
        let url = format!("{}/youtube/v3/playlistItems", self.api_base);
        let query_params = [("part", "snippet")];

        let response = self
            .make_authenticated_request(Method::POST, &url, Some(&query_params), Some(request))
            .await?;

        let item: PlaylistItem = response
            .json()
            .await
            .context("parse YouTube playlistItems.insert response as JSON")?;

        tracing::debug!(
            item_id = item.id,
            playlist_id = item.snippet.playlist_id,
            "inserted playlist item"
        );

        Ok(item)
    }

    /// Fetches one page of `playlists.list` with `mine=true`.
    async fn list_playlists_internal(
        &self,
        max_results: u32,
        page_token: Option<String>,
    ) -> eyre::Result<PlaylistListResponse> {
        let url = format!("{}/youtube/v3/playlists", self.api_base);

        let max_results_string = max_results.to_string();
        let mut query_params = vec![
            ("part", "id,snippet"),
            ("mine", "true"),
            ("maxResults", max_results_string.as_str()),
        ];

        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let response = self
            .make_authenticated_request(Method::GET, &url, Some(&query_params), None::<&()>)
            .await?;

        let playlists: PlaylistListResponse = response
            .json()
            .await
            .context("parse YouTube playlists API response as JSON")?;

        tracing::debug!(
            total_results = playlists.page_info.total_results,
            returned_items = playlists.items.len(),
            has_next_page = playlists.next_page_token.is_some(),
            "fetched playlists"
        );

        Ok(playlists)
    }
}

/// Passes successful responses through and decodes the error envelope of failed ones.
async fn ensure_success(
    method: &Method,
    url: &str,
    response: reqwest::Response,
) -> eyre::Result<reqwest::Response> {
    let status_code = response.status();
    if status_code.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    let error = ApiError::from_response_body(status_code.as_u16(), &error_text);
    tracing::debug!(%method, url, %error, "YouTube API request failed");

    Err(eyre::Report::new(error).wrap_err(format!(
        "YouTube API {} request failed with status {}",
        method, status_code
    )))
}
