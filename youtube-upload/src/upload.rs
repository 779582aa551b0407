//! The publish workflow: upload one video, then file it into each requested playlist.
//!
//! Every step is a sequential remote call; nothing here runs concurrently. Playlists are
//! processed strictly in the order they were given, each one fully resolved (or created) and
//! attached before the next begins.

use crate::args::UploadRequest;
use crate::youtube_api::{
    Page, Playlist, PlaylistInsertRequest, PlaylistItem, PlaylistItemInsertRequest, Video,
    VideoInsertRequest, VideoSnippet, VideoStatus, Visibility, YouTubeClient,
};
use eyre::Context;
use std::path::Path;
use tokio_stream::{Stream, StreamExt};

/// The remote operations the workflow needs from a video hosting service.
#[allow(async_fn_in_trait)]
pub trait VideoHost {
    /// Uploads `media` with the given metadata and returns the created video.
    async fn insert_video(
        &self,
        metadata: &VideoInsertRequest,
        media: &Path,
    ) -> eyre::Result<Video>;

    /// The caller's own playlists, one page at a time.
    fn list_my_playlists(&self) -> impl Stream<Item = eyre::Result<Page<Playlist>>> + '_;

    async fn insert_playlist(&self, request: &PlaylistInsertRequest) -> eyre::Result<Playlist>;

    async fn insert_playlist_item(
        &self,
        request: &PlaylistItemInsertRequest,
    ) -> eyre::Result<PlaylistItem>;
}

impl VideoHost for YouTubeClient {
    async fn insert_video(
        &self,
        metadata: &VideoInsertRequest,
        media: &Path,
    ) -> eyre::Result<Video> {
        YouTubeClient::insert_video(self, metadata, media).await
    }

    fn list_my_playlists(&self) -> impl Stream<Item = eyre::Result<Page<Playlist>>> + '_ {
        YouTubeClient::list_my_playlists(self)
    }

    async fn insert_playlist(&self, request: &PlaylistInsertRequest) -> eyre::Result<Playlist> {
        YouTubeClient::insert_playlist(self, request).await
    }

    async fn insert_playlist_item(
        &self,
        request: &PlaylistItemInsertRequest,
    ) -> eyre::Result<PlaylistItem> {
        YouTubeClient::insert_playlist_item(self, request).await
    }
}

/// What to do when resolving, creating, or attaching one playlist fails.
///
/// By the time playlists are processed the video already exists remotely, so either way the
/// upload itself is not undone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaylistErrorPolicy {
    /// Stop at the first failing playlist and report that failure as the outcome of the whole
    /// run. Later playlists are never attempted and the watch URL is not reported.
    #[default]
    AbortOnFirstError,
    /// Log the failure and carry on with the next playlist; the run still succeeds.
    ContinueOnError,
}

/// Uploads the video described by `request` and returns its identifier.
pub async fn upload_video(
    host: &impl VideoHost,
    request: &UploadRequest,
) -> eyre::Result<String> {
    let metadata = VideoInsertRequest {
        snippet: VideoSnippet {
            title: request.title.clone(),
            description: request.description.clone(),
        },
        status: VideoStatus {
            privacy_status: request.visibility,
            made_for_kids: request.for_kids,
        },
    };

    let video = host
        .insert_video(&metadata, &request.filepath)
        .await
        .with_context(|| format!("upload {}", request.filepath.display()))?;

    tracing::info!(video_id = video.id, "video uploaded");
    Ok(video.id)
}

/// Finds the caller's playlist whose title is exactly `title`.
///
/// Pages are walked in API order and the first match wins; no further pages are requested
/// once a match is found. Returns `None` only after every page has been seen.
pub async fn find_playlist_by_title(
    host: &impl VideoHost,
    title: &str,
) -> eyre::Result<Option<String>> {
    let pages = host.list_my_playlists();
    let mut pages = std::pin::pin!(pages);
    while let Some(page) = pages.next().await {
        let page = page.context("list playlists")?;
        if let Some(playlist) = page.items.into_iter().find(|p| p.snippet.title == title) {
            tracing::debug!(title, playlist_id = playlist.id, "found existing playlist");
            return Ok(Some(playlist.id));
        }
    }
    tracing::debug!(title, "no playlist with this title");
    Ok(None)
}

/// Creates a playlist titled `title` for a video uploaded with `visibility`.
pub async fn create_playlist(
    host: &impl VideoHost,
    title: &str,
    visibility: Visibility,
) -> eyre::Result<String> {
    let request = PlaylistInsertRequest::new(title, visibility.for_playlist());
    let playlist = host
        .insert_playlist(&request)
        .await
        .with_context(|| format!("create playlist {title:?}"))?;
    tracing::info!(title, playlist_id = playlist.id, "created playlist");
    Ok(playlist.id)
}

/// Links `video_id` into `playlist_id`. Attaching twice yields two entries.
pub async fn attach_to_playlist(
    host: &impl VideoHost,
    video_id: &str,
    playlist_id: &str,
) -> eyre::Result<()> {
    let item = host
        .insert_playlist_item(&PlaylistItemInsertRequest::video(playlist_id, video_id))
        .await
        .with_context(|| format!("add video {video_id} to playlist {playlist_id}"))?;
    tracing::debug!(item_id = item.id, video_id, playlist_id, "attached video");
    Ok(())
}

/// Resolves `title` to a playlist, creating it if needed, and attaches `video_id` to it.
pub async fn add_to_playlist(
    host: &impl VideoHost,
    video_id: &str,
    title: &str,
    visibility: Visibility,
) -> eyre::Result<()> {
    let playlist_id = match find_playlist_by_title(host, title).await? {
        Some(id) => id,
        None => create_playlist(host, title, visibility).await?,
    };
    attach_to_playlist(host, video_id, &playlist_id).await
}

/// Uploads the video and files it into every requested playlist, returning the video id.
pub async fn publish(
    host: &impl VideoHost,
    request: &UploadRequest,
    policy: PlaylistErrorPolicy,
) -> eyre::Result<String> {
    let video_id = upload_video(host, request).await?;

    for title in &request.playlist_names {
        let added = add_to_playlist(host, &video_id, title, request.visibility).await;
        match (added, policy) {
            (Ok(()), _) => {}
            (Err(e), PlaylistErrorPolicy::AbortOnFirstError) => {
                return Err(e.wrap_err(format!("file video {video_id} into playlists")));
            }
            (Err(e), PlaylistErrorPolicy::ContinueOnError) => {
                tracing::warn!(title, video_id, "skipping playlist: {e:#}");
            }
        }
    }

    Ok(video_id)
}
