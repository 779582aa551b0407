//! YouTube Data API v3 client library.
//!
//! Covers the slice of the API needed to publish a video: uploading the media with its
//! metadata, listing the caller's own playlists, creating playlists, and adding videos to them.
//!
//! # Resources
//!
//! - [`videos::Video`]: the uploaded media, identified by the id that ends up in the watch URL.
//! - [`playlists::Playlist`]: a named collection owned by the channel. Titles are not unique;
//!   lookups take the first exact match in the order the API lists them.
//! - [`playlist_items::PlaylistItem`]: one entry linking a video into a playlist. The same video
//!   can appear in a playlist more than once.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_upload::youtube_api::{TimeBoundAccessToken, YouTubeClient};
//! use youtube_upload::oauth::OAuthManager;
//! use youtube_upload::credentials::Credentials;
//! use std::sync::Arc;
//! use tokio_stream::StreamExt;
//!
//! # async fn example(credentials: Credentials) -> eyre::Result<()> {
//! let oauth_manager = Arc::new(OAuthManager::new(&credentials));
//! let token = TimeBoundAccessToken::expired(OAuthManager::stored_token(&credentials));
//! let client = YouTubeClient::new(token, oauth_manager, reqwest::Client::new());
//!
//! let pages = client.list_my_playlists();
//! let mut pages = std::pin::pin!(pages);
//! while let Some(page) = pages.next().await {
//!     for playlist in page?.items {
//!         println!("{}: {}", playlist.id, playlist.snippet.title);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod playlist_items;
pub mod playlists;
pub mod types;
pub mod videos;

// Re-export main types for convenience
pub use client::{TimeBoundAccessToken, YouTubeClient};
pub use error::ApiError;
pub use types::{Page, PageInfo, Visibility, paged};

pub use playlist_items::{PlaylistItem, PlaylistItemInsertRequest, PlaylistItemSnippet, ResourceId};
pub use playlists::{
    Playlist, PlaylistInsertRequest, PlaylistInsertSnippet, PlaylistSnippet, PlaylistStatus,
};
pub use videos::{Video, VideoInsertRequest, VideoSnippet, VideoStatus};
