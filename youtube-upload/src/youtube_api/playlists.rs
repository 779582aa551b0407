//! YouTube Playlists API types.

use crate::youtube_api::types::{PageInfo, Visibility};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Response structure for the `playlists.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistListResponse {
    /// Identifies the API resource's type.
    ///
    /// The value will be `youtube#playlistListResponse`.
    #[serde(default)]
    pub kind: String,
    /// A list of playlists that match the request criteria, in the order the API chose.
    #[serde(default)]
    pub items: Vec<Playlist>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    /// Token that can be used as the value of the pageToken parameter to retrieve the next page in the result set.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A `playlist` resource represents a YouTube playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists#resource>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// The ID that YouTube uses to uniquely identify the playlist.
    pub id: String,
    /// Basic details about the playlist, such as its title.
    pub snippet: PlaylistSnippet,
    /// Only present when the `status` part was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlaylistStatus>,
}

/// See: <https://developers.google.com/youtube/v3/docs/playlists#snippet>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSnippet {
    /// The playlist's title. Titles are not unique.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The date and time that the playlist was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
}

/// See: <https://developers.google.com/youtube/v3/docs/playlists#status>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStatus {
    pub privacy_status: Visibility,
}

/// Request body for the `playlists.insert` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists/insert>
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistInsertRequest {
    pub snippet: PlaylistInsertSnippet,
    pub status: PlaylistStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistInsertSnippet {
    pub title: String,
}

impl PlaylistInsertRequest {
    pub fn new(title: impl Into<String>, privacy_status: Visibility) -> Self {
        Self {
            snippet: PlaylistInsertSnippet {
                title: title.into(),
            },
            status: PlaylistStatus { privacy_status },
        }
    }
}
