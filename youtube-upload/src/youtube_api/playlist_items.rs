//! YouTube PlaylistItems API types.

use serde::{Deserialize, Serialize};

/// Resource kind that identifies a video in a playlist item's `resourceId`.
pub const VIDEO_KIND: &str = "youtube#video";

/// A `playlistItem` resource links one video into one playlist.
///
/// The API does not deduplicate: inserting the same video into the same playlist twice
/// creates two items.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// The ID that YouTube uses to uniquely identify the playlist item.
    pub id: String,
    pub snippet: PlaylistItemSnippet,
}

/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#snippet>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    /// The ID of the playlist the item is in.
    pub playlist_id: String,
    /// Identifies the video the item refers to.
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    pub video_id: String,
}

/// Request body for the `playlistItems.insert` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistItemInsertRequest {
    pub snippet: PlaylistItemSnippet,
}

impl PlaylistItemInsertRequest {
    /// Links `video_id` into `playlist_id`.
    pub fn video(playlist_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            snippet: PlaylistItemSnippet {
                playlist_id: playlist_id.into(),
                resource_id: ResourceId {
                    kind: VIDEO_KIND.to_string(),
                    video_id: video_id.into(),
                },
            },
        }
    }
}
