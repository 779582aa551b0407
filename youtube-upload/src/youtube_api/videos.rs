//! YouTube Videos API types and the media upload body.

use crate::youtube_api::types::Visibility;
use bytes::{Bytes, BytesMut};
use eyre::Context;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio_stream::Stream;

/// Size of each chunk read from disk while streaming the media part.
const CHUNK_SIZE: usize = 64 * 1024;

/// A `video` resource represents a YouTube video.
///
/// Only the parts requested on insert (`snippet` and `status`) are modelled.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,
    /// Basic details about the video, such as its title and description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<VideoSnippet>,
    /// Upload, processing and privacy status of the video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,
}

/// The snippet object contains basic details about the video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#snippet>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSnippet {
    /// The video's title.
    pub title: String,
    /// The video's description.
    #[serde(default)]
    pub description: String,
}

/// The status object contains the video's privacy and audience settings.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#status>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    /// The video's privacy status.
    pub privacy_status: Visibility,
    /// Whether the video is designated as child-directed.
    #[serde(default)]
    pub made_for_kids: bool,
}

/// Metadata sent alongside the media in a `videos.insert` call.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos/insert>
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoInsertRequest {
    pub snippet: VideoSnippet,
    pub status: VideoStatus,
}

/// A `multipart/related` request body: one JSON metadata part followed by the media part.
///
/// This is the single-request flavour of the upload protocol. The media is streamed from disk
/// rather than buffered, but it is still one logical request with no resumption.
///
/// See: <https://developers.google.com/youtube/v3/guides/using_resumable_upload_protocol>
#[derive(Debug, Clone)]
pub struct MultipartRelated {
    boundary: String,
    head: Bytes,
    tail: Bytes,
}

impl MultipartRelated {
    /// Lays out everything around the media bytes for the given metadata.
    pub fn new(boundary: impl Into<String>, metadata: &impl Serialize) -> eyre::Result<Self> {
        let boundary = boundary.into();
        let metadata = serde_json::to_string(metadata).context("serialize upload metadata")?;

        let head = format!(
            "--{boundary}\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {metadata}\r\n\
             --{boundary}\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        );
        let tail = format!("\r\n--{boundary}--\r\n");

        Ok(Self {
            boundary,
            head: Bytes::from(head),
            tail: Bytes::from(tail),
        })
    }

    /// The value of the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }

    /// Total body length for a media part of `media_len` bytes.
    pub fn content_length(&self, media_len: u64) -> u64 {
        self.head.len() as u64 + media_len + self.tail.len() as u64
    }

    /// Turns the layout into a body stream that reads `media` chunk by chunk.
    pub fn into_stream(
        self,
        mut media: tokio::fs::File,
    ) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
        async_stream::stream! {
            yield Ok(self.head);
            let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
            loop {
                buf.reserve(CHUNK_SIZE);
                match media.read_buf(&mut buf).await {
                    Ok(0) => break,
                    Ok(_) => yield Ok(buf.split().freeze()),
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
            yield Ok(self.tail);
        }
    }
}
