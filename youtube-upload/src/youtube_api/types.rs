//! Shared types and pagination infrastructure for the YouTube API client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tokio_stream::Stream;

/// One page of a paginated list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in the order the API returned them.
    pub items: Vec<T>,
    /// Continuation token for the following page; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Lazily walks a paginated list endpoint one page at a time.
///
/// `fetch` is called with `None` for the first page and with the previous page's continuation
/// token afterwards. The sequence ends after the first page without a token, or right after
/// yielding an error. Nothing is requested until the stream is polled, and the next page is
/// only requested once the consumer asks for it, so dropping the stream early stops the walk.
/// Calling `paged` again with the same fetcher restarts from the first page.
pub fn paged<'a, T, F, Fut>(fetch: F) -> impl Stream<Item = eyre::Result<Page<T>>> + 'a
where
    T: 'a,
    F: Fn(Option<String>) -> Fut + 'a,
    Fut: Future<Output = eyre::Result<Page<T>>> + 'a,
{
    async_stream::stream! {
        let mut page_token = None;
        loop {
            let page = match fetch(page_token.take()).await {
                Ok(page) => page,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let next_page_token = page.next_page_token.clone();
            yield Ok(page);
            match next_page_token {
                Some(token) => page_token = Some(token),
                None => return,
            }
        }
    }
}

/// Privacy status of an uploaded video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#status.privacyStatus>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    /// Anyone can find and watch the video.
    Public,
    /// Only the owner and explicitly shared users can watch the video.
    #[default]
    Private,
    /// Anyone with the link can watch the video, but it is not listed.
    Unlisted,
}

impl Visibility {
    /// Normalizes a raw `--status` value. Anything but an exact known literal is private.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            Some("public") => Self::Public,
            Some("unlisted") => Self::Unlisted,
            _ => Self::Private,
        }
    }

    /// The privacy status to give a playlist created on behalf of a video with this visibility.
    ///
    /// Playlists cannot be unlisted here, so unlisted degrades to private.
    pub fn for_playlist(self) -> Self {
        match self {
            Self::Unlisted => Self::Private,
            other => other,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
            Self::Unlisted => write!(f, "unlisted"),
        }
    }
}

/// Paging details for lists of resources.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage", default)]
    pub results_per_page: u32,
}
