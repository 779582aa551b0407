//! Test doubles for exercising the uploader without talking to YouTube.
//!
//! - [`FakeServer`] is a real HTTP server on localhost that records every request it receives
//!   and answers with canned JSON. It sits underneath [`YouTubeClient`] and [`OAuthManager`] to
//!   check what actually goes over the wire.
//! - [`MockYouTube`] implements [`VideoHost`] in memory, for checking which remote operations
//!   the workflow performs and in what order.
//!
//! [`YouTubeClient`]: crate::youtube_api::YouTubeClient
//! [`OAuthManager`]: crate::oauth::OAuthManager

use crate::upload::VideoHost;
use crate::youtube_api::{
    ApiError, Page, Playlist, PlaylistInsertRequest, PlaylistItem, PlaylistItemInsertRequest,
    PlaylistSnippet, PlaylistStatus, Video, VideoInsertRequest, paged,
};
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Method};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, body};
use hyper_util::rt::TokioIo;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_stream::Stream;

/// Writes `contents` to a fresh file under the system temp directory and returns its path.
pub(crate) fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "youtube-upload-test-{}-{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).expect("create scratch directory");
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write scratch file");
    path
}

/// One request as seen by [`FakeServer`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl RecordedRequest {
    fn new(parts: http::request::Parts, body: Bytes) -> Self {
        let query = reqwest::Url::parse(&format!("http://fake{}", parts.uri))
            .map(|url| url.query_pairs().into_owned().collect())
            .unwrap_or_default();
        Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query,
            headers: parts.headers,
            body,
        }
    }

    /// The decoded value of the first query parameter called `name`.
    pub(crate) fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub(crate) fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION.as_str())
    }

    pub(crate) fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

type Handler = dyn Fn(&RecordedRequest) -> (u16, serde_json::Value) + Send + Sync;

/// A localhost HTTP server answering every request through a single handler.
///
/// The server stops when dropped.
#[derive(Debug)]
pub(crate) struct FakeServer {
    url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    accept_loop: tokio::task::JoinHandle<()>,
}

impl FakeServer {
    /// Starts listening on an ephemeral port; `handler` picks the status and JSON body.
    pub(crate) async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, serde_json::Value) + Send + Sync + 'static,
    {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to localhost");
        let addr = listener.local_addr().expect("get local address");
        let handler: Arc<Handler> = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let accept_loop = tokio::spawn({
            let requests = Arc::clone(&requests);
            async move {
                while let Ok((conn, _)) = listener.accept().await {
                    let conn = TokioIo::new(conn);
                    let handler = Arc::clone(&handler);
                    let requests = Arc::clone(&requests);
                    let service = service_fn(move |req: Request<body::Incoming>| {
                        let handler = Arc::clone(&handler);
                        let requests = Arc::clone(&requests);
                        async move {
                            let (parts, body) = req.into_parts();
                            let body = body.collect().await?.to_bytes();
                            let recorded = RecordedRequest::new(parts, body);
                            let (status, json) = handler(&recorded);
                            requests.lock().unwrap().push(recorded);
                            let response = Response::builder()
                                .status(status)
                                .header(CONTENT_TYPE, "application/json")
                                .body(Full::new(Bytes::from(json.to_string())))
                                .expect("valid response");
                            Ok::<_, hyper::Error>(response)
                        }
                    });
                    tokio::spawn(async move {
                        if let Err(e) = http1::Builder::new().serve_connection(conn, service).await
                        {
                            tracing::debug!("fake server connection failed: {e}");
                        }
                    });
                }
            }
        });

        Self {
            url: format!("http://{addr}"),
            requests,
            accept_loop,
        }
    }

    /// Base URL of the server, without a trailing slash.
    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    /// Every request received so far, in arrival order.
    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.accept_loop.abort();
    }
}

/// A remote operation performed against [`MockYouTube`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    InsertVideo {
        metadata: VideoInsertRequest,
        media: PathBuf,
    },
    ListPlaylists {
        page_token: Option<String>,
    },
    InsertPlaylist(PlaylistInsertRequest),
    InsertPlaylistItem(PlaylistItemInsertRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    InsertVideo,
    ListPlaylists,
    InsertPlaylist,
    InsertPlaylistItem,
}

impl Call {
    pub(crate) fn kind(&self) -> CallKind {
        match self {
            Self::InsertVideo { .. } => CallKind::InsertVideo,
            Self::ListPlaylists { .. } => CallKind::ListPlaylists,
            Self::InsertPlaylist(_) => CallKind::InsertPlaylist,
            Self::InsertPlaylistItem(_) => CallKind::InsertPlaylistItem,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    /// The channel's playlists in listing order; created ones are appended.
    playlists: Vec<Playlist>,
    items: Vec<PlaylistItem>,
    calls: Vec<Call>,
    /// `(kind, n, error)`: the `n`th call (zero-based) of `kind` fails with `error`.
    failures: Vec<(CallKind, usize, ApiError)>,
}

/// An in-memory channel that records every operation performed on it.
///
/// Uploaded videos get ids `video-1`, `video-2`, ... Playlists seeded through
/// [`MockYouTube::with_playlists`] get ids `PL0`, `PL1`, ... and created ones `PLnew1`,
/// `PLnew2`, ... Listings are paged by offset with tokens of the form `offset-N`.
#[derive(Debug)]
pub(crate) struct MockYouTube {
    page_size: usize,
    state: Mutex<State>,
}

impl MockYouTube {
    pub(crate) fn new() -> Self {
        Self {
            page_size: 50,
            state: Mutex::new(State::default()),
        }
    }

    pub(crate) fn with_playlists(titles: &[&str]) -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().playlists = titles
            .iter()
            .enumerate()
            .map(|(i, title)| playlist(format!("PL{i}"), title))
            .collect();
        mock
    }

    pub(crate) fn with_page_size(mut self, page_size: usize) -> Self {
        assert!(page_size > 0);
        self.page_size = page_size;
        self
    }

    /// Makes the `nth` (zero-based) call of `kind` fail with `error`.
    pub(crate) fn fail(self, kind: CallKind, nth: usize, error: ApiError) -> Self {
        self.state.lock().unwrap().failures.push((kind, nth, error));
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn count(&self, kind: CallKind) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.iter().filter(|c| c.kind() == kind).count()
    }

    /// Every playlist entry created so far.
    pub(crate) fn items(&self) -> Vec<PlaylistItem> {
        self.state.lock().unwrap().items.clone()
    }

    /// Id of the first playlist titled exactly `title`.
    pub(crate) fn playlist_id(&self, title: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .playlists
            .iter()
            .find(|p| p.snippet.title == title)
            .map(|p| p.id.clone())
    }

    /// Logs `call` and returns how many calls of its kind came before it, or the injected error.
    fn record(&self, call: Call) -> eyre::Result<usize> {
        let mut state = self.state.lock().unwrap();
        let kind = call.kind();
        let nth = state.calls.iter().filter(|c| c.kind() == kind).count();
        state.calls.push(call);
        if let Some((_, _, error)) = state
            .failures
            .iter()
            .find(|(k, n, _)| *k == kind && *n == nth)
        {
            return Err(error.clone().into());
        }
        Ok(nth)
    }

    fn list_page(&self, page_token: Option<String>) -> eyre::Result<Page<Playlist>> {
        self.record(Call::ListPlaylists {
            page_token: page_token.clone(),
        })?;
        let start = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("offset-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| eyre::eyre!("bad page token {token:?}"))?,
        };
        let state = self.state.lock().unwrap();
        let end = (start + self.page_size).min(state.playlists.len());
        Ok(Page {
            items: state.playlists[start.min(end)..end].to_vec(),
            next_page_token: (end < state.playlists.len()).then(|| format!("offset-{end}")),
        })
    }
}

fn playlist(id: String, title: &str) -> Playlist {
    Playlist {
        id,
        snippet: PlaylistSnippet {
            title: title.to_string(),
            description: None,
            published_at: None,
        },
        status: None,
    }
}

impl VideoHost for MockYouTube {
    async fn insert_video(
        &self,
        metadata: &VideoInsertRequest,
        media: &Path,
    ) -> eyre::Result<Video> {
        let nth = self.record(Call::InsertVideo {
            metadata: metadata.clone(),
            media: media.to_path_buf(),
        })?;
        Ok(Video {
            id: format!("video-{}", nth + 1),
            snippet: Some(metadata.snippet.clone()),
            status: Some(metadata.status.clone()),
        })
    }

    fn list_my_playlists(&self) -> impl Stream<Item = eyre::Result<Page<Playlist>>> + '_ {
        paged(move |page_token| {
            let page = self.list_page(page_token);
            async move { page }
        })
    }

    async fn insert_playlist(&self, request: &PlaylistInsertRequest) -> eyre::Result<Playlist> {
        let nth = self.record(Call::InsertPlaylist(request.clone()))?;
        let mut created = playlist(format!("PLnew{}", nth + 1), &request.snippet.title);
        created.status = Some(PlaylistStatus {
            privacy_status: request.status.privacy_status,
        });
        self.state.lock().unwrap().playlists.push(created.clone());
        Ok(created)
    }

    async fn insert_playlist_item(
        &self,
        request: &PlaylistItemInsertRequest,
    ) -> eyre::Result<PlaylistItem> {
        let nth = self.record(Call::InsertPlaylistItem(request.clone()))?;
        let item = PlaylistItem {
            id: format!("item-{}", nth + 1),
            snippet: request.snippet.clone(),
        };
        self.state.lock().unwrap().items.push(item.clone());
        Ok(item)
    }
}
