//! The single line printed on stdout at the end of a run.

use crate::args::ValidationError;
use crate::youtube_api::ApiError;
use serde::Serialize;
use std::fmt;

/// Base of the public watch page for an uploaded video.
pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_BASE}{video_id}")
}

/// A failure reported to the user, shaped after the API's own error details.
///
/// Failures that never reached the API (network trouble, unreadable files, and the like) have
/// no status code and the reason `clientError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: Option<u16>,
    pub reason: String,
    pub message: String,
}

impl Diagnostic {
    /// Extracts the API error from anywhere in `report`'s chain, if there is one.
    pub fn from_report(report: &eyre::Report) -> Self {
        match report.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
            Some(api) => Self::from(api),
            None => Self {
                code: None,
                reason: "clientError".to_string(),
                message: format!("{report:#}"),
            },
        }
    }
}

impl From<&ApiError> for Diagnostic {
    fn from(error: &ApiError) -> Self {
        Self {
            code: Some(error.code),
            reason: error.reason.clone(),
            message: error.message.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The video was uploaded. Every playlist step either succeeded or, under
    /// [`PlaylistErrorPolicy::ContinueOnError`], failed and was skipped.
    ///
    /// [`PlaylistErrorPolicy::ContinueOnError`]: crate::upload::PlaylistErrorPolicy::ContinueOnError
    Uploaded { video_id: String },
    /// A remote step failed; nothing after it was attempted.
    Failed(Diagnostic),
    /// The command line was rejected before anything was sent.
    Invalid(Vec<ValidationError>),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploaded { video_id } => f.write_str(&watch_url(video_id)),
            Self::Failed(diagnostic) => diagnostic.fmt(f),
            Self::Invalid(errors) => {
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
        }
    }
}
