//! Command-line surface and validation into an [`UploadRequest`].
//!
//! Every upload flag is accepted as an optional string so that validation is done here rather
//! than by clap: all problems are collected and reported together, and unrecognized values for
//! the optional flags silently fall back to their defaults.
//!
//! The command line itself is never rejected. [`normalize_command_line`] rewrites it first, so
//! a flag given without a value reads as empty, values may start with `-`, and unknown flags
//! are ignored.

use crate::credentials::DEFAULT_CREDENTIALS_PATH;
use crate::upload::PlaylistErrorPolicy;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

pub use crate::youtube_api::Visibility;

/// Upload a video to YouTube and optionally add it to playlists
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, args_override_self = true, ignore_errors = true)]
pub struct Args {
    /// Path to the video file to upload (required)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub filepath: Option<String>,

    /// Title of the video (required)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub title: Option<String>,

    /// Description of the video
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub description: Option<String>,

    /// Privacy status: public, private or unlisted (anything else means private)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub status: Option<String>,

    /// Whether the video is made for kids ("yes" to enable)
    #[arg(long = "forKids", num_args = 0..=1, default_missing_value = "")]
    pub for_kids: Option<String>,

    /// Comma-separated playlist names to add the video to, created if missing
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub playlists: Option<String>,

    /// Path to the JSON file holding client_id, client_secret and refresh_token
    #[arg(
        long,
        num_args = 0..=1,
        default_value = DEFAULT_CREDENTIALS_PATH,
        default_missing_value = DEFAULT_CREDENTIALS_PATH
    )]
    pub credentials: PathBuf,

    /// Keep processing the remaining playlists when one of them fails
    #[arg(long)]
    pub keep_going: bool,
}

impl Args {
    /// Parses a raw command line after passing it through [`normalize_command_line`].
    ///
    /// The only errors left are requests for `--help` or `--version`.
    pub fn parse_command_line<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_command_line(argv))
    }

    pub fn playlist_error_policy(&self) -> PlaylistErrorPolicy {
        if self.keep_going {
            PlaylistErrorPolicy::ContinueOnError
        } else {
            PlaylistErrorPolicy::AbortOnFirstError
        }
    }
}

/// Rewrites a raw command line into one that [`Args`] parses without complaint.
///
/// - `--flag value` becomes `--flag=value`, so a value may start with `-`.
/// - A value flag followed by nothing or by another `--` token stays bare and reads as empty.
/// - Unknown flags are dropped together with their value, as are stray words and everything
///   after a `--` separator.
///
/// The first element (the program name) is kept as is.
pub fn normalize_command_line<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut command = Args::command();
    command.build();

    let mut argv = argv.into_iter().map(Into::into).peekable();
    let mut normalized: Vec<OsString> = argv.next().into_iter().collect();

    while let Some(token) = argv.next() {
        let Some(text) = token.to_str() else {
            tracing::debug!(?token, "ignoring stray argument");
            continue;
        };
        if text == "--" {
            break;
        }

        let (arg, inline_value) = if let Some(long) = text.strip_prefix("--") {
            let (name, value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            let arg = command.get_arguments().find(|a| a.get_long() == Some(name));
            (arg, value)
        } else if let Some(short) = text.strip_prefix('-').filter(|s| !s.is_empty()) {
            let mut chars = short.chars();
            let arg = match (chars.next(), chars.next()) {
                (Some(c), None) => command.get_arguments().find(|a| a.get_short() == Some(c)),
                _ => None,
            };
            (arg, None)
        } else {
            tracing::debug!(token = text, "ignoring stray argument");
            continue;
        };

        match arg {
            Some(arg) if arg.get_action().takes_values() => {
                let Some(long) = arg.get_long() else {
                    continue;
                };
                let value = match inline_value {
                    Some(value) => Some(OsString::from(value)),
                    None => argv.next_if(is_flag_value),
                };
                normalized.push(match value {
                    Some(value) => {
                        let mut flag = OsString::from(format!("--{long}="));
                        flag.push(value);
                        flag
                    }
                    None => OsString::from(format!("--{long}")),
                });
            }
            Some(arg) => {
                normalized.push(
                    arg.get_long()
                        .map_or_else(|| token.clone(), |long| format!("--{long}").into()),
                );
            }
            None => {
                let skipped = match inline_value {
                    Some(_) => None,
                    None => argv.next_if(is_flag_value),
                };
                tracing::debug!(flag = text, ?skipped, "ignoring unknown flag");
            }
        }
    }

    normalized
}

/// Whether the token after a flag is that flag's value rather than the next flag.
fn is_flag_value(next: &OsString) -> bool {
    !next.as_encoded_bytes().starts_with(b"--")
}

/// A problem with the command line that prevents any upload from being attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingFilepath,
    FilepathNotFound,
    MissingTitle,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFilepath => write!(f, "Please specify a file path with --filepath"),
            Self::FilepathNotFound => write!(f, "Specified file path does not exist"),
            Self::MissingTitle => write!(f, "Please specify a video title with --title"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A fully validated upload, built before any network activity takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub filepath: PathBuf,
    pub title: String,
    pub description: String,
    pub visibility: Visibility,
    pub for_kids: bool,
    /// Playlists to file the video into, in command-line order.
    pub playlist_names: Vec<String>,
}

impl UploadRequest {
    /// Validates `args`, returning every problem found rather than just the first.
    pub fn from_args(args: &Args) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let filepath = match args.filepath.as_deref() {
            None | Some("") => {
                errors.push(ValidationError::MissingFilepath);
                None
            }
            Some(path) => {
                let path = PathBuf::from(path);
                if path.exists() {
                    Some(path)
                } else {
                    errors.push(ValidationError::FilepathNotFound);
                    None
                }
            }
        };

        let title = match args.title.as_deref() {
            None | Some("") => {
                errors.push(ValidationError::MissingTitle);
                None
            }
            Some(title) => Some(title.to_string()),
        };

        let (Some(filepath), Some(title)) = (filepath, title) else {
            return Err(errors);
        };

        Ok(Self {
            filepath,
            title,
            description: args.description.clone().unwrap_or_default(),
            visibility: Visibility::normalize(args.status.as_deref()),
            for_kids: parse_for_kids(args.for_kids.as_deref()),
            playlist_names: parse_playlists(args.playlists.as_deref()),
        })
    }
}

/// Only the exact literal `yes` means made-for-kids.
pub fn parse_for_kids(raw: Option<&str>) -> bool {
    raw == Some("yes")
}

/// Splits a comma-separated playlist flag, trimming each entry.
///
/// Entries are not filtered, so `"a,,b"` keeps an empty middle name.
pub fn parse_playlists(raw: Option<&str>) -> Vec<String> {
    match raw {
        None | Some("") => Vec::new(),
        Some(raw) => raw.split(',').map(|name| name.trim().to_string()).collect(),
    }
}
