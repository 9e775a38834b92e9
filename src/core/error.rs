use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a document into one of the manifest structures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed JSON, wrong root shape, or a missing required key.
    #[error("invalid JSON at `{path}`: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("latest {kind} `{id}` is not listed in versions")]
    DanglingLatest { kind: &'static str, id: String },
}

impl From<serde_path_to_error::Error<serde_json::Error>> for ParseError {
    fn from(value: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = value.path().to_string();
        ParseError::Json {
            path,
            source: value.into_inner(),
        }
    }
}

/// Central error type for the crate.
/// Every IO-facing module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Downloaded document from {0} is empty")]
    EmptyDocument(String),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {url}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        url: String,
        expected: String,
        actual: String,
    },

    // ── Documents ───────────────────────────────────────
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Version {0} is not listed in the manifest index")]
    VersionNotFound(String),

    #[error("Refusing path `{0}` outside the data directory")]
    UnsafePath(String),

    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── Java ────────────────────────────────────────────
    #[error("No compatible Java runtime for major version {0}")]
    RuntimeNotFound(u32),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}
