use thiserror::Error;

use crate::player::types::SurfaceKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Playback rejected by the media runtime: {0}")]
    PlayRejected(String),
    #[error("Seek to {position:.2}s failed: {reason}")]
    SeekFailed { position: f64, reason: String },
    #[error("Surface element is no longer attached")]
    Detached,
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("{surface} surface did not become ready after {attempts} attempts")]
    ReadinessTimeout { surface: SurfaceKind, attempts: u32 },
    #[error("Command on {surface} surface failed: {source}")]
    SurfaceCommand {
        surface: SurfaceKind,
        #[source]
        source: SurfaceError,
    },
    #[error("Failed to start player thread: {0}")]
    RuntimeInit(String),
    #[error("Player command send error: {0}")]
    MpscSendError(
        #[from] tokio::sync::mpsc::error::SendError<crate::player::playback::commands::PlayerCommand>,
    ),
    #[error("Player thread dropped the reply channel: {0}")]
    ReplyDropped(#[from] tokio::sync::oneshot::error::RecvError),
    #[error("Failed to resolve media: {0}")]
    Api(#[from] ApiError),
    #[error("Invalid route: {0}")]
    Route(#[from] RouteError),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API_BASE_URL is not set")]
    MissingBaseUrl,
    #[error("HTTP request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{url}' responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("Unexpected response body from '{url}': {reason}")]
    InvalidResponse { url: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObserverError {
    #[error("Visibility observation is not supported in this environment")]
    Unsupported,
    #[error("Visibility observer failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("'{0}' is not a watch route")]
    NotAWatchRoute(String),
    #[error("Invalid playlist index '{0}'")]
    InvalidIndex(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to emit '{event}': {reason}")]
pub struct EmitError {
    pub event: String,
    pub reason: String,
}

// UI bridges usually want plain strings.
impl From<PlaybackError> for String {
    fn from(err: PlaybackError) -> String {
        err.to_string()
    }
}
impl From<ApiError> for String {
    fn from(err: ApiError) -> String {
        err.to_string()
    }
}
impl From<SurfaceError> for String {
    fn from(err: SurfaceError) -> String {
        err.to_string()
    }
}
