pub mod api;
pub mod config;
pub mod errors;
mod mini;
pub mod navigation;
pub mod playback;
pub mod surface;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::ApiClient;
pub use config::{ApiConfig, SyncConfig};
pub use errors::{ApiError, PlaybackError, SurfaceError};
pub use navigation::{Navigator, Route};
pub use playback::{EventSink, NoopEventSink, PlayerCommand, PlayerHandle, SyncedPlaybackController, spawn_player_thread};
pub use surface::{Surface, SurfaceListener, VisibilityObserver};
pub use types::{ActiveSurface, PlaybackState, PlaylistContext, SurfaceKind, VideoDescriptor};
