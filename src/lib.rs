pub mod player;

pub use player::{
    ApiClient, PlaybackState, PlayerHandle, SurfaceKind, SyncConfig, SyncedPlaybackController, spawn_player_thread,
};

/// Installs the global logger. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}
