use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::player::api::ApiClient;
use crate::player::errors::{ApiError, PlaybackError};
use crate::player::navigation::Route;
use crate::player::surface::{Surface, VisibilityObserver};
use crate::player::types::{PlaybackState, PlaylistContext, Point, Size, SurfaceKind, VideoDescriptor};

/// Shared handle to a UI-owned surface, carried through the command channel.
#[derive(Clone)]
pub struct SurfaceHandle(pub Arc<dyn Surface>);

impl fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("ready_state", &self.0.ready_state())
            .finish()
    }
}

pub struct ObserverHandle(pub Box<dyn VisibilityObserver>);

impl fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ObserverHandle")
    }
}

// --- Player Thread Commands ---
#[derive(Debug)]
pub enum PlayerCommand {
    AttachSurface {
        surface: SurfaceKind,
        handle: SurfaceHandle,
    },
    DetachSurface(SurfaceKind),
    LoadVideo {
        video: VideoDescriptor,
        playlist: Option<PlaylistContext>,
        start_index: usize,
    },
    TogglePlay,
    Play,
    Pause,
    Seek {
        position_seconds: f64,
    },
    SetVolume {
        level: f64,
    },
    ToggleMute,
    SetPlaybackSpeed {
        rate: f64,
    },
    ActivateMiniPlayer,
    DeactivateMiniPlayer,
    CloseMiniPlayer,
    ReturnToMainPlayer,
    HandleVideoEnd,
    RegisterMainSurfaceElement(ObserverHandle),
    UnregisterMainSurfaceElement,
    MainSurfaceVisibility(bool),
    RouteChanged(Route),
    SetViewportSize(Size),
    BeginMiniDrag(Point),
    DragMiniTo(Point),
    BeginMiniResize(Point),
    ResizeMiniTo(Point),
    EndMiniGesture,
    GetPlaybackState(oneshot::Sender<PlaybackState>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable front door to the player thread.
#[derive(Clone)]
pub struct PlayerHandle {
    command_sender: mpsc::Sender<PlayerCommand>,
    api: Option<Arc<ApiClient>>,
}

impl fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("closed", &self.command_sender.is_closed())
            .field("api", &self.api.is_some())
            .finish()
    }
}

impl PlayerHandle {
    pub fn new(sender: mpsc::Sender<PlayerCommand>, api: Option<ApiClient>) -> Self {
        PlayerHandle {
            command_sender: sender,
            api: api.map(Arc::new),
        }
    }

    pub fn get_command_sender(&self) -> mpsc::Sender<PlayerCommand> {
        self.command_sender.clone()
    }

    async fn send(&self, command: PlayerCommand) -> Result<(), PlaybackError> {
        self.command_sender.send(command).await.map_err(|e| {
            log::error!("Failed to send player command: {}", e);
            PlaybackError::from(e)
        })
    }

    pub async fn attach_surface(&self, surface: SurfaceKind, handle: Arc<dyn Surface>) -> Result<(), PlaybackError> {
        log::info!("CMD: Attach {} surface", surface);
        self.send(PlayerCommand::AttachSurface {
            surface,
            handle: SurfaceHandle(handle),
        })
        .await
    }

    pub async fn detach_surface(&self, surface: SurfaceKind) -> Result<(), PlaybackError> {
        log::info!("CMD: Detach {} surface", surface);
        self.send(PlayerCommand::DetachSurface(surface)).await
    }

    pub async fn load_video(
        &self,
        video: VideoDescriptor,
        playlist: Option<PlaylistContext>,
        start_index: usize,
    ) -> Result<(), PlaybackError> {
        log::info!(
            "CMD: Load video '{}'. Playlist: {:?}, start index: {}",
            video.id,
            playlist.as_ref().map(|p| p.playlist_id.as_str()),
            start_index
        );
        self.send(PlayerCommand::LoadVideo {
            video,
            playlist,
            start_index,
        })
        .await
    }

    /// Resolves a video (and optionally its playlist) through the API, then loads it.
    pub async fn open_video(&self, video_id: &str, playlist: Option<(String, usize)>) -> Result<(), PlaybackError> {
        let api = self.api.as_ref().ok_or(ApiError::MissingBaseUrl)?;
        log::info!("CMD: Open video '{}' (playlist: {:?})", video_id, playlist);
        let video = api.fetch_video(video_id).await?;
        let (context, start_index) = match playlist {
            Some((playlist_id, index)) => (Some(api.fetch_playlist_context(&playlist_id).await?), index),
            None => (None, 0),
        };
        self.load_video(video, context, start_index).await
    }

    /// Loads whatever a `/watch/{id}?playlist=..&index=..` route points at.
    pub async fn open_watch_route(&self, route: &Route) -> Result<(), PlaybackError> {
        let video_id = route
            .watch_video_id()
            .ok_or_else(|| crate::player::errors::RouteError::NotAWatchRoute(route.to_string()))?;
        let playlist = route.playlist_params()?;
        self.route_changed(route.clone()).await?;
        self.open_video(&video_id, playlist).await
    }

    pub async fn toggle_play(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Toggle play");
        self.send(PlayerCommand::TogglePlay).await
    }

    pub async fn play(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Play");
        self.send(PlayerCommand::Play).await
    }

    pub async fn pause(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Pause");
        self.send(PlayerCommand::Pause).await
    }

    pub async fn seek_to(&self, position_seconds: f64) -> Result<(), PlaybackError> {
        log::info!("CMD: Seek to {}s", position_seconds);
        self.send(PlayerCommand::Seek { position_seconds }).await
    }

    pub async fn set_volume_level(&self, level: f64) -> Result<(), PlaybackError> {
        log::debug!("CMD: Set volume {}", level);
        self.send(PlayerCommand::SetVolume { level }).await
    }

    pub async fn toggle_mute(&self) -> Result<(), PlaybackError> {
        log::debug!("CMD: Toggle mute");
        self.send(PlayerCommand::ToggleMute).await
    }

    pub async fn set_playback_speed(&self, rate: f64) -> Result<(), PlaybackError> {
        log::debug!("CMD: Set playback speed {}", rate);
        self.send(PlayerCommand::SetPlaybackSpeed { rate }).await
    }

    pub async fn activate_mini_player(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Activate mini player");
        self.send(PlayerCommand::ActivateMiniPlayer).await
    }

    pub async fn deactivate_mini_player(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Deactivate mini player");
        self.send(PlayerCommand::DeactivateMiniPlayer).await
    }

    pub async fn close_mini_player(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Close mini player");
        self.send(PlayerCommand::CloseMiniPlayer).await
    }

    pub async fn return_to_main_player(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Return to main player");
        self.send(PlayerCommand::ReturnToMainPlayer).await
    }

    pub async fn handle_video_end(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Video ended");
        self.send(PlayerCommand::HandleVideoEnd).await
    }

    pub async fn register_main_surface_element(&self, observer: Box<dyn VisibilityObserver>) -> Result<(), PlaybackError> {
        log::info!("CMD: Register main surface element");
        self.send(PlayerCommand::RegisterMainSurfaceElement(ObserverHandle(observer)))
            .await
    }

    pub async fn unregister_main_surface_element(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Unregister main surface element");
        self.send(PlayerCommand::UnregisterMainSurfaceElement).await
    }

    pub async fn set_main_surface_visible(&self, visible: bool) -> Result<(), PlaybackError> {
        log::debug!("CMD: Main surface visible: {}", visible);
        self.send(PlayerCommand::MainSurfaceVisibility(visible)).await
    }

    pub async fn route_changed(&self, route: Route) -> Result<(), PlaybackError> {
        log::debug!("CMD: Route changed to {}", route);
        self.send(PlayerCommand::RouteChanged(route)).await
    }

    pub async fn set_viewport_size(&self, viewport: Size) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::SetViewportSize(viewport)).await
    }

    pub async fn begin_mini_drag(&self, pointer: Point) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::BeginMiniDrag(pointer)).await
    }

    pub async fn drag_mini_to(&self, pointer: Point) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::DragMiniTo(pointer)).await
    }

    pub async fn begin_mini_resize(&self, pointer: Point) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::BeginMiniResize(pointer)).await
    }

    pub async fn resize_mini_to(&self, pointer: Point) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::ResizeMiniTo(pointer)).await
    }

    pub async fn end_mini_gesture(&self) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::EndMiniGesture).await
    }

    pub async fn get_playback_state(&self) -> Result<PlaybackState, PlaybackError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(PlayerCommand::GetPlaybackState(reply_tx)).await?;
        Ok(reply_rx.await?)
    }

    /// Disposes the controller and waits for the player thread to confirm.
    pub async fn shutdown(&self) -> Result<(), PlaybackError> {
        log::info!("CMD: Shutdown player");
        let (done_tx, done_rx) = oneshot::channel();
        self.send(PlayerCommand::Shutdown(done_tx)).await?;
        Ok(done_rx.await?)
    }
}
