use serde::{Deserialize, Serialize};
use std::fmt;

use crate::player::config::{MINI_PLAYER_DEFAULT_HEIGHT, MINI_PLAYER_DEFAULT_WIDTH};

// --- Surfaces ---

/// One of the two playable views of the current video.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceKind {
    Main,
    Mini,
}

impl SurfaceKind {
    pub fn other(self) -> SurfaceKind {
        match self {
            SurfaceKind::Main => SurfaceKind::Mini,
            SurfaceKind::Mini => SurfaceKind::Main,
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKind::Main => write!(f, "main"),
            SurfaceKind::Mini => write!(f, "mini"),
        }
    }
}

/// Which surface is authoritative for transport controls. `None` only while idle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActiveSurface {
    #[default]
    None,
    Main,
    Mini,
}

impl ActiveSurface {
    pub fn kind(self) -> Option<SurfaceKind> {
        match self {
            ActiveSurface::None => None,
            ActiveSurface::Main => Some(SurfaceKind::Main),
            ActiveSurface::Mini => Some(SurfaceKind::Mini),
        }
    }
}

impl From<SurfaceKind> for ActiveSurface {
    fn from(kind: SurfaceKind) -> Self {
        match kind {
            SurfaceKind::Main => ActiveSurface::Main,
            SurfaceKind::Mini => ActiveSurface::Mini,
        }
    }
}

/// Media element readiness, ordered the same way `HTMLMediaElement.readyState` is.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "camelCase")]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Notifications a surface pushes to its subscribers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceEvent {
    TimeUpdate,
    LoadedMetadata,
    Play,
    Pause,
    Waiting,
    CanPlay,
    Ended,
}

// --- Content ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoDescriptor {
    pub id: String,
    pub title: String,
    pub media_url: String,
    pub poster_url: Option<String>,
    pub duration_hint: Option<f64>,
}

impl VideoDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>, media_url: impl Into<String>) -> Self {
        VideoDescriptor {
            id: id.into(),
            title: title.into(),
            media_url: media_url.into(),
            poster_url: None,
            duration_hint: None,
        }
    }
}

/// An ordered playlist plus the cursor of the video being played.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistContext {
    pub playlist_id: String,
    pub ordered_video_ids: Vec<String>,
    pub current_index: usize,
    pub auto_advance: bool,
}

impl PlaylistContext {
    pub fn new(playlist_id: impl Into<String>, ordered_video_ids: Vec<String>) -> Self {
        PlaylistContext {
            playlist_id: playlist_id.into(),
            ordered_video_ids,
            current_index: 0,
            auto_advance: true,
        }
    }

    /// Moves the cursor, clamping to the last entry.
    pub fn with_index(mut self, index: usize) -> Self {
        self.current_index = index.min(self.ordered_video_ids.len().saturating_sub(1));
        self
    }

    /// Places the cursor on `video_id`: `start_index` when it points there, then
    /// the existing cursor, then the first occurrence in the list.
    pub fn positioned_at(self, video_id: &str, start_index: usize) -> Self {
        if self.video_id_at(start_index) == Some(video_id) {
            return self.with_index(start_index);
        }
        if self.video_id_at(self.current_index) == Some(video_id) {
            return self;
        }
        match self.ordered_video_ids.iter().position(|id| id == video_id) {
            Some(index) => self.with_index(index),
            None => {
                log::warn!(
                    "Video '{}' is not in playlist '{}'; using index {}",
                    video_id,
                    self.playlist_id,
                    start_index
                );
                self.with_index(start_index)
            }
        }
    }

    pub fn next_index(&self) -> Option<usize> {
        let next = self.current_index + 1;
        (next < self.ordered_video_ids.len()).then_some(next)
    }

    pub fn video_id_at(&self, index: usize) -> Option<&str> {
        self.ordered_video_ids.get(index).map(String::as_str)
    }
}

// --- Mini Player ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MiniPlayerState {
    pub is_active: bool,
    pub position: Point,
    pub size: Size,
    pub is_dragging: bool,
    pub is_resizing: bool,
}

impl Default for MiniPlayerState {
    fn default() -> Self {
        MiniPlayerState {
            is_active: false,
            position: Point::default(),
            size: Size::new(MINI_PLAYER_DEFAULT_WIDTH, MINI_PLAYER_DEFAULT_HEIGHT),
            is_dragging: false,
            is_resizing: false,
        }
    }
}

// --- State Definitions ---

/// Snapshot of everything the UI renders controls from.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub active_surface: ActiveSurface,
    pub current_video: Option<VideoDescriptor>,
    pub is_playing: bool,
    pub position: f64,
    pub duration: f64,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    pub is_buffering: bool,
    pub mini_player: MiniPlayerState,
    pub main_surface_visible: bool,
    pub playlist_context: Option<PlaylistContext>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState {
            active_surface: ActiveSurface::None,
            current_video: None,
            is_playing: false,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            is_buffering: false,
            mini_player: MiniPlayerState::default(),
            main_surface_visible: true,
            playlist_context: None,
        }
    }
}

impl PlaybackState {
    pub fn current_video_id(&self) -> Option<&str> {
        self.current_video.as_ref().map(|v| v.id.as_str())
    }

    /// Back to the start of the loaded video without touching volume/rate.
    pub(crate) fn reset_transport(&mut self) {
        self.position = 0.0;
        self.duration = 0.0;
        self.is_playing = false;
        self.is_buffering = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(len: usize) -> PlaylistContext {
        PlaylistContext::new("pl", (0..len).map(|i| format!("v{i}")).collect())
    }

    #[test]
    fn next_index_stops_at_last_entry() {
        assert_eq!(playlist(3).next_index(), Some(1));
        assert_eq!(playlist(3).with_index(2).next_index(), None);
        assert_eq!(playlist(0).next_index(), None);
    }

    #[test]
    fn cursor_follows_the_loaded_video() {
        let context = playlist(3).with_index(1);
        assert_eq!(context.clone().positioned_at("v1", 0).current_index, 1);
        assert_eq!(context.clone().positioned_at("v2", 0).current_index, 2);
        assert_eq!(context.clone().positioned_at("v0", 2).current_index, 0);
        assert_eq!(playlist(3).positioned_at("v2", 2).current_index, 2);
        assert_eq!(context.positioned_at("missing", 2).current_index, 2);
    }

    #[test]
    fn start_index_is_clamped() {
        assert_eq!(playlist(3).with_index(10).current_index, 2);
        assert_eq!(playlist(0).with_index(4).current_index, 0);
    }

    #[test]
    fn ready_states_are_ordered() {
        assert!(ReadyState::HaveEnoughData > ReadyState::HaveCurrentData);
        assert!(ReadyState::HaveMetadata < ReadyState::HaveCurrentData);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let json = serde_json::to_value(PlaybackState::default()).unwrap();
        assert_eq!(json["activeSurface"], "none");
        assert_eq!(json["miniPlayer"]["isActive"], false);
        assert_eq!(json["playbackRate"], 1.0);
    }
}
