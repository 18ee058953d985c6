use tokio::time::Instant;

use crate::player::config::SyncConfig;
use crate::player::navigation::Route;
use crate::player::types::{ActiveSurface, Point, Size, SurfaceKind};

use super::SyncedPlaybackController;
use super::events::emit_active_surface_event;
use super::state::{PendingResume, TimerKind};

impl SyncedPlaybackController {
    /// Moves playback to the floating mini surface, keeping play intent.
    pub fn activate_mini_player(&mut self) {
        if self.state.current_video.is_none() {
            log::debug!("activateMiniPlayer: no video loaded");
            return;
        }
        if self.state.mini_player.is_active {
            log::debug!("activateMiniPlayer: already active");
            return;
        }
        let was_playing = self.state.is_playing;
        log::info!("Activating mini player (playing: {})", was_playing);

        self.state.mini_player.dock_bottom_right(self.viewport);
        self.state.mini_player.is_active = true;
        // A queued switch back to main must not undo this.
        self.pending_activation = None;
        self.timers.cancel(TimerKind::ActivateSurface);

        self.set_active_player(SurfaceKind::Mini);

        // Switching authority does not continue playback on the new surface by itself.
        if was_playing {
            self.pending_resume = Some(PendingResume { attempts: 0 });
            self.timers.schedule(
                TimerKind::ResumePlay,
                Instant::now() + SyncConfig::ms(self.config.mini_resume_delay_ms),
            );
        }
        self.publish();
    }

    /// Hands control back to the main surface without ending playback.
    pub fn deactivate_mini_player(&mut self) {
        if !self.state.mini_player.is_active && self.state.active_surface != ActiveSurface::Mini {
            log::debug!("deactivateMiniPlayer: mini player not active");
            return;
        }
        log::info!("Deactivating mini player");
        self.state.mini_player.is_active = false;
        self.state.mini_player.end_gesture();
        self.gesture = None;
        self.pending_resume = None;
        self.timers.cancel(TimerKind::ResumePlay);
        self.schedule_activation(
            SurfaceKind::Main,
            Instant::now() + SyncConfig::ms(self.config.mini_deactivation_delay_ms),
        );
        self.publish();
    }

    /// Explicit user cancellation: stops playback and returns the session to idle.
    pub fn close_mini_player(&mut self) {
        log::info!("Closing mini player");
        for kind in [SurfaceKind::Main, SurfaceKind::Mini] {
            if let Some(surface) = self.surface(kind) {
                surface.pause();
            }
        }
        self.timers.clear();
        self.guard.clear();
        self.pending_activation = None;
        self.pending_handover = None;
        self.pending_resume = None;
        self.reconcile_armed_at = None;
        self.gesture = None;

        self.state.current_video = None;
        self.state.reset_transport();
        self.state.playlist_context = None;
        self.state.mini_player.is_active = false;
        self.state.mini_player.end_gesture();

        let previous = self.state.active_surface;
        if previous != ActiveSurface::None {
            self.state.active_surface = ActiveSurface::None;
            emit_active_surface_event(self.events.as_ref(), previous, ActiveSurface::None);
        }
        self.publish();
    }

    /// Leaves the mini player for the loaded video's watch page.
    pub fn return_to_main_player(&mut self) {
        let Some(video_id) = self.state.current_video_id().map(str::to_string) else {
            log::debug!("returnToMainPlayer: no video loaded");
            return;
        };
        self.deactivate_mini_player();

        let playlist = self
            .state
            .playlist_context
            .as_ref()
            .map(|p| (p.playlist_id.as_str(), p.current_index));
        let route = Route::watch(&video_id, playlist);
        log::info!("Returning to main player at {}", route);
        self.navigator.navigate(&route);
        self.timers.schedule(
            TimerKind::ScrollMainIntoView,
            Instant::now() + SyncConfig::ms(self.config.scroll_into_view_delay_ms),
        );
    }

    // --- Mini Player Geometry ---

    pub fn set_viewport_size(&mut self, viewport: Size) {
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            log::warn!("Ignoring invalid viewport {:?}", viewport);
            return;
        }
        self.viewport = viewport;
        self.state.mini_player.fit_into(viewport);
        self.publish();
    }

    pub fn begin_mini_drag(&mut self, pointer: Point) {
        if !self.state.mini_player.is_active || self.state.mini_player.is_resizing {
            return;
        }
        self.gesture = Some(self.state.mini_player.begin_drag(pointer));
        self.publish();
    }

    pub fn drag_mini_to(&mut self, pointer: Point) {
        if let Some(anchor) = self.gesture {
            self.state.mini_player.drag_to(&anchor, pointer, self.viewport);
            self.publish();
        }
    }

    pub fn begin_mini_resize(&mut self, pointer: Point) {
        if !self.state.mini_player.is_active || self.state.mini_player.is_dragging {
            return;
        }
        self.gesture = Some(self.state.mini_player.begin_resize(pointer));
        self.publish();
    }

    pub fn resize_mini_to(&mut self, pointer: Point) {
        if let Some(anchor) = self.gesture {
            self.state.mini_player.resize_to(&anchor, pointer, self.viewport);
            self.publish();
        }
    }

    pub fn end_mini_gesture(&mut self) {
        if self.gesture.take().is_some() {
            self.state.mini_player.end_gesture();
            self.publish();
        }
    }
}
