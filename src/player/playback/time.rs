use crate::player::types::{SurfaceEvent, SurfaceKind};

use super::SyncedPlaybackController;
use super::state::GuardKind;

impl SyncedPlaybackController {
    /// Routes a surface notification. Only the active surface drives the state.
    pub fn handle_surface_event(&mut self, kind: SurfaceKind, event: SurfaceEvent) {
        if self.disposed {
            return;
        }
        if self.state.active_surface.kind() != Some(kind) {
            log::trace!("Ignoring {:?} from inactive {} surface", event, kind);
            return;
        }
        let Some(surface) = self.surface(kind) else {
            return;
        };
        match event {
            SurfaceEvent::TimeUpdate => {
                if self.state.is_buffering && !surface.is_paused() {
                    self.state.is_buffering = false;
                    self.publish();
                }
                self.process_time_update();
            }
            SurfaceEvent::LoadedMetadata => {
                let duration = surface.duration();
                if duration.is_finite() && duration > 0.0 {
                    log::debug!("{} surface metadata: duration {:.2}s", kind, duration);
                    self.state.duration = duration;
                    self.publish();
                }
            }
            SurfaceEvent::Play => {
                self.state.is_buffering = false;
                self.set_playing(true);
            }
            SurfaceEvent::Pause => self.set_playing(false),
            SurfaceEvent::Waiting => {
                if !self.state.is_buffering {
                    self.state.is_buffering = true;
                    self.publish();
                }
            }
            SurfaceEvent::CanPlay => {
                if self.state.is_buffering {
                    self.state.is_buffering = false;
                    self.publish();
                }
            }
            SurfaceEvent::Ended => self.handle_video_end(),
        }
    }

    /// Publishes the active surface's clock when it moved past the coalescing threshold.
    pub(crate) fn process_time_update(&mut self) {
        let Some((_, surface)) = self.active_surface() else {
            return;
        };
        let current_time = surface.current_time();
        if !current_time.is_finite() {
            return;
        }
        if (current_time - self.state.position).abs() <= self.config.publish_threshold_secs {
            return;
        }
        log::trace!("Position {:.3}s -> {:.3}s", self.state.position, current_time);
        self.state.position = current_time;
        self.arm_reconcile();
        self.publish();
    }

    /// Periodic poll from the player thread, for surfaces that report time sparsely.
    pub fn poll_active_surface(&mut self) {
        if self.disposed || self.state.current_video.is_none() {
            return;
        }
        // Right after a load the element may still report the previous media.
        if self.state.duration <= 0.0 && self.guard_kind() != GuardKind::Loading {
            let duration = self.known_duration();
            if duration > 0.0 {
                self.state.duration = duration;
                self.publish();
            }
        }
        self.process_time_update();
    }
}
