use crate::player::config::MAIN_SURFACE_VISIBILITY_THRESHOLD;
use crate::player::navigation::Route;
use crate::player::surface::VisibilityObserver;

use super::SyncedPlaybackController;

impl SyncedPlaybackController {
    /// Starts observing the main surface element. Without observer support the
    /// controller keeps working with auto-promotion disabled.
    pub fn register_main_surface_element(&mut self, mut observer: Box<dyn VisibilityObserver>) {
        if let Some(mut previous) = self.visibility_observer.take() {
            previous.disconnect();
        }
        match observer.observe(MAIN_SURFACE_VISIBILITY_THRESHOLD) {
            Ok(()) => {
                log::info!("Observing main surface visibility");
                self.auto_promotion_enabled = true;
                self.visibility_observer = Some(observer);
            }
            Err(e) => {
                log::warn!("{}; mini player auto-promotion disabled", e);
                self.auto_promotion_enabled = false;
            }
        }
    }

    pub fn unregister_main_surface_element(&mut self) {
        if let Some(mut observer) = self.visibility_observer.take() {
            observer.disconnect();
            log::info!("Stopped observing main surface visibility");
        }
        self.auto_promotion_enabled = false;
    }

    /// Visibility sample for the main surface (at least half on screen or not).
    pub fn on_main_surface_visibility(&mut self, visible: bool) {
        if self.disposed {
            return;
        }
        let was_visible = self.state.main_surface_visible;
        if was_visible == visible {
            return;
        }
        self.state.main_surface_visible = visible;
        self.publish();

        // Only the visible -> hidden edge promotes; the reverse is left to the user.
        if visible || !self.auto_promotion_enabled {
            return;
        }
        if !self.state.is_playing || self.state.mini_player.is_active {
            return;
        }
        let Some(video_id) = self.state.current_video_id() else {
            return;
        };
        if self.navigator.current_route().is_watch_page_for(video_id) {
            log::debug!("Main surface hidden on its own watch page; not promoting");
            return;
        }
        log::info!("Main surface scrolled out of view; promoting to mini player");
        self.activate_mini_player();
    }

    /// Keeps the mini player off the loaded video's own watch page.
    pub fn on_route_change(&mut self, route: &Route) {
        let on_own_watch_page = self
            .state
            .current_video_id()
            .is_some_and(|id| route.is_watch_page_for(id));
        if on_own_watch_page && self.state.mini_player.is_active {
            log::info!("Navigated to the watch page of the loaded video; leaving mini player");
            self.deactivate_mini_player();
        }
    }
}
