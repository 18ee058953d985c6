use crate::player::navigation::Route;

use super::SyncedPlaybackController;

impl SyncedPlaybackController {
    /// End of the current video: drop the mini player and follow the playlist if asked to.
    pub fn handle_video_end(&mut self) {
        log::info!("Video ended: {:?}", self.state.current_video_id());
        if self.state.mini_player.is_active {
            self.deactivate_mini_player();
        }

        let next = self
            .state
            .playlist_context
            .as_ref()
            .filter(|playlist| playlist.auto_advance)
            .and_then(|playlist| {
                let index = playlist.next_index()?;
                let video_id = playlist.video_id_at(index)?;
                Some(Route::watch(video_id, Some((playlist.playlist_id.as_str(), index))))
            });

        match next {
            Some(route) => {
                log::info!("Auto-advancing to {}", route);
                self.navigator.navigate(&route);
            }
            None => self.set_playing(false),
        }
    }
}
