use std::sync::Arc;
use tokio::time::Instant;

use crate::player::config::{MAX_PLAYBACK_RATE, MAX_VOLUME, MIN_PLAYBACK_RATE, MIN_VOLUME, SyncConfig};
use crate::player::errors::PlaybackError;
use crate::player::mini::GestureAnchor;
use crate::player::navigation::Navigator;
use crate::player::surface::{Surface, SurfaceListener, VisibilityObserver};
use crate::player::types::{
    PlaybackState, PlaylistContext, ReadyState, Size, SurfaceKind, VideoDescriptor,
};

use super::events::{EventSink, emit_error_event, emit_state_event};
use super::state::{
    AttachedSurface, GuardKind, GuardState, PendingHandover, PendingResume, TimerKind, TimerQueue,
};

/// Single authority over playback state and the main/mini surface pair.
///
/// Every mutation goes through `&mut self`; deferred work lives in the timer
/// queue and is run by [`fire_due_timers`](Self::fire_due_timers).
pub struct SyncedPlaybackController {
    pub(crate) config: SyncConfig,
    pub(crate) state: PlaybackState,
    pub(crate) main: Option<AttachedSurface>,
    pub(crate) mini: Option<AttachedSurface>,
    pub(crate) guard: GuardState,
    pub(crate) timers: TimerQueue,
    pub(crate) pending_activation: Option<SurfaceKind>,
    pub(crate) pending_handover: Option<PendingHandover>,
    pub(crate) pending_resume: Option<PendingResume>,
    pub(crate) reconcile_armed_at: Option<Instant>,
    pub(crate) visibility_observer: Option<Box<dyn VisibilityObserver>>,
    pub(crate) auto_promotion_enabled: bool,
    pub(crate) viewport: Size,
    pub(crate) gesture: Option<GestureAnchor>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) events: Arc<dyn EventSink>,
    pub(crate) disposed: bool,
}

impl std::fmt::Debug for SyncedPlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncedPlaybackController")
            .field("state", &self.state)
            .field("guard", &self.guard)
            .field("main_attached", &self.main.is_some())
            .field("mini_attached", &self.mini.is_some())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl SyncedPlaybackController {
    pub fn new(config: SyncConfig, navigator: Arc<dyn Navigator>, events: Arc<dyn EventSink>) -> Self {
        SyncedPlaybackController {
            config,
            state: PlaybackState::default(),
            main: None,
            mini: None,
            guard: GuardState::default(),
            timers: TimerQueue::default(),
            pending_activation: None,
            pending_handover: None,
            pending_resume: None,
            reconcile_armed_at: None,
            visibility_observer: None,
            auto_promotion_enabled: false,
            viewport: Size::new(1280.0, 720.0),
            gesture: None,
            navigator,
            events,
            disposed: false,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.state.clone()
    }

    pub fn guard_kind(&self) -> GuardKind {
        self.guard.current(Instant::now())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    // --- Surface Registry ---

    pub fn attach_surface(&mut self, kind: SurfaceKind, handle: Arc<dyn Surface>, listener: Option<SurfaceListener>) {
        if let Some(previous) = self.slot_mut(kind).take() {
            log::debug!("Replacing attached {} surface", kind);
            previous.release();
        }
        let subscription = listener.map(|l| handle.subscribe(l));
        // Cheap properties are force-synced, so a fresh element starts aligned.
        handle.set_volume(self.state.volume);
        handle.set_muted(self.state.muted);
        handle.set_playback_rate(self.state.playback_rate);
        *self.slot_mut(kind) = Some(AttachedSurface { handle, subscription });
        log::info!("Attached {} surface", kind);
    }

    pub fn detach_surface(&mut self, kind: SurfaceKind) {
        match self.slot_mut(kind).take() {
            Some(attached) => {
                attached.release();
                log::info!("Detached {} surface", kind);
            }
            None => log::debug!("Detach ignored: no {} surface attached", kind),
        }
    }

    fn slot_mut(&mut self, kind: SurfaceKind) -> &mut Option<AttachedSurface> {
        match kind {
            SurfaceKind::Main => &mut self.main,
            SurfaceKind::Mini => &mut self.mini,
        }
    }

    pub(crate) fn surface(&self, kind: SurfaceKind) -> Option<Arc<dyn Surface>> {
        let slot = match kind {
            SurfaceKind::Main => &self.main,
            SurfaceKind::Mini => &self.mini,
        };
        slot.as_ref().map(|attached| Arc::clone(&attached.handle))
    }

    pub(crate) fn active_surface(&self) -> Option<(SurfaceKind, Arc<dyn Surface>)> {
        let kind = self.state.active_surface.kind()?;
        self.surface(kind).map(|surface| (kind, surface))
    }

    // --- Loading ---

    /// Starts a new video. Loading the id that is already current is a no-op.
    pub fn load_video(&mut self, video: VideoDescriptor, playlist: Option<PlaylistContext>, start_index: usize) {
        if self.state.current_video_id() == Some(video.id.as_str()) {
            log::debug!("loadVideo: '{}' is already loaded, ignoring", video.id);
            return;
        }
        let now = Instant::now();
        log::info!("Loading video '{}' ({})", video.id, video.title);

        if self.state.mini_player.is_active {
            log::info!("New playback request cancels the mini player session");
            self.state.mini_player.is_active = false;
            self.state.mini_player.end_gesture();
            self.gesture = None;
        }
        self.pending_handover = None;
        self.pending_resume = None;
        self.reconcile_armed_at = None;
        for kind in [TimerKind::HandoverPoll, TimerKind::ResumePlay, TimerKind::Reconcile] {
            self.timers.cancel(kind);
        }
        self.guard
            .try_enter(GuardKind::Loading, now + SyncConfig::ms(self.config.loading_guard_ms), now);

        for kind in [SurfaceKind::Main, SurfaceKind::Mini] {
            if let Some(surface) = self.surface(kind) {
                surface.pause();
                if let Err(e) = surface.seek(0.0) {
                    log::warn!("Failed to rewind {} surface for new video: {}", kind, e);
                }
            }
        }

        self.state.playlist_context = playlist.map(|p| p.positioned_at(&video.id, start_index));
        self.state.current_video = Some(video);
        self.state.reset_transport();

        self.schedule_activation(SurfaceKind::Main, now + SyncConfig::ms(self.config.main_activation_delay_ms));
        self.publish();
    }

    pub(crate) fn schedule_activation(&mut self, kind: SurfaceKind, at: Instant) {
        self.pending_activation = Some(kind);
        self.timers.schedule(TimerKind::ActivateSurface, at);
    }

    // --- Transport Controls (active surface only) ---

    pub fn play(&mut self) {
        let Some((kind, surface)) = self.active_surface() else {
            log::debug!("play: no active surface");
            return;
        };
        if surface.ready_state() < ReadyState::HaveCurrentData {
            log::debug!("play: {} surface not ready ({:?})", kind, surface.ready_state());
            return;
        }
        match surface.play() {
            Ok(()) => {
                self.state.is_playing = true;
                self.schedule_post_command_reconcile();
            }
            Err(e) => {
                let err = PlaybackError::SurfaceCommand { surface: kind, source: e };
                log::warn!("{}", err);
                self.state.is_playing = !surface.is_paused();
                emit_error_event(self.events.as_ref(), Some(kind), &err.to_string());
            }
        }
        self.publish();
    }

    pub fn pause(&mut self) {
        let Some((kind, surface)) = self.active_surface() else {
            log::debug!("pause: no active surface");
            return;
        };
        surface.pause();
        log::debug!("Paused {} surface", kind);
        self.state.is_playing = false;
        self.schedule_post_command_reconcile();
        self.publish();
    }

    pub fn toggle_play(&mut self) {
        match self.active_surface() {
            Some((_, surface)) if surface.is_paused() => self.play(),
            Some(_) => self.pause(),
            None => log::debug!("togglePlay: no active surface"),
        }
    }

    /// Seeks the active surface, clamped to `[0, duration]`.
    pub fn seek_to(&mut self, time: f64) {
        if !time.is_finite() {
            log::warn!("seekTo: ignoring non-finite target {}", time);
            return;
        }
        let Some((kind, surface)) = self.active_surface() else {
            log::debug!("seekTo: no active surface");
            return;
        };
        let duration = self.known_duration();
        // Without metadata only the lower bound is known.
        let target = if duration > 0.0 { time.clamp(0.0, duration) } else { time.max(0.0) };

        let now = Instant::now();
        self.guard
            .try_enter(GuardKind::Seeking, now + SyncConfig::ms(self.config.seek_guard_ms), now);
        self.timers.cancel(TimerKind::Reconcile);
        self.reconcile_armed_at = None;

        match surface.seek(target) {
            Ok(()) => self.state.position = target,
            Err(e) => {
                let err = PlaybackError::SurfaceCommand { surface: kind, source: e };
                log::warn!("{}", err);
                emit_error_event(self.events.as_ref(), Some(kind), &err.to_string());
                let actual = surface.current_time();
                if actual.is_finite() {
                    self.state.position = actual;
                }
            }
        }

        let resume_at = self.guard.expires_at(now).unwrap_or(now);
        self.timers.schedule(TimerKind::Reconcile, resume_at);
        self.publish();
    }

    /// Reported duration, then the element's, then the descriptor's hint.
    pub(crate) fn known_duration(&self) -> f64 {
        if self.state.duration > 0.0 {
            return self.state.duration;
        }
        let hint = self.state.current_video.as_ref().and_then(|v| v.duration_hint);
        self.active_surface()
            .map(|(_, surface)| surface.duration())
            .filter(|d| d.is_finite() && *d > 0.0)
            .or(hint.filter(|d| d.is_finite() && *d > 0.0))
            .unwrap_or(0.0)
    }

    // --- Force-synced Properties (both surfaces) ---

    pub fn set_volume_level(&mut self, volume: f64) {
        if !volume.is_finite() {
            log::warn!("setVolumeLevel: ignoring non-finite level {}", volume);
            return;
        }
        let volume = volume.clamp(MIN_VOLUME, MAX_VOLUME);
        for surface in self.attached_surfaces() {
            surface.set_volume(volume);
        }
        self.state.volume = volume;
        self.publish();
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.state.muted;
        for surface in self.attached_surfaces() {
            surface.set_muted(muted);
        }
        self.state.muted = muted;
        self.publish();
    }

    pub fn set_playback_speed(&mut self, rate: f64) {
        if !rate.is_finite() {
            log::warn!("setPlaybackSpeed: ignoring non-finite rate {}", rate);
            return;
        }
        let rate = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        for surface in self.attached_surfaces() {
            surface.set_playback_rate(rate);
        }
        self.state.playback_rate = rate;
        self.publish();
    }

    fn attached_surfaces(&self) -> Vec<Arc<dyn Surface>> {
        [SurfaceKind::Main, SurfaceKind::Mini]
            .into_iter()
            .filter_map(|kind| self.surface(kind))
            .collect()
    }

    // --- Timers ---

    /// Runs every timer whose deadline has passed, earliest first.
    pub fn fire_due_timers(&mut self) {
        if self.disposed {
            return;
        }
        let now = Instant::now();
        while let Some(kind) = self.timers.pop_due(now) {
            log::trace!("Timer fired: {:?}", kind);
            match kind {
                TimerKind::ActivateSurface => {
                    if let Some(target) = self.pending_activation.take() {
                        self.set_active_player(target);
                    }
                }
                TimerKind::HandoverPoll => self.poll_handover(),
                TimerKind::ResumePlay => self.resume_play(),
                TimerKind::Reconcile => self.reconcile(),
                TimerKind::ScrollMainIntoView => self.navigator.scroll_main_into_view(),
            }
        }
    }

    pub(crate) fn schedule_post_command_reconcile(&mut self) {
        let at = Instant::now() + SyncConfig::ms(self.config.post_command_reconcile_delay_ms);
        self.timers.schedule(TimerKind::Reconcile, at);
    }

    pub(crate) fn publish(&self) {
        emit_state_event(self.events.as_ref(), &self.state);
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        if self.state.is_playing != playing {
            self.state.is_playing = playing;
            self.publish();
        }
    }

    /// Session end: clears timers, releases surfaces and stops observing visibility.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        log::info!("Disposing playback controller");
        self.timers.clear();
        self.guard.clear();
        self.pending_activation = None;
        self.pending_handover = None;
        self.pending_resume = None;
        self.reconcile_armed_at = None;
        for kind in [SurfaceKind::Main, SurfaceKind::Mini] {
            if let Some(attached) = self.slot_mut(kind).take() {
                attached.release();
            }
        }
        self.unregister_main_surface_element();
        self.disposed = true;
    }
}

impl Drop for SyncedPlaybackController {
    fn drop(&mut self) {
        self.dispose();
    }
}
