use std::sync::Arc;
use tokio::time::Instant;

use crate::player::config::{PROPERTY_EPSILON, SyncConfig};
use crate::player::errors::PlaybackError;
use crate::player::surface::Surface;
use crate::player::types::{ReadyState, SurfaceKind};

use super::SyncedPlaybackController;
use super::events::{emit_active_surface_event, emit_error_event};
use super::state::{GuardKind, PendingHandover, TimerKind};

/// Which properties a copy wrote; reconciliation only arms its guard when something changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CopyOutcome {
    pub(crate) position: bool,
    pub(crate) properties: bool,
    pub(crate) transport: bool,
}

impl CopyOutcome {
    pub(crate) fn wrote_anything(&self) -> bool {
        self.position || self.properties || self.transport
    }
}

/// Copies position (past `position_threshold`), volume/mute/rate and play/pause
/// from `source` onto `target`. Failures are logged, never propagated.
pub(crate) fn copy_surface_state(
    source: &Arc<dyn Surface>,
    target_kind: SurfaceKind,
    target: &Arc<dyn Surface>,
    position_threshold: f64,
    force_properties: bool,
) -> CopyOutcome {
    let mut outcome = CopyOutcome::default();

    let source_time = source.current_time();
    let target_time = target.current_time();
    if source_time.is_finite() && (source_time - target_time).abs() > position_threshold {
        log::debug!(
            "Sync: seeking {} surface {:.3}s -> {:.3}s",
            target_kind,
            target_time,
            source_time
        );
        match target.seek(source_time) {
            Ok(()) => outcome.position = true,
            Err(e) => log::warn!("Sync: seek on {} surface failed: {}", target_kind, e),
        }
    }

    if force_properties || (source.volume() - target.volume()).abs() > PROPERTY_EPSILON {
        target.set_volume(source.volume());
        outcome.properties = true;
    }
    if force_properties || source.muted() != target.muted() {
        target.set_muted(source.muted());
        outcome.properties = true;
    }
    if force_properties || (source.playback_rate() - target.playback_rate()).abs() > PROPERTY_EPSILON {
        target.set_playback_rate(source.playback_rate());
        outcome.properties = true;
    }

    match (source.is_paused(), target.is_paused()) {
        (false, true) => match target.play() {
            Ok(()) => outcome.transport = true,
            Err(e) => log::warn!("Sync: play on {} surface rejected: {}", target_kind, e),
        },
        (true, false) => {
            target.pause();
            outcome.transport = true;
        }
        _ => {}
    }
    outcome
}

impl SyncedPlaybackController {
    // --- Handover ---

    /// Makes `target` the authoritative surface.
    ///
    /// The flag flips synchronously so every later command targets `target`;
    /// the state copy waits until the element reports data.
    pub fn set_active_player(&mut self, target: SurfaceKind) {
        if self.state.active_surface.kind() == Some(target) {
            log::debug!("setActivePlayer: {} already active", target);
            return;
        }
        let previous = self.state.active_surface;
        self.state.active_surface = target.into();
        log::info!("Active surface: {:?} -> {}", previous, target);
        emit_active_surface_event(self.events.as_ref(), previous, self.state.active_surface);

        self.pending_handover = Some(PendingHandover {
            target,
            previous,
            attempts: 0,
        });
        self.timers.schedule(TimerKind::HandoverPoll, Instant::now());
        self.publish();
    }

    pub(crate) fn poll_handover(&mut self) {
        let Some(mut pending) = self.pending_handover.take() else {
            return;
        };
        if self.state.active_surface.kind() != Some(pending.target) {
            log::debug!("Handover to {} superseded", pending.target);
            return;
        }
        let now = Instant::now();
        let guard = self.guard.current(now);
        if guard == GuardKind::Loading {
            log::debug!("Handover copy to {} cancelled by video load", pending.target);
            return;
        }

        let target = self
            .surface(pending.target)
            .filter(|s| s.ready_state() >= ReadyState::HaveCurrentData);
        let Some(target) = target.filter(|_| guard == GuardKind::Idle) else {
            pending.attempts += 1;
            if pending.attempts >= self.config.readiness_max_attempts {
                let err = PlaybackError::ReadinessTimeout {
                    surface: pending.target,
                    attempts: pending.attempts,
                };
                log::warn!("Handover: {}; keeping it active without carrying state over", err);
                emit_error_event(self.events.as_ref(), Some(pending.target), &err.to_string());
                return;
            }
            log::trace!("Handover: {} not ready (attempt {})", pending.target, pending.attempts);
            self.pending_handover = Some(pending);
            self.timers.schedule(
                TimerKind::HandoverPoll,
                now + SyncConfig::ms(self.config.readiness_poll_interval_ms),
            );
            return;
        };

        let source_kind = pending.previous.kind().filter(|k| *k != pending.target);
        let source = source_kind
            .and_then(|k| self.surface(k))
            .filter(|s| s.ready_state() >= ReadyState::HaveCurrentData);
        match source {
            Some(source) => {
                let outcome = copy_surface_state(
                    &source,
                    pending.target,
                    &target,
                    self.config.handover_copy_threshold_secs,
                    true,
                );
                log::info!("Handover to {} complete: {:?}", pending.target, outcome);
                self.guard.try_enter(
                    GuardKind::Reconciling,
                    now + SyncConfig::ms(self.config.reconciling_guard_ms),
                    now,
                );
            }
            None => log::debug!("Handover to {}: no ready source to copy from", pending.target),
        }

        self.state.is_playing = !target.is_paused();
        self.timers.schedule(
            TimerKind::Reconcile,
            now + SyncConfig::ms(self.config.reconcile_debounce_ms),
        );
        self.publish();
    }

    /// Re-issues play on the mini surface after a handover that started while playing.
    pub(crate) fn resume_play(&mut self) {
        let Some(mut pending) = self.pending_resume.take() else {
            return;
        };
        if !self.state.mini_player.is_active || self.state.active_surface.kind() != Some(SurfaceKind::Mini) {
            log::debug!("Resume skipped: mini player no longer active");
            return;
        }
        let Some(surface) = self.surface(SurfaceKind::Mini) else {
            log::debug!("Resume skipped: no mini surface attached");
            return;
        };
        if !surface.is_paused() {
            self.set_playing(true);
            return;
        }
        if surface.ready_state() < ReadyState::HaveCurrentData {
            pending.attempts += 1;
            if pending.attempts >= self.config.readiness_max_attempts {
                log::warn!("Resume: mini surface never became ready, giving up");
                return;
            }
            self.pending_resume = Some(pending);
            self.timers.schedule(
                TimerKind::ResumePlay,
                Instant::now() + SyncConfig::ms(self.config.readiness_poll_interval_ms),
            );
            return;
        }
        self.play();
    }

    // --- Reconciliation ---

    /// Debounced correction of the inactive surface toward the active one.
    pub(crate) fn reconcile(&mut self) {
        self.reconcile_armed_at = None;
        let now = Instant::now();
        let guard = self.guard.current(now);
        if guard != GuardKind::Idle {
            log::debug!("Reconcile skipped: guard {:?}", guard);
            if let Some(until) = self.guard.expires_at(now) {
                self.timers.schedule(TimerKind::Reconcile, until);
            }
            return;
        }
        let Some(active_kind) = self.state.active_surface.kind() else {
            return;
        };
        let inactive_kind = active_kind.other();
        let (Some(active), Some(inactive)) = (self.surface(active_kind), self.surface(inactive_kind)) else {
            log::trace!("Reconcile skipped: only one surface attached");
            return;
        };
        if active.ready_state() < ReadyState::HaveEnoughData || inactive.ready_state() < ReadyState::HaveEnoughData {
            log::debug!(
                "Reconcile skipped: readiness {} {:?}, {} {:?}",
                active_kind,
                active.ready_state(),
                inactive_kind,
                inactive.ready_state()
            );
            return;
        }

        let outcome = copy_surface_state(
            &active,
            inactive_kind,
            &inactive,
            self.config.reconcile_drift_threshold_secs,
            false,
        );
        if outcome.wrote_anything() {
            log::debug!("Reconciled {} from {}: {:?}", inactive_kind, active_kind, outcome);
            // The copy fires its own events on the inactive surface; let them settle.
            self.guard.try_enter(
                GuardKind::Reconciling,
                now + SyncConfig::ms(self.config.reconciling_guard_ms),
                now,
            );
        }
    }

    /// Re-arms the reconcile debounce, never past the max-wait from the first arm.
    pub(crate) fn arm_reconcile(&mut self) {
        let now = Instant::now();
        let first = *self.reconcile_armed_at.get_or_insert(now);
        let debounced = now + SyncConfig::ms(self.config.reconcile_debounce_ms);
        let cap = first + SyncConfig::ms(self.config.reconcile_max_wait_ms);
        self.timers.schedule(TimerKind::Reconcile, debounced.min(cap));
    }
}
