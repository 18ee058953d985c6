use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;

use crate::player::surface::{SubscriptionId, Surface};
use crate::player::types::{ActiveSurface, SurfaceKind};

// --- Guard State Machine ---

/// What currently suppresses reconciliation. Ordered by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GuardKind {
    Idle,
    Reconciling,
    Seeking,
    Loading,
}

/// Single time-boxed guard replacing independent `isLoading`/`isSyncing` flags.
///
/// Allowed transitions:
/// - `Loading` from any state.
/// - `Seeking` from `Idle`, `Reconciling` or `Seeking`.
/// - `Reconciling` from `Idle` or `Reconciling`.
/// - any state back to `Idle` once its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GuardState {
    kind: GuardKind,
    until: Option<Instant>,
}

impl Default for GuardState {
    fn default() -> Self {
        GuardState {
            kind: GuardKind::Idle,
            until: None,
        }
    }
}

impl GuardState {
    pub(crate) fn current(&self, now: Instant) -> GuardKind {
        match self.until {
            Some(until) if now < until => self.kind,
            _ => GuardKind::Idle,
        }
    }

    pub(crate) fn expires_at(&self, now: Instant) -> Option<Instant> {
        match self.current(now) {
            GuardKind::Idle => None,
            _ => self.until,
        }
    }

    /// Returns false when the transition is not allowed from the current state.
    pub(crate) fn try_enter(&mut self, next: GuardKind, until: Instant, now: Instant) -> bool {
        let current = self.current(now);
        let allowed = match next {
            GuardKind::Idle => true,
            GuardKind::Loading => true,
            GuardKind::Seeking => current <= GuardKind::Seeking,
            GuardKind::Reconciling => current <= GuardKind::Reconciling,
        };
        if !allowed {
            log::trace!("Guard: {:?} -> {:?} refused", current, next);
            return false;
        }
        if next == GuardKind::Idle {
            *self = GuardState::default();
        } else {
            // Re-entering the same guard never shortens it.
            let until = match (current == next, self.until) {
                (true, Some(existing)) => existing.max(until),
                _ => until,
            };
            self.kind = next;
            self.until = Some(until);
        }
        log::trace!("Guard: {:?} -> {:?}", current, next);
        true
    }

    pub(crate) fn clear(&mut self) {
        *self = GuardState::default();
    }
}

// --- Deferred Work ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Designate a surface as active after its element has had time to mount.
    ActivateSurface,
    HandoverPoll,
    ResumePlay,
    Reconcile,
    ScrollMainIntoView,
}

/// One pending deadline per kind; rescheduling a kind supersedes it.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    deadlines: HashMap<TimerKind, Instant>,
}

impl TimerQueue {
    pub(crate) fn schedule(&mut self, kind: TimerKind, at: Instant) {
        self.deadlines.insert(kind, at);
    }

    pub(crate) fn cancel(&mut self, kind: TimerKind) {
        self.deadlines.remove(&kind);
    }

    pub(crate) fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns the earliest timer due at `now`.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<TimerKind> {
        let (kind, _) = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .min_by_key(|(kind, at)| (**at, **kind))
            .map(|(kind, at)| (*kind, *at))?;
        self.deadlines.remove(&kind);
        Some(kind)
    }
}

// --- Handover Bookkeeping ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingHandover {
    pub(crate) target: SurfaceKind,
    pub(crate) previous: ActiveSurface,
    pub(crate) attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingResume {
    pub(crate) attempts: u32,
}

pub(crate) struct AttachedSurface {
    pub(crate) handle: Arc<dyn Surface>,
    pub(crate) subscription: Option<SubscriptionId>,
}

impl AttachedSurface {
    pub(crate) fn release(self) {
        if let Some(id) = self.subscription {
            self.handle.unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn guard_expires_back_to_idle() {
        let now = Instant::now();
        let mut guard = GuardState::default();
        assert!(guard.try_enter(GuardKind::Seeking, now + Duration::from_millis(100), now));
        assert_eq!(guard.current(now), GuardKind::Seeking);
        assert_eq!(guard.current(now + Duration::from_millis(100)), GuardKind::Idle);
    }

    #[test]
    fn loading_outranks_everything() {
        let now = Instant::now();
        let mut guard = GuardState::default();
        assert!(guard.try_enter(GuardKind::Loading, now + Duration::from_millis(500), now));
        assert!(!guard.try_enter(GuardKind::Seeking, now + Duration::from_millis(100), now));
        assert!(!guard.try_enter(GuardKind::Reconciling, now + Duration::from_millis(200), now));
        assert_eq!(guard.current(now + Duration::from_millis(300)), GuardKind::Loading);
    }

    #[test]
    fn seek_preempts_reconciling_but_not_the_reverse() {
        let now = Instant::now();
        let mut guard = GuardState::default();
        assert!(guard.try_enter(GuardKind::Reconciling, now + Duration::from_millis(200), now));
        assert!(guard.try_enter(GuardKind::Seeking, now + Duration::from_millis(100), now));
        assert!(!guard.try_enter(GuardKind::Reconciling, now + Duration::from_millis(200), now));
    }

    #[test]
    fn timers_pop_in_deadline_order_and_supersede() {
        let now = Instant::now();
        let mut timers = TimerQueue::default();
        timers.schedule(TimerKind::Reconcile, now + Duration::from_millis(50));
        timers.schedule(TimerKind::ActivateSurface, now + Duration::from_millis(10));
        timers.schedule(TimerKind::Reconcile, now + Duration::from_millis(20));

        let later = now + Duration::from_millis(30);
        assert_eq!(timers.pop_due(later), Some(TimerKind::ActivateSurface));
        assert_eq!(timers.pop_due(later), Some(TimerKind::Reconcile));
        assert_eq!(timers.pop_due(later), None);
        assert_eq!(timers.next_deadline(), None);
    }
}
