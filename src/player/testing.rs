//! In-memory collaborators for controller tests.

use std::sync::{Arc, Mutex};

use crate::player::errors::{EmitError, ObserverError, SurfaceError};
use crate::player::navigation::{Navigator, Route};
use crate::player::playback::EventSink;
use crate::player::surface::{SubscriptionId, Surface, SurfaceListener, VisibilityObserver};
use crate::player::types::{ReadyState, SurfaceEvent};

struct FakeSurfaceState {
    ready: ReadyState,
    time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    rate: f64,
    paused: bool,
    reject_play: bool,
    reject_seek: bool,
    next_subscription: u64,
    listeners: Vec<(SubscriptionId, Arc<SurfaceListener>)>,
    seeks: Vec<f64>,
    play_calls: usize,
    pause_calls: usize,
}

pub(crate) struct FakeSurface {
    inner: Mutex<FakeSurfaceState>,
}

impl FakeSurface {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(FakeSurface {
            inner: Mutex::new(FakeSurfaceState {
                ready: ReadyState::HaveEnoughData,
                time: 0.0,
                duration: 120.0,
                volume: 1.0,
                muted: false,
                rate: 1.0,
                paused: true,
                reject_play: false,
                reject_seek: false,
                next_subscription: 0,
                listeners: Vec::new(),
                seeks: Vec::new(),
                play_calls: 0,
                pause_calls: 0,
            }),
        })
    }

    pub(crate) fn not_ready() -> Arc<Self> {
        let surface = FakeSurface::new();
        surface.set_ready(ReadyState::HaveNothing);
        surface
    }

    pub(crate) fn set_ready(&self, ready: ReadyState) {
        self.inner.lock().unwrap().ready = ready;
    }

    pub(crate) fn set_time(&self, time: f64) {
        self.inner.lock().unwrap().time = time;
    }

    pub(crate) fn set_duration(&self, duration: f64) {
        self.inner.lock().unwrap().duration = duration;
    }

    pub(crate) fn reject_play(&self, reject: bool) {
        self.inner.lock().unwrap().reject_play = reject;
    }

    pub(crate) fn reject_seek(&self, reject: bool) {
        self.inner.lock().unwrap().reject_seek = reject;
    }

    pub(crate) fn seeks(&self) -> Vec<f64> {
        self.inner.lock().unwrap().seeks.clone()
    }

    pub(crate) fn play_calls(&self) -> usize {
        self.inner.lock().unwrap().play_calls
    }

    pub(crate) fn pause_calls(&self) -> usize {
        self.inner.lock().unwrap().pause_calls
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().listeners.len()
    }

    /// Delivers `event` to every subscriber, outside the state lock.
    pub(crate) fn emit(&self, event: SurfaceEvent) {
        let listeners: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl Surface for FakeSurface {
    fn ready_state(&self) -> ReadyState {
        self.inner.lock().unwrap().ready
    }

    fn current_time(&self) -> f64 {
        self.inner.lock().unwrap().time
    }

    fn duration(&self) -> f64 {
        self.inner.lock().unwrap().duration
    }

    fn volume(&self) -> f64 {
        self.inner.lock().unwrap().volume
    }

    fn muted(&self) -> bool {
        self.inner.lock().unwrap().muted
    }

    fn playback_rate(&self) -> f64 {
        self.inner.lock().unwrap().rate
    }

    fn is_paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }

    fn play(&self) -> Result<(), SurfaceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.play_calls += 1;
        if inner.reject_play {
            return Err(SurfaceError::PlayRejected("autoplay blocked".to_string()));
        }
        inner.paused = false;
        Ok(())
    }

    fn pause(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.pause_calls += 1;
        inner.paused = true;
    }

    fn seek(&self, position: f64) -> Result<(), SurfaceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.reject_seek {
            return Err(SurfaceError::SeekFailed {
                position,
                reason: "media not seekable".to_string(),
            });
        }
        inner.seeks.push(position);
        inner.time = position;
        Ok(())
    }

    fn set_volume(&self, volume: f64) {
        self.inner.lock().unwrap().volume = volume;
    }

    fn set_muted(&self, muted: bool) {
        self.inner.lock().unwrap().muted = muted;
    }

    fn set_playback_rate(&self, rate: f64) {
        self.inner.lock().unwrap().rate = rate;
    }

    fn subscribe(&self, listener: SurfaceListener) -> SubscriptionId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.lock().unwrap().listeners.retain(|(existing, _)| *existing != id);
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    current: Mutex<Option<Route>>,
    navigations: Mutex<Vec<Route>>,
    scrolls: Mutex<usize>,
}

impl RecordingNavigator {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(RecordingNavigator::default())
    }

    pub(crate) fn set_current(&self, route: Route) {
        *self.current.lock().unwrap() = Some(route);
    }

    pub(crate) fn navigations(&self) -> Vec<Route> {
        self.navigations.lock().unwrap().clone()
    }

    pub(crate) fn scrolls(&self) -> usize {
        *self.scrolls.lock().unwrap()
    }
}

impl Navigator for RecordingNavigator {
    fn current_route(&self) -> Route {
        self.current
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Route::new("/"))
    }

    fn navigate(&self, target: &Route) {
        self.navigations.lock().unwrap().push(target.clone());
        *self.current.lock().unwrap() = Some(target.clone());
    }

    fn scroll_main_into_view(&self) {
        *self.scrolls.lock().unwrap() += 1;
    }
}

#[derive(Default)]
pub(crate) struct RecordingEventSink {
    events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingEventSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(RecordingEventSink::default())
    }

    pub(crate) fn named(&self, event: &str) -> Vec<serde_json::Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, payload)| payload.clone())
            .collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &str, payload: serde_json::Value) -> Result<(), EmitError> {
        self.events.lock().unwrap().push((event.to_string(), payload));
        Ok(())
    }
}

/// Shared record of what a [`FakeObserver`] was asked to do.
#[derive(Debug, Default)]
pub(crate) struct ObserverLog {
    pub(crate) observed: Option<f64>,
    pub(crate) disconnected: bool,
}

pub(crate) struct FakeObserver {
    supported: bool,
    log: Arc<Mutex<ObserverLog>>,
}

impl FakeObserver {
    pub(crate) fn new(supported: bool) -> (Box<Self>, Arc<Mutex<ObserverLog>>) {
        let log = Arc::new(Mutex::new(ObserverLog::default()));
        let observer = FakeObserver {
            supported,
            log: Arc::clone(&log),
        };
        (Box::new(observer), log)
    }
}

impl VisibilityObserver for FakeObserver {
    fn observe(&mut self, threshold: f64) -> Result<(), ObserverError> {
        if !self.supported {
            return Err(ObserverError::Unsupported);
        }
        self.log.lock().unwrap().observed = Some(threshold);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.log.lock().unwrap().disconnected = true;
    }
}
