use crate::player::errors::{ObserverError, SurfaceError};
use crate::player::types::{ReadyState, SurfaceEvent};

pub type SurfaceListener = Box<dyn Fn(SurfaceEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A playable media element owned by the embedding UI.
///
/// The controller only reads properties and issues commands; creating and
/// destroying the element is the UI's job. Implementations use interior
/// mutability because the controller holds shared handles.
pub trait Surface: Send + Sync {
    fn ready_state(&self) -> ReadyState;
    fn current_time(&self) -> f64;
    /// `NaN` or `0.0` until metadata has loaded.
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn muted(&self) -> bool;
    fn playback_rate(&self) -> f64;
    fn is_paused(&self) -> bool;

    fn play(&self) -> Result<(), SurfaceError>;
    fn pause(&self);
    fn seek(&self, position: f64) -> Result<(), SurfaceError>;
    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);
    fn set_playback_rate(&self, rate: f64);

    fn subscribe(&self, listener: SurfaceListener) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Reports whether the main surface is at least `threshold` visible.
///
/// Samples are delivered back to the controller as visibility commands; the
/// observer itself only has to be started and stopped.
pub trait VisibilityObserver: Send {
    fn observe(&mut self, threshold: f64) -> Result<(), ObserverError>;
    fn disconnect(&mut self);
}
