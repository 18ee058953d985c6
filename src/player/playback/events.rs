use serde::Serialize;

use crate::player::errors::EmitError;
use crate::player::types::{ActiveSurface, PlaybackState, SurfaceKind};

pub const STATE_UPDATE_EVENT: &str = "playback://state-update";
pub const ACTIVE_SURFACE_EVENT: &str = "playback://active-surface";
pub const ERROR_EVENT: &str = "playback://error";

/// Outbound channel to the UI layer.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: serde_json::Value) -> Result<(), EmitError>;
}

/// Sink for embeddings that only poll snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &str, _payload: serde_json::Value) -> Result<(), EmitError> {
        Ok(())
    }
}

// --- Event Payloads for Frontend ---
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSurfaceEventPayload {
    pub previous: ActiveSurface,
    pub active: ActiveSurface,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackErrorEventPayload {
    pub surface: Option<SurfaceKind>,
    pub error: String,
}

// --- Event Emitter Helpers ---

fn emit_payload<T: Serialize>(sink: &dyn EventSink, event: &str, payload: &T) {
    let value = match serde_json::to_value(payload) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Failed to serialize payload for {}: {}", event, e);
            return;
        }
    };
    if let Err(e) = sink.emit(event, value) {
        log::warn!("{}", e);
    }
}

pub(crate) fn emit_state_event(sink: &dyn EventSink, state: &PlaybackState) {
    emit_payload(sink, STATE_UPDATE_EVENT, state);
}

pub(crate) fn emit_active_surface_event(sink: &dyn EventSink, previous: ActiveSurface, active: ActiveSurface) {
    emit_payload(sink, ACTIVE_SURFACE_EVENT, &ActiveSurfaceEventPayload { previous, active });
}

pub(crate) fn emit_error_event(sink: &dyn EventSink, surface: Option<SurfaceKind>, error_message: &str) {
    let payload = PlaybackErrorEventPayload {
        surface,
        error: error_message.to_string(),
    };
    emit_payload(sink, ERROR_EVENT, &payload);
}
