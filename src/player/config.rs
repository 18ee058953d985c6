use serde::Deserialize;
use std::time::Duration;

use crate::player::errors::ApiError;

// --- Sync Thresholds (seconds) ---
/// Minimum change in active-surface position before it is published to the state.
pub const POSITION_PUBLISH_THRESHOLD_SECS: f64 = 0.1;
/// Drift tolerated by the one-time handover copy before seeking the new surface.
pub const HANDOVER_COPY_THRESHOLD_SECS: f64 = 0.2;
/// Drift tolerated by steady-state reconciliation before seeking the inactive surface.
pub const RECONCILE_DRIFT_THRESHOLD_SECS: f64 = 0.5;
/// Volume/rate differences below this are treated as equal.
pub const PROPERTY_EPSILON: f64 = 1e-3;

// --- Reconciliation Timing (ms) ---
pub const RECONCILE_DEBOUNCE_MS: u64 = 250;
pub const RECONCILE_MAX_WAIT_MS: u64 = 1000;
pub const POST_COMMAND_RECONCILE_DELAY_MS: u64 = 100;
pub const RECONCILING_GUARD_MS: u64 = 200;
pub const SEEK_GUARD_MS: u64 = 100;
pub const LOADING_GUARD_MS: u64 = 500;

// --- Handover Timing (ms) ---
pub const MAIN_ACTIVATION_DELAY_MS: u64 = 100;
pub const MINI_DEACTIVATION_DELAY_MS: u64 = 100;
pub const MINI_RESUME_DELAY_MS: u64 = 150;
pub const READINESS_POLL_INTERVAL_MS: u64 = 100;
pub const READINESS_MAX_ATTEMPTS: u32 = 50;
pub const SCROLL_INTO_VIEW_DELAY_MS: u64 = 300;

// --- Player Thread Constants ---
// Interval for polling the active surface's clock from the player thread.
pub const PLAYER_THREAD_TIME_UPDATE_INTERVAL_MS: u64 = 50;
pub const PLAYER_COMMAND_CHAN_SIZE: usize = 64;

// --- Control Ranges ---
pub const MIN_VOLUME: f64 = 0.0;
pub const MAX_VOLUME: f64 = 1.0;
pub const MIN_PLAYBACK_RATE: f64 = 0.25;
pub const MAX_PLAYBACK_RATE: f64 = 2.0;

// --- Mini Player Geometry (px) ---
pub const MINI_PLAYER_MARGIN: f64 = 20.0;
pub const MINI_PLAYER_DEFAULT_WIDTH: f64 = 320.0;
pub const MINI_PLAYER_DEFAULT_HEIGHT: f64 = 180.0;
pub const MINI_PLAYER_MIN_WIDTH: f64 = 240.0;
pub const MINI_PLAYER_MAX_WIDTH: f64 = 640.0;
pub const MINI_PLAYER_ASPECT_RATIO: f64 = 16.0 / 9.0;

/// Fraction of the main surface that must be on screen for it to count as visible.
pub const MAIN_SURFACE_VISIBILITY_THRESHOLD: f64 = 0.5;

pub const API_BASE_URL_ENV: &str = "API_BASE_URL";

/// Tunables for the synchronization engine. Missing fields fall back to the
/// constants above.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    pub publish_threshold_secs: f64,
    pub handover_copy_threshold_secs: f64,
    pub reconcile_drift_threshold_secs: f64,
    pub reconcile_debounce_ms: u64,
    pub reconcile_max_wait_ms: u64,
    pub post_command_reconcile_delay_ms: u64,
    pub reconciling_guard_ms: u64,
    pub seek_guard_ms: u64,
    pub loading_guard_ms: u64,
    pub main_activation_delay_ms: u64,
    pub mini_deactivation_delay_ms: u64,
    pub mini_resume_delay_ms: u64,
    pub readiness_poll_interval_ms: u64,
    pub readiness_max_attempts: u32,
    pub scroll_into_view_delay_ms: u64,
    pub time_update_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            publish_threshold_secs: POSITION_PUBLISH_THRESHOLD_SECS,
            handover_copy_threshold_secs: HANDOVER_COPY_THRESHOLD_SECS,
            reconcile_drift_threshold_secs: RECONCILE_DRIFT_THRESHOLD_SECS,
            reconcile_debounce_ms: RECONCILE_DEBOUNCE_MS,
            reconcile_max_wait_ms: RECONCILE_MAX_WAIT_MS,
            post_command_reconcile_delay_ms: POST_COMMAND_RECONCILE_DELAY_MS,
            reconciling_guard_ms: RECONCILING_GUARD_MS,
            seek_guard_ms: SEEK_GUARD_MS,
            loading_guard_ms: LOADING_GUARD_MS,
            main_activation_delay_ms: MAIN_ACTIVATION_DELAY_MS,
            mini_deactivation_delay_ms: MINI_DEACTIVATION_DELAY_MS,
            mini_resume_delay_ms: MINI_RESUME_DELAY_MS,
            readiness_poll_interval_ms: READINESS_POLL_INTERVAL_MS,
            readiness_max_attempts: READINESS_MAX_ATTEMPTS,
            scroll_into_view_delay_ms: SCROLL_INTO_VIEW_DELAY_MS,
            time_update_interval_ms: PLAYER_THREAD_TIME_UPDATE_INTERVAL_MS,
        }
    }
}

impl SyncConfig {
    pub(crate) fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    pub fn time_update_interval(&self) -> Duration {
        Self::ms(self.time_update_interval_ms.max(1))
    }
}

/// Connection settings for the media source and playlist providers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        ApiConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Reads `API_BASE_URL`, loading a `.env` file first if one is present.
    pub fn from_env() -> Result<Self, ApiError> {
        if let Err(e) = dotenv::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }
        match std::env::var(API_BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Ok(ApiConfig::new(url.trim())),
            _ => Err(ApiError::MissingBaseUrl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: SyncConfig =
            serde_json::from_str(r#"{"reconcileDriftThresholdSecs": 0.75, "readinessMaxAttempts": 10}"#)
                .unwrap();
        assert_eq!(cfg.reconcile_drift_threshold_secs, 0.75);
        assert_eq!(cfg.readiness_max_attempts, 10);
        assert_eq!(cfg.publish_threshold_secs, POSITION_PUBLISH_THRESHOLD_SECS);
        assert_eq!(cfg.loading_guard_ms, LOADING_GUARD_MS);
    }

    #[test]
    fn api_config_strips_trailing_slash() {
        assert_eq!(ApiConfig::new("http://localhost:8000/api/v1/").base_url, "http://localhost:8000/api/v1");
    }
}
