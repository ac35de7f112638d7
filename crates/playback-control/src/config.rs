use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timings and thresholds for gestures and the transport controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Idle time before playing controls hide.
    pub hide_delay_ms: u64,
    /// Period of the hide re-check while playing.
    pub revalidate_interval_ms: u64,
    pub long_press_ms: u64,
    pub double_tap_window_ms: u64,
    /// Movement that must be exceeded before a press becomes a swipe.
    pub move_threshold_px: f64,
    /// Vertical travel covering the full brightness range.
    pub brightness_travel_px: f64,
    /// Vertical travel covering the full volume range.
    pub volume_travel_px: f64,
    pub indicator_fade_ms: u64,
    /// Delay before a released long-press restores normal speed.
    pub rate_restore_grace_ms: u64,
    pub long_press_rate: f64,
    pub fullscreen_long_press_rate: f64,
    pub skip_seconds: f64,
    pub volume_step: f64,
    pub max_recovery_attempts: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            hide_delay_ms: 2000,
            revalidate_interval_ms: 500,
            long_press_ms: 400,
            double_tap_window_ms: 300,
            move_threshold_px: 10.0,
            brightness_travel_px: 300.0,
            volume_travel_px: 200.0,
            indicator_fade_ms: 1000,
            rate_restore_grace_ms: 100,
            long_press_rate: 1.5,
            fullscreen_long_press_rate: 2.0,
            skip_seconds: 10.0,
            volume_step: 0.1,
            max_recovery_attempts: 3,
        }
    }
}

impl ControlConfig {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn revalidate_interval(&self) -> Duration {
        Duration::from_millis(self.revalidate_interval_ms)
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_window_ms)
    }

    pub fn indicator_fade(&self) -> Duration {
        Duration::from_millis(self.indicator_fade_ms)
    }

    pub fn rate_restore_grace(&self) -> Duration {
        Duration::from_millis(self.rate_restore_grace_ms)
    }
}
