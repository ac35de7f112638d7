//! The media element seen by the control layer and the session mirroring it.

use crate::fullscreen::FullscreenError;

/// Handle to the element actually rendering the video.
///
/// Reads go to the element every time; the control layer never trusts a copy
/// when deciding whether playback is running.
pub trait MediaElement {
    fn play(&mut self);
    fn pause(&mut self);
    fn paused(&self) -> bool;
    fn current_time(&self) -> f64;
    /// Total duration in seconds, `NaN` or `0` while unknown.
    fn duration(&self) -> f64;
    fn seek(&mut self, time: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn set_playback_rate(&mut self, rate: f64);
    /// Brightness filter over the picture, `1.0` is unfiltered.
    fn set_brightness(&mut self, brightness: f64);
    /// Element-level fullscreen for platforms without a document-level API.
    fn enter_native_fullscreen(&mut self) -> Result<(), FullscreenError>;
}

/// Notifications emitted by the media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata { duration: f64 },
    CanPlay,
    DurationChange { duration: f64 },
    Play,
    Pause,
    Ended,
    TimeUpdate { current_time: f64 },
    VolumeChange { volume: f64, muted: bool },
    RateChange { rate: f64 },
    Progress { buffered_end: f64 },
}

/// Last known state of one media element.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    current_time: f64,
    duration: f64,
    volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    pub fullscreen: bool,
    buffered_end: f64,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            fullscreen: false,
            buffered_end: 0.0,
        }
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

impl PlaybackSession {
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn buffered_end(&self) -> f64 {
        self.buffered_end
    }

    pub fn has_duration(&self) -> bool {
        self.duration > 0.0
    }

    /// Clamps into `[0, duration]`; before the duration is known only the
    /// lower bound applies.
    pub fn clamp_time(&self, time: f64) -> f64 {
        let time = finite_or_zero(time);
        if self.has_duration() {
            time.min(self.duration)
        } else {
            time
        }
    }

    pub fn set_current_time(&mut self, time: f64) {
        self.current_time = self.clamp_time(time);
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = finite_or_zero(duration);
        self.current_time = self.clamp_time(self.current_time);
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = clamp_unit(volume);
    }

    pub fn set_buffered_end(&mut self, buffered_end: f64) {
        self.buffered_end = self.clamp_time(buffered_end);
    }

    /// Played fraction in `[0, 1]`, zero while the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.has_duration() {
            self.current_time / self.duration
        } else {
            0.0
        }
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_clamped_into_duration() {
        let mut session = PlaybackSession::default();
        session.set_duration(300.0);
        session.set_current_time(-4.0);
        assert_eq!(session.current_time(), 0.0);
        session.set_current_time(301.5);
        assert_eq!(session.current_time(), 300.0);

        session.set_duration(100.0);
        assert_eq!(session.current_time(), 100.0);
        assert_eq!(session.progress(), 1.0);
    }

    #[test]
    fn unknown_duration_only_bounds_below() {
        let mut session = PlaybackSession::default();
        session.set_duration(f64::NAN);
        assert!(!session.has_duration());
        session.set_current_time(42.0);
        assert_eq!(session.current_time(), 42.0);
        assert_eq!(session.progress(), 0.0);
    }

    #[test]
    fn volume_stays_in_unit_range() {
        let mut session = PlaybackSession::default();
        session.set_volume(1.7);
        assert_eq!(session.volume(), 1.0);
        session.set_volume(-0.2);
        assert_eq!(session.volume(), 0.0);
    }
}
