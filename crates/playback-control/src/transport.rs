//! Play/pause, seeking, volume, rate and brightness applied to one media element.

use tracing::debug;
use url::Url;

use crate::error::ControlError;
use crate::media::{MediaElement, MediaEvent, PlaybackSession, clamp_unit, finite_or_zero};

/// Rates offered by the speed menu.
pub const PLAYBACK_RATES: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Volume restored when unmuting at zero volume.
pub const UNMUTE_VOLUME: f64 = 0.5;

/// Parses a start offset in whole, non-negative seconds.
pub fn parse_start_offset(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Reads the `t` query parameter of a watch page URL.
pub fn start_offset_from_url(page_url: &str) -> Option<u64> {
    let url = Url::parse(page_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "t")
        .and_then(|(_, value)| parse_start_offset(&value))
}

pub struct Transport<M> {
    media: M,
    session: PlaybackSession,
    pending_start: Option<f64>,
    brightness: f64,
}

impl<M: MediaElement> Transport<M> {
    pub fn new(media: M) -> Self {
        Self {
            media,
            session: PlaybackSession::default(),
            pending_start: None,
            brightness: 1.0,
        }
    }

    /// Seeks to `offset` once, after the first metadata, if it lies inside the asset.
    pub fn with_start_offset(mut self, offset: Option<u64>) -> Self {
        self.pending_start = offset.map(|secs| secs as f64);
        self
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut PlaybackSession {
        &mut self.session
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    /// Live playing state, read from the element.
    pub fn is_playing(&self) -> bool {
        !self.media.paused()
    }

    pub fn play(&mut self) {
        self.media.play();
    }

    pub fn pause(&mut self) {
        self.media.pause();
    }

    /// Seeks to an absolute time and returns where playback landed. Ignored
    /// until the duration is known.
    pub fn seek_to(&mut self, time: f64) -> Option<f64> {
        if !self.session.has_duration() {
            self.session.set_duration(self.media.duration());
        }
        if !self.session.has_duration() {
            debug!(time, "Ignoring seek before duration is known");
            return None;
        }
        let target = self.session.clamp_time(time);
        self.media.seek(target);
        self.session.set_current_time(target);
        Some(target)
    }

    pub fn seek_by(&mut self, delta: f64) -> Option<f64> {
        let from = finite_or_zero(self.media.current_time());
        self.seek_to(from + delta)
    }

    pub fn seek_to_fraction(&mut self, fraction: f64) -> Option<f64> {
        if !self.session.has_duration() {
            self.session.set_duration(self.media.duration());
        }
        self.seek_to(clamp_unit(fraction) * self.session.duration())
    }

    /// Zero volume mutes; any audible volume unmutes.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = clamp_unit(volume);
        self.session.set_volume(volume);
        self.media.set_volume(volume);
        let muted = volume == 0.0;
        if muted != self.session.muted {
            self.session.muted = muted;
            self.media.set_muted(muted);
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.session.muted {
            self.session.muted = false;
            self.media.set_muted(false);
            if self.session.volume() == 0.0 {
                self.session.set_volume(UNMUTE_VOLUME);
                self.media.set_volume(UNMUTE_VOLUME);
            }
        } else {
            self.session.muted = true;
            self.media.set_muted(true);
        }
    }

    /// Applies a rate picked from the speed menu.
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<(), ControlError> {
        if !PLAYBACK_RATES.contains(&rate) {
            return Err(ControlError::UnsupportedRate(rate));
        }
        self.apply_rate(rate);
        Ok(())
    }

    /// Transient rate from a long-press, outside the menu's set.
    pub fn override_rate(&mut self, rate: f64) {
        self.apply_rate(rate);
    }

    fn apply_rate(&mut self, rate: f64) {
        self.session.playback_rate = rate;
        self.media.set_playback_rate(rate);
    }

    pub fn set_brightness(&mut self, brightness: f64) {
        self.brightness = clamp_unit(brightness);
        self.media.set_brightness(self.brightness);
    }

    /// Mirrors a media event into the session. Returns the position when the
    /// event triggered the start-offset seek.
    pub fn on_media_event(&mut self, event: &MediaEvent) -> Option<f64> {
        match *event {
            MediaEvent::LoadedMetadata { duration } => {
                self.session.set_duration(duration);
                self.apply_start_offset()
            }
            MediaEvent::CanPlay => {
                if !self.session.has_duration() {
                    self.session.set_duration(self.media.duration());
                }
                self.apply_start_offset()
            }
            MediaEvent::DurationChange { duration } => {
                self.session.set_duration(duration);
                None
            }
            MediaEvent::TimeUpdate { current_time } => {
                self.session.set_current_time(current_time);
                None
            }
            MediaEvent::VolumeChange { volume, muted } => {
                self.session.set_volume(volume);
                self.session.muted = muted;
                None
            }
            MediaEvent::RateChange { rate } => {
                self.session.playback_rate = rate;
                None
            }
            MediaEvent::Progress { buffered_end } => {
                self.session.set_buffered_end(buffered_end);
                None
            }
            MediaEvent::Play | MediaEvent::Pause | MediaEvent::Ended => None,
        }
    }

    fn apply_start_offset(&mut self) -> Option<f64> {
        if !self.session.has_duration() {
            return None;
        }
        let offset = self.pending_start.take()?;
        if offset >= self.session.duration() {
            debug!(
                offset,
                duration = self.session.duration(),
                "Start offset outside asset, starting from the beginning"
            );
            return None;
        }
        debug!(offset, "Seeking to start offset from link");
        self.seek_to(offset)
    }
}
