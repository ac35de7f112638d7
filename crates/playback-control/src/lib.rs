//! # Playback control
//!
//! Gesture recognition and the transport state machine of the video player.
//!
//! Everything here is single-threaded and clock-agnostic: [`Player::handle`]
//! and [`Player::advance`] take the current time explicitly, and timers are
//! plain deadlines in [`Timers`]. [`PlayerRuntime`] supplies the clock and an
//! input channel on a tokio task.
//!
//! The media element and the adaptive engine are reached through the
//! [`MediaElement`] and [`AbrEngine`] traits; fullscreen through a
//! [`FullscreenAdapter`] chosen per platform.

pub mod config;
pub mod error;
pub mod fullscreen;
pub mod gesture;
pub mod input;
pub mod media;
pub mod player;
pub mod progress;
pub mod recovery;
pub mod runtime;
pub mod timer;
pub mod transport;
pub mod visibility;

pub use config::ControlConfig;
pub use error::ControlError;
pub use fullscreen::{FullscreenAdapter, FullscreenError, NoFullscreen, Platform, Subscription};
pub use gesture::{
    GestureCommand, GestureMode, GestureRecognizer, GestureSession, HitTarget, Indicator, Point,
    PointerEvent, PointerKind,
};
pub use input::{ControlAction, Key, PlayerInput, PointerPhase};
pub use media::{MediaElement, MediaEvent, PlaybackSession};
pub use player::{Player, PlayerBuilder, PlayerView};
pub use progress::{AnalyticsSink, NoAnalytics, ProgressSink, WatchingProgress, WatchingStore};
pub use recovery::{AbrEngine, EngineError, EngineErrorKind, PlayerStatus, RecoveryFailed};
pub use runtime::{PlayerHandle, PlayerRuntime};
pub use timer::{TimerKind, Timers};
pub use transport::{PLAYBACK_RATES, parse_start_offset, start_offset_from_url};
pub use visibility::{ControlVisibility, SuppressFlags};
