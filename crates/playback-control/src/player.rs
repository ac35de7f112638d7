//! The transport state machine: routes every input to the transport, the
//! gesture recognizer, control visibility and engine recovery.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};

use crate::config::ControlConfig;
use crate::error::ControlError;
use crate::fullscreen::{FullscreenAdapter, FullscreenHandler, NoFullscreen, Platform, Subscription};
use crate::gesture::{GestureCommand, GestureContext, GestureRecognizer, Indicator, PointerEvent};
use crate::input::{ControlAction, Key, PlayerInput, PointerPhase};
use crate::media::{MediaElement, MediaEvent, PlaybackSession};
use crate::progress::{AnalyticsSink, NoAnalytics, ProgressSink};
use crate::recovery::{AbrEngine, EngineError, PlayerStatus, Recovery};
use crate::timer::{TimerKind, Timers};
use crate::transport::Transport;
use crate::visibility::{ControlVisibility, VisibilityTrigger};

/// Snapshot for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub status: PlayerStatus,
    pub playing: bool,
    pub controls_visible: bool,
    pub fullscreen: bool,
    pub current_time: f64,
    pub duration: f64,
    pub buffered_end: f64,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    pub brightness: f64,
    pub indicator: Option<Indicator>,
    pub title: Option<String>,
}

pub struct PlayerBuilder<M, E> {
    media: M,
    engine: E,
    config: ControlConfig,
    platform: Platform,
    fullscreen: Box<dyn FullscreenAdapter>,
    progress: Option<Box<dyn ProgressSink>>,
    analytics: Box<dyn AnalyticsSink>,
    start_offset: Option<u64>,
    title: Option<String>,
    width: f64,
}

impl<M: MediaElement, E: AbrEngine> PlayerBuilder<M, E> {
    pub fn config(mut self, config: ControlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn fullscreen(mut self, adapter: impl FullscreenAdapter + 'static) -> Self {
        self.fullscreen = Box::new(adapter);
        self
    }

    pub fn progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn analytics(mut self, sink: impl AnalyticsSink + 'static) -> Self {
        self.analytics = Box::new(sink);
        self
    }

    /// Whole seconds to start from, usually from the page link.
    pub fn start_offset(mut self, offset: Option<u64>) -> Self {
        self.start_offset = offset;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn build(self) -> Player<M, E> {
        Player {
            gestures: GestureRecognizer::new(&self.config),
            visibility: ControlVisibility::new(&self.config),
            recovery: Recovery::new(self.config.max_recovery_attempts),
            transport: Transport::new(self.media).with_start_offset(self.start_offset),
            timers: Timers::new(),
            engine: self.engine,
            platform: self.platform,
            fullscreen: self.fullscreen,
            progress: self.progress,
            analytics: self.analytics,
            title: self.title,
            width: self.width,
            config: self.config,
        }
    }
}

pub struct Player<M, E> {
    config: ControlConfig,
    transport: Transport<M>,
    engine: E,
    gestures: GestureRecognizer,
    visibility: ControlVisibility,
    recovery: Recovery,
    timers: Timers,
    platform: Platform,
    fullscreen: Box<dyn FullscreenAdapter>,
    progress: Option<Box<dyn ProgressSink>>,
    analytics: Box<dyn AnalyticsSink>,
    title: Option<String>,
    width: f64,
}

impl<M: MediaElement, E: AbrEngine> Player<M, E> {
    pub fn builder(media: M, engine: E) -> PlayerBuilder<M, E> {
        PlayerBuilder {
            media,
            engine,
            config: ControlConfig::default(),
            platform: Platform::Standard,
            fullscreen: Box::new(NoFullscreen),
            progress: None,
            analytics: Box::new(NoAnalytics),
            start_offset: None,
            title: None,
            width: 0.0,
        }
    }

    pub fn media(&self) -> &M {
        self.transport.media()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn session(&self) -> &PlaybackSession {
        self.transport.session()
    }

    pub fn status(&self) -> &PlayerStatus {
        self.recovery.status()
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn subscribe_fullscreen(&self, handler: FullscreenHandler) -> Subscription {
        self.fullscreen.on_fullscreen_change(handler)
    }

    pub fn view(&self) -> PlayerView {
        let session = self.transport.session();
        PlayerView {
            status: self.recovery.status().clone(),
            playing: self.transport.is_playing(),
            controls_visible: self.visibility.is_visible(),
            fullscreen: session.fullscreen,
            current_time: session.current_time(),
            duration: session.duration(),
            buffered_end: session.buffered_end(),
            volume: session.volume(),
            muted: session.muted,
            playback_rate: session.playback_rate,
            brightness: self.transport.brightness(),
            indicator: self.gestures.indicator(),
            title: self.title.clone(),
        }
    }

    /// Fires every timer due by `now`, in deadline order.
    pub fn advance(&mut self, now: Duration) {
        while let Some((kind, at)) = self.timers.pop_due(now) {
            self.on_timer(kind, at);
        }
    }

    /// Handles one input at `now`, after the timers due by then.
    pub fn handle(&mut self, input: PlayerInput, now: Duration) -> Result<(), ControlError> {
        self.advance(now);
        match input {
            PlayerInput::Pointer { phase, event } => self.on_pointer(phase, &event, now),
            PlayerInput::Key(key) => self.on_key(key, now),
            PlayerInput::Control(action) => return self.on_control(action, now),
            PlayerInput::Media(event) => self.on_media(event, now),
            PlayerInput::Engine(err) => self.on_engine_error(&err),
            PlayerInput::FullscreenChanged(active) => {
                debug!(active, "Fullscreen changed");
                self.transport.session_mut().fullscreen = active;
            }
            PlayerInput::Resize { width, .. } => self.width = width,
        }
        Ok(())
    }

    fn on_timer(&mut self, kind: TimerKind, at: Duration) {
        match kind {
            TimerKind::AutoHide => self.update_visibility(VisibilityTrigger::HideTimer, at),
            TimerKind::Revalidate => self.update_visibility(VisibilityTrigger::Revalidate, at),
            TimerKind::LongPress
            | TimerKind::TapCommit
            | TimerKind::RateRestore
            | TimerKind::IndicatorFade => {
                let ctx = self.gesture_context();
                let commands = self.gestures.on_timer(kind, &ctx, &mut self.timers);
                self.apply_gestures(commands, at);
            }
        }
    }

    fn update_visibility(&mut self, trigger: VisibilityTrigger, now: Duration) {
        let playing = self.transport.is_playing();
        self.visibility
            .apply(trigger, playing, now, &mut self.timers);
    }

    fn gesture_context(&self) -> GestureContext {
        let session = self.transport.session();
        GestureContext {
            width: self.width,
            fullscreen: session.fullscreen,
            brightness: self.transport.brightness(),
            volume: session.volume(),
        }
    }

    fn on_pointer(&mut self, phase: PointerPhase, event: &PointerEvent, now: Duration) {
        if phase != PointerPhase::Cancel {
            self.update_visibility(VisibilityTrigger::Interaction, now);
        }
        let ctx = self.gesture_context();
        let commands = match phase {
            PointerPhase::Down => self.gestures.pointer_down(event, now, &ctx, &mut self.timers),
            PointerPhase::Move => self.gestures.pointer_move(event, now, &ctx, &mut self.timers),
            PointerPhase::Up => self.gestures.pointer_up(event, now, &ctx, &mut self.timers),
            PointerPhase::Cancel => self.gestures.pointer_cancel(&mut self.timers),
        };
        self.apply_gestures(commands, now);
    }

    fn apply_gestures(&mut self, commands: Vec<GestureCommand>, now: Duration) {
        for command in commands {
            match command {
                GestureCommand::TogglePlay => self.toggle_play(now),
                GestureCommand::SeekBy(delta) => self.seek_by(delta),
                GestureCommand::SetRate(rate) => self.transport.override_rate(rate),
                GestureCommand::SetBrightness(value) => self.transport.set_brightness(value),
                GestureCommand::SetVolume(value) => self.transport.set_volume(value),
                GestureCommand::ScrubStarted => {
                    self.update_visibility(VisibilityTrigger::DragStarted, now)
                }
                GestureCommand::ScrubEnded => {
                    self.update_visibility(VisibilityTrigger::DragEnded, now)
                }
            }
        }
    }

    fn on_key(&mut self, key: Key, now: Duration) {
        if key == Key::Other {
            return;
        }
        self.update_visibility(VisibilityTrigger::Interaction, now);
        let skip = self.config.skip_seconds;
        let step = self.config.volume_step;
        match key {
            Key::Space | Key::K => self.toggle_play(now),
            Key::ArrowLeft => self.seek_by(-skip),
            Key::ArrowRight => self.seek_by(skip),
            Key::ArrowUp => self.nudge_volume(step),
            Key::ArrowDown => self.nudge_volume(-step),
            Key::M => self.transport.toggle_mute(),
            Key::F => self.toggle_fullscreen(),
            Key::Other => {}
        }
    }

    fn on_control(&mut self, action: ControlAction, now: Duration) -> Result<(), ControlError> {
        self.update_visibility(VisibilityTrigger::Interaction, now);
        match action {
            ControlAction::TogglePlay => self.toggle_play(now),
            ControlAction::Play => self.play(now),
            ControlAction::Pause => self.pause(now),
            ControlAction::SkipBy(delta) => self.seek_by(delta),
            ControlAction::SeekToFraction(fraction) => {
                self.transport.seek_to_fraction(fraction);
            }
            ControlAction::SetVolume(volume) => self.transport.set_volume(volume),
            ControlAction::ToggleMute => self.transport.toggle_mute(),
            ControlAction::SetRate(rate) => {
                self.transport.set_playback_rate(rate)?;
                self.analytics.track("playback_rate", json!({ "rate": rate }));
            }
            ControlAction::ToggleFullscreen => self.toggle_fullscreen(),
            ControlAction::OpenMenu => self.update_visibility(VisibilityTrigger::MenuOpened, now),
            ControlAction::CloseMenu => self.update_visibility(VisibilityTrigger::MenuClosed, now),
            ControlAction::ProgressDragStart => {
                self.update_visibility(VisibilityTrigger::DragStarted, now)
            }
            ControlAction::ProgressDragMove(fraction) => {
                self.transport.seek_to_fraction(fraction);
            }
            ControlAction::ProgressDragEnd(fraction) => {
                self.transport.seek_to_fraction(fraction);
                self.update_visibility(VisibilityTrigger::DragEnded, now);
            }
            ControlAction::HoverEnter => self.update_visibility(VisibilityTrigger::HoverEnter, now),
            ControlAction::HoverLeave => self.update_visibility(VisibilityTrigger::HoverLeave, now),
            ControlAction::Retry => {
                info!("Retrying playback");
                self.recovery.retry(&mut self.engine);
            }
        }
        Ok(())
    }

    fn on_media(&mut self, event: MediaEvent, now: Duration) {
        if let Some(position) = self.transport.on_media_event(&event) {
            self.analytics
                .track("seek_from_link", json!({ "position": position }));
        }
        match event {
            MediaEvent::LoadedMetadata { .. } => self.recovery.on_loaded(),
            MediaEvent::Play => self.update_visibility(VisibilityTrigger::Played, now),
            MediaEvent::Pause => self.update_visibility(VisibilityTrigger::Paused, now),
            MediaEvent::Ended => {
                self.update_visibility(VisibilityTrigger::Paused, now);
                if let Some(progress) = self.progress.as_mut() {
                    progress.on_ended();
                }
            }
            MediaEvent::TimeUpdate { .. } => {
                if self.transport.is_playing() {
                    self.recovery.on_progress();
                }
                if let Some(progress) = self.progress.as_mut() {
                    let session = self.transport.session();
                    progress.on_time_update(session.current_time(), session.duration());
                }
            }
            _ => {}
        }
    }

    fn on_engine_error(&mut self, err: &EngineError) {
        self.recovery.on_error(err, &mut self.engine);
        if let PlayerStatus::Failed { reason } = self.recovery.status() {
            self.analytics
                .track("playback_failed", json!({ "reason": reason }));
        }
    }

    fn toggle_play(&mut self, now: Duration) {
        if self.transport.is_playing() {
            self.pause(now);
        } else {
            self.play(now);
        }
    }

    fn play(&mut self, now: Duration) {
        self.transport.play();
        self.update_visibility(VisibilityTrigger::Played, now);
        self.analytics.track(
            "play",
            json!({ "position": self.transport.session().current_time() }),
        );
    }

    fn pause(&mut self, now: Duration) {
        self.transport.pause();
        self.update_visibility(VisibilityTrigger::Paused, now);
        self.analytics.track(
            "pause",
            json!({ "position": self.transport.session().current_time() }),
        );
    }

    fn seek_by(&mut self, delta: f64) {
        if let Some(position) = self.transport.seek_by(delta) {
            debug!(delta, position, "Relative seek");
        }
    }

    fn nudge_volume(&mut self, delta: f64) {
        let volume = self.transport.session().volume();
        // Round to the step grid so repeated nudges land on 0 and 1 exactly.
        let target = ((volume + delta) * 100.0).round() / 100.0;
        self.transport.set_volume(target);
    }

    fn toggle_fullscreen(&mut self) {
        let result = match self.platform {
            Platform::Ios => self.transport.media_mut().enter_native_fullscreen(),
            Platform::Standard if self.transport.session().fullscreen => self.fullscreen.exit(),
            Platform::Standard => self.fullscreen.request(),
        };
        if let Err(e) = result {
            debug!(error = %e, "Fullscreen request ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fullscreen::tests::ManualFullscreen;
    use crate::gesture::{HitTarget, Point, PointerKind};
    use crate::recovery::EngineErrorKind;
    use crate::recovery::tests::FakeEngine;
    use crate::transport::start_offset_from_url;
    use crate::transport::tests::FakeMedia;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn player() -> Player<FakeMedia, FakeEngine> {
        let media = FakeMedia {
            duration: 300.0,
            ..FakeMedia::default()
        };
        Player::builder(media, FakeEngine::default())
            .width(800.0)
            .build()
    }

    fn loaded() -> Player<FakeMedia, FakeEngine> {
        let mut player = player();
        player
            .handle(
                PlayerInput::Media(MediaEvent::LoadedMetadata { duration: 300.0 }),
                ms(0),
            )
            .unwrap();
        player
    }

    fn pointer(phase: PointerPhase, kind: PointerKind, x: f64, y: f64) -> PlayerInput {
        PlayerInput::Pointer {
            phase,
            event: PointerEvent {
                id: 7,
                kind,
                position: Point::new(x, y),
                target: HitTarget::Surface,
            },
        }
    }

    #[test]
    fn controls_hide_between_two_and_two_and_a_half_seconds_after_play() {
        let mut player = loaded();
        player
            .handle(PlayerInput::Control(ControlAction::Play), ms(0))
            .unwrap();

        player.advance(ms(1999));
        assert!(player.view().controls_visible);
        player.advance(ms(2500));
        assert!(!player.view().controls_visible);
    }

    #[test]
    fn pointer_move_keeps_controls_until_a_full_delay_later() {
        let mut player = loaded();
        player
            .handle(PlayerInput::Control(ControlAction::Play), ms(0))
            .unwrap();
        player
            .handle(pointer(PointerPhase::Move, PointerKind::Mouse, 10.0, 10.0), ms(1900))
            .unwrap();

        player.advance(ms(3899));
        assert!(player.view().controls_visible);
        player.advance(ms(3900));
        assert!(!player.view().controls_visible);
    }

    #[test]
    fn link_offset_seeks_once_after_metadata() {
        let media = FakeMedia {
            duration: 300.0,
            ..FakeMedia::default()
        };
        let mut player = Player::builder(media, FakeEngine::default())
            .start_offset(start_offset_from_url("https://watch.example.com/film?t=120"))
            .build();
        for event in [
            MediaEvent::LoadedMetadata { duration: 300.0 },
            MediaEvent::CanPlay,
            MediaEvent::LoadedMetadata { duration: 300.0 },
        ] {
            player.handle(PlayerInput::Media(event), ms(0)).unwrap();
        }
        assert_eq!(player.session().current_time(), 120.0);
        assert_eq!(player.media().seeks, vec![120.0]);
    }

    #[test]
    fn out_of_range_link_offset_starts_at_zero() {
        let media = FakeMedia {
            duration: 300.0,
            ..FakeMedia::default()
        };
        let mut player = Player::builder(media, FakeEngine::default())
            .start_offset(start_offset_from_url("https://watch.example.com/film?t=500"))
            .build();
        player
            .handle(
                PlayerInput::Media(MediaEvent::LoadedMetadata { duration: 300.0 }),
                ms(0),
            )
            .unwrap();
        assert_eq!(player.session().current_time(), 0.0);
        assert!(player.media().seeks.is_empty());
    }

    #[test]
    fn volume_keys_and_mute_shortcut_are_coupled() {
        let mut player = loaded();
        player
            .handle(PlayerInput::Control(ControlAction::SetVolume(0.2)), ms(0))
            .unwrap();
        player.handle(PlayerInput::Key(Key::ArrowDown), ms(10)).unwrap();
        player.handle(PlayerInput::Key(Key::ArrowDown), ms(20)).unwrap();
        assert_eq!(player.session().volume(), 0.0);
        assert!(player.session().muted);

        player.handle(PlayerInput::Key(Key::M), ms(30)).unwrap();
        assert!(!player.session().muted);
        assert_eq!(player.session().volume(), 0.5);

        player.handle(PlayerInput::Key(Key::ArrowUp), ms(40)).unwrap();
        assert_eq!(player.media().volume, 0.6);
    }

    #[test]
    fn arrow_keys_skip_and_space_toggles() {
        let mut player = loaded();
        player.handle(PlayerInput::Key(Key::ArrowRight), ms(0)).unwrap();
        player.handle(PlayerInput::Key(Key::ArrowRight), ms(10)).unwrap();
        player.handle(PlayerInput::Key(Key::ArrowLeft), ms(20)).unwrap();
        assert_eq!(player.session().current_time(), 10.0);

        player.handle(PlayerInput::Key(Key::Space), ms(30)).unwrap();
        assert!(player.view().playing);
        player.handle(PlayerInput::Key(Key::K), ms(40)).unwrap();
        assert!(!player.view().playing);
    }

    #[test]
    fn touch_tap_toggles_after_the_double_tap_window() {
        let mut player = loaded();
        player
            .handle(pointer(PointerPhase::Down, PointerKind::Touch, 400.0, 300.0), ms(0))
            .unwrap();
        player
            .handle(pointer(PointerPhase::Up, PointerKind::Touch, 400.0, 300.0), ms(80))
            .unwrap();
        assert!(!player.view().playing);

        player.advance(ms(380));
        assert!(player.view().playing);
    }

    #[test]
    fn double_tap_on_right_half_skips_forward() {
        let mut player = loaded();
        for (phase, at) in [
            (PointerPhase::Down, 0),
            (PointerPhase::Up, 60),
            (PointerPhase::Down, 200),
            (PointerPhase::Up, 260),
        ] {
            player
                .handle(pointer(phase, PointerKind::Touch, 650.0, 300.0), ms(at))
                .unwrap();
        }
        player.advance(ms(2000));

        assert_eq!(player.session().current_time(), 10.0);
        assert!(!player.view().playing);
    }

    #[test]
    fn long_press_overrides_rate_while_held() {
        let mut player = loaded();
        player
            .handle(pointer(PointerPhase::Down, PointerKind::Touch, 400.0, 300.0), ms(0))
            .unwrap();
        player.advance(ms(400));
        assert_eq!(player.media().rate, 1.5);
        assert_eq!(player.view().indicator, Some(Indicator::Speed(1.5)));

        player
            .handle(pointer(PointerPhase::Cancel, PointerKind::Touch, 400.0, 300.0), ms(700))
            .unwrap();
        assert_eq!(player.media().rate, 1.0);
        assert_eq!(player.view().indicator, None);
    }

    #[test]
    fn brightness_swipe_reaches_the_element() {
        let mut player = loaded();
        player
            .handle(pointer(PointerPhase::Down, PointerKind::Touch, 100.0, 100.0), ms(0))
            .unwrap();
        player
            .handle(pointer(PointerPhase::Move, PointerKind::Touch, 100.0, 250.0), ms(60))
            .unwrap();
        assert_eq!(player.media().brightness, 0.5);
        assert_eq!(player.view().indicator.and_then(|i| i.percent()), Some(50));
    }

    #[test]
    fn menu_rejects_unknown_rate() {
        let mut player = loaded();
        let result = player.handle(PlayerInput::Control(ControlAction::SetRate(1.1)), ms(0));
        assert_eq!(result, Err(ControlError::UnsupportedRate(1.1)));
        assert_eq!(player.session().playback_rate, 1.0);
    }

    #[test]
    fn standard_fullscreen_goes_through_adapter_and_tracks_changes() {
        let adapter = ManualFullscreen::default();
        let mut player = Player::builder(FakeMedia::default(), FakeEngine::default())
            .fullscreen(adapter.clone())
            .build();

        player.handle(PlayerInput::Key(Key::F), ms(0)).unwrap();
        assert_eq!(adapter.requests.get(), 1);
        assert!(!player.view().fullscreen);

        player
            .handle(PlayerInput::FullscreenChanged(true), ms(5))
            .unwrap();
        assert!(player.view().fullscreen);
    }

    #[test]
    fn rejected_fullscreen_is_swallowed() {
        let adapter = ManualFullscreen::default();
        adapter.reject.set(true);
        let mut player = Player::builder(FakeMedia::default(), FakeEngine::default())
            .fullscreen(adapter.clone())
            .build();
        let result = player.handle(PlayerInput::Control(ControlAction::ToggleFullscreen), ms(0));
        assert!(result.is_ok());
        assert!(!player.view().fullscreen);
    }

    #[test]
    fn ios_uses_native_element_fullscreen() {
        let adapter = ManualFullscreen::default();
        let mut player = Player::builder(FakeMedia::default(), FakeEngine::default())
            .platform(Platform::Ios)
            .fullscreen(adapter.clone())
            .build();
        player.handle(PlayerInput::Key(Key::F), ms(0)).unwrap();
        assert_eq!(player.media().native_fullscreen_requests, 1);
        assert_eq!(adapter.requests.get(), 0);
    }

    #[test]
    fn failed_recovery_offers_retry() {
        let mut player = loaded();
        let err = EngineError::fatal(EngineErrorKind::Network, "manifest unreachable");
        for at in 0..4 {
            player
                .handle(PlayerInput::Engine(err.clone()), ms(at))
                .unwrap();
        }
        assert!(player.status().can_retry());
        assert_eq!(player.engine().start_loads, 3);

        player
            .handle(PlayerInput::Control(ControlAction::Retry), ms(10))
            .unwrap();
        assert_eq!(player.engine().reloads, 1);
        assert_eq!(player.status(), &PlayerStatus::Loading);
    }

    #[test]
    fn every_time_update_reaches_the_progress_sink() {
        #[derive(Clone, Default)]
        struct Ticks(Rc<RefCell<Vec<(f64, f64)>>>);

        impl ProgressSink for Ticks {
            fn on_time_update(&mut self, current_time: f64, duration: f64) {
                self.0.borrow_mut().push((current_time, duration));
            }
        }

        let ticks = Ticks::default();
        let media = FakeMedia {
            duration: 300.0,
            ..FakeMedia::default()
        };
        let mut player = Player::builder(media, FakeEngine::default())
            .progress(ticks.clone())
            .build();
        player
            .handle(
                PlayerInput::Media(MediaEvent::LoadedMetadata { duration: 300.0 }),
                ms(0),
            )
            .unwrap();
        for t in [0.25, 0.5, 0.75] {
            player
                .handle(
                    PlayerInput::Media(MediaEvent::TimeUpdate { current_time: t }),
                    ms(0),
                )
                .unwrap();
        }
        assert_eq!(
            *ticks.0.borrow(),
            vec![(0.25, 300.0), (0.5, 300.0), (0.75, 300.0)]
        );
    }

    #[test]
    fn paused_media_event_pins_controls() {
        let mut player = loaded();
        player
            .handle(PlayerInput::Control(ControlAction::Play), ms(0))
            .unwrap();
        player.advance(ms(3000));
        assert!(!player.view().controls_visible);

        player
            .handle(PlayerInput::Control(ControlAction::Pause), ms(3100))
            .unwrap();
        player.advance(ms(9000));
        assert!(player.view().controls_visible);
        assert_eq!(player.next_deadline(), None);
    }
}
