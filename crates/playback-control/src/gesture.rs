//! Pointer and touch gestures over the video surface.
//!
//! A session starts on pointer-down over the surface, resolves to one
//! [`GestureMode`] at most once, and ends on pointer-up or cancel. The
//! recognizer never touches the media element; it emits [`GestureCommand`]s
//! for the player to apply.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::ControlConfig;
use crate::media::clamp_unit;
use crate::timer::{TimerKind, Timers};

const VELOCITY_SAMPLES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

/// What the pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The video picture itself.
    Surface,
    /// A button, slider or menu of the control bar, which handles its own input.
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: u32,
    pub kind: PointerKind,
    pub position: Point,
    pub target: HitTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn of(x: f64, width: f64) -> Self {
        if x < width / 2.0 { Side::Left } else { Side::Right }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Pending,
    HorizontalSeek,
    Brightness,
    Volume,
    LongPress,
    DoubleTap,
}

/// Transient on-screen feedback for the active adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Indicator {
    Brightness(f64),
    Volume(f64),
    Speed(f64),
}

impl Indicator {
    /// Level as a whole percentage; speed indicators have none.
    pub fn percent(&self) -> Option<u8> {
        match *self {
            Indicator::Brightness(v) | Indicator::Volume(v) => Some((v * 100.0).round() as u8),
            Indicator::Speed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureCommand {
    TogglePlay,
    SeekBy(f64),
    SetRate(f64),
    SetBrightness(f64),
    SetVolume(f64),
    /// Horizontal drag handed to the progress bar.
    ScrubStarted,
    ScrubEnded,
}

/// Player state a gesture needs at the moment an event is handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    pub width: f64,
    pub fullscreen: bool,
    pub brightness: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: Duration,
    position: Point,
}

#[derive(Debug, Clone)]
pub struct GestureSession {
    pointer_id: u32,
    kind: PointerKind,
    start: Point,
    started_at: Duration,
    last: Point,
    samples: VecDeque<Sample>,
    mode: GestureMode,
    start_value: f64,
    value: f64,
}

impl GestureSession {
    fn new(event: &PointerEvent, now: Duration, mode: GestureMode) -> Self {
        let mut samples = VecDeque::with_capacity(VELOCITY_SAMPLES);
        samples.push_back(Sample {
            at: now,
            position: event.position,
        });
        Self {
            pointer_id: event.id,
            kind: event.kind,
            start: event.position,
            started_at: now,
            last: event.position,
            samples,
            mode,
            start_value: 0.0,
            value: 0.0,
        }
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn displacement(&self) -> (f64, f64) {
        (self.last.x - self.start.x, self.last.y - self.start.y)
    }

    /// Pixels per second over the retained samples.
    pub fn velocity(&self) -> Option<(f64, f64)> {
        let first = self.samples.front()?;
        let last = self.samples.back()?;
        let secs = last.at.checked_sub(first.at)?.as_secs_f64();
        if secs <= 0.0 {
            return None;
        }
        Some((
            (last.position.x - first.position.x) / secs,
            (last.position.y - first.position.y) / secs,
        ))
    }

    fn record(&mut self, now: Duration, position: Point) {
        if self.samples.len() == VELOCITY_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { at: now, position });
        self.last = position;
    }

    /// Only a pending session can take a mode.
    fn resolve(&mut self, mode: GestureMode) -> bool {
        if self.mode != GestureMode::Pending {
            return false;
        }
        trace!(?mode, "Gesture resolved");
        self.mode = mode;
        true
    }
}

#[derive(Debug, Clone, Copy)]
struct TapRelease {
    at: Duration,
    side: Side,
}

pub struct GestureRecognizer {
    long_press: Duration,
    double_tap_window: Duration,
    move_threshold: f64,
    brightness_travel: f64,
    volume_travel: f64,
    indicator_fade: Duration,
    rate_restore_grace: Duration,
    long_press_rate: f64,
    fullscreen_long_press_rate: f64,
    skip_seconds: f64,

    session: Option<GestureSession>,
    last_tap: Option<TapRelease>,
    tap_pending: bool,
    indicator: Option<Indicator>,
}

impl GestureRecognizer {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            long_press: config.long_press(),
            double_tap_window: config.double_tap_window(),
            move_threshold: config.move_threshold_px,
            brightness_travel: config.brightness_travel_px,
            volume_travel: config.volume_travel_px,
            indicator_fade: config.indicator_fade(),
            rate_restore_grace: config.rate_restore_grace(),
            long_press_rate: config.long_press_rate,
            fullscreen_long_press_rate: config.fullscreen_long_press_rate,
            skip_seconds: config.skip_seconds,
            session: None,
            last_tap: None,
            tap_pending: false,
            indicator: None,
        }
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn indicator(&self) -> Option<Indicator> {
        self.indicator
    }

    pub fn pointer_down(
        &mut self,
        event: &PointerEvent,
        now: Duration,
        ctx: &GestureContext,
        timers: &mut Timers,
    ) -> Vec<GestureCommand> {
        if event.target == HitTarget::Control || self.session.is_some() {
            return Vec::new();
        }

        let side = Side::of(event.position.x, ctx.width);
        let mut commands = Vec::new();

        if event.kind == PointerKind::Touch {
            if let Some(tap) = self.last_tap
                && tap.side == side
                && now.saturating_sub(tap.at) < self.double_tap_window
            {
                timers.cancel(TimerKind::TapCommit);
                timers.cancel(TimerKind::LongPress);
                self.tap_pending = false;
                self.last_tap = None;
                self.session = Some(GestureSession::new(event, now, GestureMode::DoubleTap));

                let delta = match side {
                    Side::Left => -self.skip_seconds,
                    Side::Right => self.skip_seconds,
                };
                debug!(?side, delta, "Double tap");
                commands.push(GestureCommand::SeekBy(delta));
                return commands;
            }

            if self.tap_pending {
                timers.cancel(TimerKind::TapCommit);
                self.tap_pending = false;
                commands.push(GestureCommand::TogglePlay);
            }
        }

        self.last_tap = None;
        self.session = Some(GestureSession::new(event, now, GestureMode::Pending));
        timers.arm(TimerKind::LongPress, now + self.long_press);
        commands
    }

    pub fn pointer_move(
        &mut self,
        event: &PointerEvent,
        now: Duration,
        ctx: &GestureContext,
        timers: &mut Timers,
    ) -> Vec<GestureCommand> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.pointer_id != event.id {
            return Vec::new();
        }
        session.record(now, event.position);

        if session.mode == GestureMode::Pending {
            let (dx, dy) = session.displacement();
            if dx.hypot(dy) <= self.move_threshold {
                return Vec::new();
            }
            timers.cancel(TimerKind::LongPress);

            if dx.abs() > dy.abs() {
                session.resolve(GestureMode::HorizontalSeek);
                return vec![GestureCommand::ScrubStarted];
            }

            let mode = match Side::of(session.start.x, ctx.width) {
                Side::Left => GestureMode::Brightness,
                Side::Right => GestureMode::Volume,
            };
            session.start_value = match mode {
                GestureMode::Brightness => ctx.brightness,
                _ => ctx.volume,
            };
            session.value = session.start_value;
            session.resolve(mode);
        }

        let travel = match session.mode {
            GestureMode::Brightness => self.brightness_travel,
            GestureMode::Volume => self.volume_travel,
            _ => return Vec::new(),
        };
        let rise = session.start.y - session.last.y;
        let value = clamp_unit(session.start_value + rise / travel);
        session.value = value;

        timers.arm(TimerKind::IndicatorFade, now + self.indicator_fade);
        if session.mode == GestureMode::Brightness {
            self.indicator = Some(Indicator::Brightness(value));
            vec![GestureCommand::SetBrightness(value)]
        } else {
            self.indicator = Some(Indicator::Volume(value));
            vec![GestureCommand::SetVolume(value)]
        }
    }

    pub fn pointer_up(
        &mut self,
        event: &PointerEvent,
        now: Duration,
        ctx: &GestureContext,
        timers: &mut Timers,
    ) -> Vec<GestureCommand> {
        if self
            .session
            .as_ref()
            .is_none_or(|session| session.pointer_id != event.id)
        {
            return Vec::new();
        }
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        timers.cancel(TimerKind::LongPress);

        let elapsed = now.saturating_sub(session.started_at);
        debug!(
            mode = ?session.mode,
            elapsed_ms = elapsed.as_millis() as u64,
            velocity = ?session.velocity(),
            "Gesture ended"
        );

        let side = Side::of(session.start.x, ctx.width);
        match session.mode {
            GestureMode::Pending if session.kind == PointerKind::Touch => {
                self.last_tap = Some(TapRelease { at: now, side });
                self.tap_pending = true;
                timers.arm(TimerKind::TapCommit, now + self.double_tap_window);
                Vec::new()
            }
            GestureMode::Pending => vec![GestureCommand::TogglePlay],
            GestureMode::DoubleTap => {
                self.last_tap = Some(TapRelease { at: now, side });
                Vec::new()
            }
            GestureMode::LongPress => {
                timers.arm(TimerKind::RateRestore, now + self.rate_restore_grace);
                Vec::new()
            }
            GestureMode::HorizontalSeek => vec![GestureCommand::ScrubEnded],
            GestureMode::Brightness | GestureMode::Volume => Vec::new(),
        }
    }

    /// Abandons the session, undoing any level change it made.
    pub fn pointer_cancel(&mut self, timers: &mut Timers) -> Vec<GestureCommand> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        timers.cancel(TimerKind::LongPress);
        debug!(mode = ?session.mode, "Gesture cancelled");

        match session.mode {
            GestureMode::Brightness => {
                self.clear_indicator(timers);
                vec![GestureCommand::SetBrightness(session.start_value)]
            }
            GestureMode::Volume => {
                self.clear_indicator(timers);
                vec![GestureCommand::SetVolume(session.start_value)]
            }
            GestureMode::LongPress => {
                timers.cancel(TimerKind::RateRestore);
                self.indicator = None;
                vec![GestureCommand::SetRate(1.0)]
            }
            GestureMode::HorizontalSeek => vec![GestureCommand::ScrubEnded],
            GestureMode::Pending | GestureMode::DoubleTap => Vec::new(),
        }
    }

    /// Handles an expired gesture timer.
    pub fn on_timer(
        &mut self,
        kind: TimerKind,
        ctx: &GestureContext,
        timers: &mut Timers,
    ) -> Vec<GestureCommand> {
        match kind {
            TimerKind::LongPress => {
                let Some(session) = self.session.as_mut() else {
                    return Vec::new();
                };
                if !session.resolve(GestureMode::LongPress) {
                    return Vec::new();
                }
                timers.cancel(TimerKind::RateRestore);
                let rate = if ctx.fullscreen {
                    self.fullscreen_long_press_rate
                } else {
                    self.long_press_rate
                };
                debug!(rate, "Long press");
                self.indicator = Some(Indicator::Speed(rate));
                vec![GestureCommand::SetRate(rate)]
            }
            TimerKind::TapCommit => {
                if std::mem::take(&mut self.tap_pending) {
                    vec![GestureCommand::TogglePlay]
                } else {
                    Vec::new()
                }
            }
            TimerKind::RateRestore => {
                if matches!(self.indicator, Some(Indicator::Speed(_))) {
                    self.indicator = None;
                }
                vec![GestureCommand::SetRate(1.0)]
            }
            TimerKind::IndicatorFade => {
                if matches!(
                    self.indicator,
                    Some(Indicator::Brightness(_) | Indicator::Volume(_))
                ) {
                    self.indicator = None;
                }
                Vec::new()
            }
            TimerKind::AutoHide | TimerKind::Revalidate => Vec::new(),
        }
    }

    fn clear_indicator(&mut self, timers: &mut Timers) {
        timers.cancel(TimerKind::IndicatorFade);
        self.indicator = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const WIDTH: f64 = 800.0;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn ctx() -> GestureContext {
        GestureContext {
            width: WIDTH,
            fullscreen: false,
            brightness: 1.0,
            volume: 0.5,
        }
    }

    fn touch(x: f64, y: f64) -> PointerEvent {
        PointerEvent {
            id: 1,
            kind: PointerKind::Touch,
            position: Point::new(x, y),
            target: HitTarget::Surface,
        }
    }

    struct Harness {
        recognizer: GestureRecognizer,
        timers: Timers,
        emitted: Vec<GestureCommand>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                recognizer: GestureRecognizer::new(&ControlConfig::default()),
                timers: Timers::new(),
                emitted: Vec::new(),
            }
        }

        fn advance(&mut self, now: Duration) {
            while let Some((kind, _)) = self.timers.pop_due(now) {
                let out = self.recognizer.on_timer(kind, &ctx(), &mut self.timers);
                self.emitted.extend(out);
            }
        }

        fn down(&mut self, event: PointerEvent, now: Duration) {
            self.advance(now);
            let out = self
                .recognizer
                .pointer_down(&event, now, &ctx(), &mut self.timers);
            self.emitted.extend(out);
        }

        fn moved(&mut self, event: PointerEvent, now: Duration) {
            self.advance(now);
            let out = self
                .recognizer
                .pointer_move(&event, now, &ctx(), &mut self.timers);
            self.emitted.extend(out);
        }

        fn up(&mut self, event: PointerEvent, now: Duration) {
            self.advance(now);
            let out = self
                .recognizer
                .pointer_up(&event, now, &ctx(), &mut self.timers);
            self.emitted.extend(out);
        }

        fn cancel(&mut self, now: Duration) {
            self.advance(now);
            let out = self.recognizer.pointer_cancel(&mut self.timers);
            self.emitted.extend(out);
        }
    }

    #[rstest]
    #[case::below_threshold(9.0, GestureMode::LongPress)]
    #[case::above_threshold(11.0, GestureMode::Volume)]
    fn movement_threshold_decides_long_press(#[case] dy: f64, #[case] expected: GestureMode) {
        let mut h = Harness::new();
        h.down(touch(600.0, 300.0), ms(0));
        h.moved(touch(600.0, 300.0 - dy), ms(200));
        h.advance(ms(400));

        assert_eq!(h.recognizer.session().map(|s| s.mode()), Some(expected));
    }

    #[rstest]
    #[case::inside_window(299, true)]
    #[case::outside_window(301, false)]
    fn second_tap_within_window_skips(#[case] gap_ms: u64, #[case] skips: bool) {
        let mut h = Harness::new();
        h.down(touch(700.0, 200.0), ms(0));
        h.up(touch(700.0, 200.0), ms(80));
        h.down(touch(690.0, 210.0), ms(80 + gap_ms));

        let seeked = h.emitted.contains(&GestureCommand::SeekBy(10.0));
        assert_eq!(seeked, skips);
        // A consumed first tap never toggles playback.
        assert_eq!(h.emitted.contains(&GestureCommand::TogglePlay), !skips);
    }

    #[test]
    fn left_double_tap_skips_back_and_chains() {
        let mut h = Harness::new();
        h.down(touch(100.0, 200.0), ms(0));
        h.up(touch(100.0, 200.0), ms(50));
        h.down(touch(100.0, 200.0), ms(150));
        h.up(touch(100.0, 200.0), ms(200));
        h.down(touch(100.0, 200.0), ms(350));
        h.up(touch(100.0, 200.0), ms(400));
        h.advance(ms(2000));

        assert_eq!(
            h.emitted,
            vec![GestureCommand::SeekBy(-10.0), GestureCommand::SeekBy(-10.0)]
        );
    }

    #[test]
    fn taps_on_opposite_halves_are_two_toggles() {
        let mut h = Harness::new();
        h.down(touch(100.0, 200.0), ms(0));
        h.up(touch(100.0, 200.0), ms(50));
        h.down(touch(700.0, 200.0), ms(150));
        h.up(touch(700.0, 200.0), ms(200));
        h.advance(ms(1000));

        assert_eq!(
            h.emitted,
            vec![GestureCommand::TogglePlay, GestureCommand::TogglePlay]
        );
    }

    #[test]
    fn single_touch_tap_commits_after_window() {
        let mut h = Harness::new();
        h.down(touch(400.0, 200.0), ms(0));
        h.up(touch(400.0, 200.0), ms(60));
        h.advance(ms(359));
        assert!(h.emitted.is_empty());
        h.advance(ms(360));
        assert_eq!(h.emitted, vec![GestureCommand::TogglePlay]);
    }

    #[test]
    fn mouse_click_toggles_immediately() {
        let mut h = Harness::new();
        let click = PointerEvent {
            kind: PointerKind::Mouse,
            ..touch(400.0, 200.0)
        };
        h.down(click, ms(0));
        h.up(click, ms(90));
        assert_eq!(h.emitted, vec![GestureCommand::TogglePlay]);
        assert!(!h.timers.is_armed(TimerKind::TapCommit));
    }

    #[test]
    fn control_hits_are_ignored() {
        let mut h = Harness::new();
        let event = PointerEvent {
            target: HitTarget::Control,
            ..touch(400.0, 780.0)
        };
        h.down(event, ms(0));
        assert!(h.recognizer.session().is_none());
        assert!(!h.timers.is_armed(TimerKind::LongPress));
    }

    #[test]
    fn long_press_speeds_up_then_restores_after_grace() {
        let mut h = Harness::new();
        h.down(touch(400.0, 200.0), ms(0));
        h.advance(ms(400));
        assert_eq!(h.emitted, vec![GestureCommand::SetRate(1.5)]);
        assert_eq!(h.recognizer.indicator(), Some(Indicator::Speed(1.5)));

        // Resolved modes stick even when the finger then travels.
        h.moved(touch(400.0, 20.0), ms(500));
        assert_eq!(h.emitted.len(), 1);

        h.up(touch(400.0, 20.0), ms(900));
        h.advance(ms(999));
        assert_eq!(h.emitted.len(), 1);
        h.advance(ms(1000));
        assert_eq!(h.emitted.last(), Some(&GestureCommand::SetRate(1.0)));
        assert_eq!(h.recognizer.indicator(), None);
    }

    #[test]
    fn fullscreen_long_press_doubles_rate() {
        let mut recognizer = GestureRecognizer::new(&ControlConfig::default());
        let mut timers = Timers::new();
        let fullscreen = GestureContext {
            fullscreen: true,
            ..ctx()
        };
        recognizer.pointer_down(&touch(400.0, 200.0), ms(0), &fullscreen, &mut timers);
        let out = recognizer.on_timer(TimerKind::LongPress, &fullscreen, &mut timers);
        assert_eq!(out, vec![GestureCommand::SetRate(2.0)]);
    }

    #[test]
    fn vertical_swipe_maps_travel_to_level() {
        let mut h = Harness::new();
        // Right half: volume, 200 px for the full range, starting from 0.5.
        h.down(touch(600.0, 400.0), ms(0));
        h.moved(touch(600.0, 340.0), ms(50));
        h.moved(touch(600.0, 200.0), ms(100));
        assert_eq!(h.emitted.last(), Some(&GestureCommand::SetVolume(1.0)));

        h.moved(touch(600.0, 460.0), ms(150));
        assert_eq!(h.emitted.last(), Some(&GestureCommand::SetVolume(0.2)));
        assert_eq!(h.recognizer.indicator().and_then(|i| i.percent()), Some(20));

        h.up(touch(600.0, 460.0), ms(200));
        assert_eq!(h.recognizer.indicator(), Some(Indicator::Volume(0.2)));
        h.advance(ms(1150));
        assert_eq!(h.recognizer.indicator(), None);
    }

    #[test]
    fn left_swipe_adjusts_brightness() {
        let mut h = Harness::new();
        h.down(touch(100.0, 100.0), ms(0));
        h.moved(touch(100.0, 250.0), ms(80));
        assert_eq!(h.emitted, vec![GestureCommand::SetBrightness(0.5)]);
    }

    #[test]
    fn cancel_reverts_level_and_clears_indicator() {
        let mut h = Harness::new();
        h.down(touch(100.0, 100.0), ms(0));
        h.moved(touch(100.0, 190.0), ms(80));
        h.cancel(ms(120));

        assert_eq!(h.emitted.last(), Some(&GestureCommand::SetBrightness(1.0)));
        assert_eq!(h.recognizer.indicator(), None);
        assert!(!h.timers.is_armed(TimerKind::IndicatorFade));
    }

    #[test]
    fn horizontal_drag_is_handed_to_scrubbing() {
        let mut h = Harness::new();
        h.down(touch(300.0, 200.0), ms(0));
        h.moved(touch(330.0, 205.0), ms(40));
        h.up(touch(360.0, 205.0), ms(120));
        assert_eq!(
            h.emitted,
            vec![GestureCommand::ScrubStarted, GestureCommand::ScrubEnded]
        );
        assert!(!h.timers.is_armed(TimerKind::LongPress));
    }

    #[test]
    fn velocity_uses_recent_samples() {
        let mut h = Harness::new();
        h.down(touch(300.0, 200.0), ms(0));
        h.moved(touch(400.0, 200.0), ms(500));
        let (vx, vy) = h.recognizer.session().and_then(|s| s.velocity()).unwrap();
        assert_eq!(vx, 200.0);
        assert_eq!(vy, 0.0);
    }
}
