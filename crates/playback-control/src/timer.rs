//! Deadlines for every timed concern of the player.
//!
//! Each concern owns at most one deadline: arming replaces whatever was armed
//! before, so timers for the same concern never overlap. Nothing here sleeps;
//! the owner asks for the next deadline and pops expired ones.

use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    LongPress,
    TapCommit,
    RateRestore,
    IndicatorFade,
    AutoHide,
    Revalidate,
}

impl TimerKind {
    const ALL: [TimerKind; 6] = [
        TimerKind::LongPress,
        TimerKind::TapCommit,
        TimerKind::RateRestore,
        TimerKind::IndicatorFade,
        TimerKind::AutoHide,
        TimerKind::Revalidate,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default, Clone)]
pub struct Timers {
    deadlines: [Option<Duration>; 6],
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, kind: TimerKind, at: Duration) {
        trace!(?kind, at_ms = at.as_millis() as u64, "Arming timer");
        self.deadlines[kind.slot()] = Some(at);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.deadlines[kind.slot()] = None;
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.deadlines[kind.slot()]
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadline(kind).is_some()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Removes and returns the earliest timer due at or before `now`, with its
    /// deadline. Ties resolve in declaration order of [`TimerKind`].
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerKind, Duration)> {
        let (kind, at) = TimerKind::ALL
            .iter()
            .filter_map(|&kind| self.deadline(kind).map(|at| (kind, at)))
            .filter(|&(_, at)| at <= now)
            .min_by_key(|&(kind, at)| (at, kind))?;
        self.cancel(kind);
        Some((kind, at))
    }
}
