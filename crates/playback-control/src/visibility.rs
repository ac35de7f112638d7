//! Auto-hiding transport controls.

use std::time::Duration;

use tracing::debug;

use crate::config::ControlConfig;
use crate::timer::{TimerKind, Timers};

/// Conditions that keep the controls on screen regardless of the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuppressFlags {
    /// Pointer is over the control bar.
    pub hovering: bool,
    /// Progress bar or a gesture scrub is being dragged.
    pub dragging: bool,
    pub menu_open: bool,
}

impl SuppressFlags {
    pub fn any(&self) -> bool {
        self.hovering || self.dragging || self.menu_open
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityTrigger {
    /// Pointer move, touch or key press.
    Interaction,
    Played,
    Paused,
    HoverEnter,
    HoverLeave,
    DragStarted,
    DragEnded,
    MenuOpened,
    MenuClosed,
    HideTimer,
    Revalidate,
}

#[derive(Debug, Clone)]
pub struct ControlVisibility {
    visible: bool,
    last_shown: Duration,
    suppress: SuppressFlags,
    hide_delay: Duration,
    revalidate_interval: Duration,
}

impl ControlVisibility {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            visible: true,
            last_shown: Duration::ZERO,
            suppress: SuppressFlags::default(),
            hide_delay: config.hide_delay(),
            revalidate_interval: config.revalidate_interval(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn last_shown(&self) -> Duration {
        self.last_shown
    }

    pub fn suppress(&self) -> SuppressFlags {
        self.suppress
    }

    /// Applies one transition. `playing` must be read from the media element
    /// when the trigger is handled, never remembered from when a timer was armed.
    pub fn apply(
        &mut self,
        trigger: VisibilityTrigger,
        playing: bool,
        now: Duration,
        timers: &mut Timers,
    ) {
        match trigger {
            VisibilityTrigger::Interaction => {}
            VisibilityTrigger::Played => {
                timers.arm(TimerKind::Revalidate, now + self.revalidate_interval);
            }
            VisibilityTrigger::Paused => {
                timers.cancel(TimerKind::AutoHide);
                timers.cancel(TimerKind::Revalidate);
                self.show(now);
                return;
            }
            VisibilityTrigger::HoverEnter => self.suppress.hovering = true,
            VisibilityTrigger::HoverLeave => self.suppress.hovering = false,
            VisibilityTrigger::DragStarted => self.suppress.dragging = true,
            VisibilityTrigger::DragEnded => self.suppress.dragging = false,
            VisibilityTrigger::MenuOpened => self.suppress.menu_open = true,
            VisibilityTrigger::MenuClosed => self.suppress.menu_open = false,
            VisibilityTrigger::HideTimer => {
                self.try_hide(playing, now);
                return;
            }
            VisibilityTrigger::Revalidate => {
                if playing {
                    timers.arm(TimerKind::Revalidate, now + self.revalidate_interval);
                }
                self.try_hide(playing, now);
                return;
            }
        }

        self.show(now);
        if playing && !self.suppress.any() {
            timers.arm(TimerKind::AutoHide, now + self.hide_delay);
        } else {
            timers.cancel(TimerKind::AutoHide);
        }
    }

    fn show(&mut self, now: Duration) {
        if !self.visible {
            debug!("Showing controls");
        }
        self.visible = true;
        self.last_shown = now;
    }

    fn try_hide(&mut self, playing: bool, now: Duration) {
        if self.visible
            && playing
            && !self.suppress.any()
            && now.saturating_sub(self.last_shown) >= self.hide_delay
        {
            debug!(
                idle_ms = now.saturating_sub(self.last_shown).as_millis() as u64,
                "Hiding controls"
            );
            self.visible = false;
        }
    }
}
