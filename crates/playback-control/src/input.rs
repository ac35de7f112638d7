//! Everything the player reacts to.

use crate::gesture::PointerEvent;
use crate::media::MediaEvent;
use crate::recovery::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    K,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    M,
    F,
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_key_value(value: &str) -> Self {
        match value {
            " " | "Spacebar" => Key::Space,
            "k" | "K" => Key::K,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "m" | "M" => Key::M,
            "f" | "F" => Key::F,
            _ => Key::Other,
        }
    }
}

/// Buttons, sliders and menus of the control bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    TogglePlay,
    Play,
    Pause,
    SkipBy(f64),
    SeekToFraction(f64),
    SetVolume(f64),
    ToggleMute,
    SetRate(f64),
    ToggleFullscreen,
    OpenMenu,
    CloseMenu,
    ProgressDragStart,
    ProgressDragMove(f64),
    ProgressDragEnd(f64),
    HoverEnter,
    HoverLeave,
    Retry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    Pointer {
        phase: PointerPhase,
        event: PointerEvent,
    },
    Key(Key),
    Control(ControlAction),
    Media(MediaEvent),
    Engine(EngineError),
    FullscreenChanged(bool),
    Resize {
        width: f64,
        height: f64,
    },
}
