//! Reaction to fatal errors reported by the adaptive playback engine.

use tracing::{debug, error, warn};

/// Recovery entry points of the adaptive playback engine.
pub trait AbrEngine {
    /// Restarts loading after a network failure.
    fn start_load(&mut self) -> Result<(), RecoveryFailed>;
    /// Attempts to recover from a decode or buffer failure.
    fn recover_media_error(&mut self) -> Result<(), RecoveryFailed>;
    /// Reloads the source from scratch.
    fn reload(&mut self) -> Result<(), RecoveryFailed>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("engine recovery failed: {0}")]
pub struct RecoveryFailed(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    Network,
    Media,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub fatal: bool,
    pub details: String,
}

impl EngineError {
    pub fn fatal(kind: EngineErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            fatal: true,
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    Loading,
    Ready,
    Recovering { attempt: u32 },
    /// Playback stopped; the user may retry.
    Failed { reason: String },
}

impl PlayerStatus {
    pub fn can_retry(&self) -> bool {
        matches!(self, PlayerStatus::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Recovery {
    max_attempts: u32,
    attempts: u32,
    status: PlayerStatus,
}

impl Recovery {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempts: 0,
            status: PlayerStatus::Loading,
        }
    }

    pub fn status(&self) -> &PlayerStatus {
        &self.status
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn on_error(&mut self, err: &EngineError, engine: &mut dyn AbrEngine) {
        if !err.fatal {
            debug!(kind = ?err.kind, details = %err.details, "Non-fatal engine error");
            return;
        }
        if self.status.can_retry() {
            return;
        }

        self.attempts += 1;
        if self.attempts > self.max_attempts {
            self.fail(format!(
                "gave up after {} recovery attempts: {}",
                self.max_attempts, err.details
            ));
            return;
        }

        warn!(
            kind = ?err.kind,
            attempt = self.attempts,
            details = %err.details,
            "Fatal engine error, recovering"
        );
        let result = match err.kind {
            EngineErrorKind::Network => engine.start_load(),
            EngineErrorKind::Media => engine.recover_media_error(),
            EngineErrorKind::Other => {
                self.fail(err.details.clone());
                return;
            }
        };
        match result {
            Ok(()) => {
                self.status = PlayerStatus::Recovering {
                    attempt: self.attempts,
                }
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Metadata arrived for the current source.
    pub fn on_loaded(&mut self) {
        if self.status == PlayerStatus::Loading {
            self.status = PlayerStatus::Ready;
        }
    }

    /// Playback advanced, so earlier failures are behind us.
    pub fn on_progress(&mut self) {
        if matches!(
            self.status,
            PlayerStatus::Loading | PlayerStatus::Recovering { .. }
        ) {
            debug!(attempts = self.attempts, "Playback progressing");
            self.status = PlayerStatus::Ready;
        }
        if !self.status.can_retry() {
            self.attempts = 0;
        }
    }

    /// Reloads after a terminal failure; a no-op otherwise.
    pub fn retry(&mut self, engine: &mut dyn AbrEngine) {
        if !self.status.can_retry() {
            return;
        }
        self.attempts = 0;
        match engine.reload() {
            Ok(()) => self.status = PlayerStatus::Loading,
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn fail(&mut self, reason: String) {
        error!(%reason, "Playback failed");
        self.status = PlayerStatus::Failed { reason };
    }
}
