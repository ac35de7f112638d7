//! Re-requesting resources that failed for reasons likely to pass.
//!
//! Playlists and fragments get separate budgets: a playlist that cannot be
//! refreshed stalls the whole stream, while one missing segment only costs a
//! stall until the engine skips it. Playlists are also retried when the origin
//! answers with an empty body, which edges do while a live window rolls over.

use std::future::Future;
use std::time::Duration;

use rand::RngExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::LoaderError;
use crate::loader::{LoaderContext, ResourceKind};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt for master, level and audio playlists.
    pub playlist_retries: u32,
    /// Retries after the first attempt for segments and keys.
    pub fragment_retries: u32,
    /// Wait before the first retry. Each further retry waits twice as long.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the random extra wait, as a fraction of the delay.
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            playlist_retries: 3,
            fragment_retries: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_ratio: 0.2,
        }
    }
}

impl RetryPolicy {
    pub fn retries_for(&self, kind: ResourceKind) -> u32 {
        if kind.is_playlist() {
            self.playlist_retries
        } else {
            self.fragment_retries
        }
    }

    /// Whether `error` is worth another request for a resource of `kind`.
    pub fn should_retry(&self, kind: ResourceKind, error: &LoaderError) -> bool {
        match error {
            LoaderError::InvalidContent { .. } => kind.is_playlist(),
            other => other.is_retryable(),
        }
    }

    /// Wait before retry number `retry` (0 for the first).
    fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        let delay = self
            .base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay));

        if self.jitter_ratio <= 0.0 || delay.is_zero() {
            return delay;
        }
        let extra = rand::rng().random_range(0.0..self.jitter_ratio);
        delay.mul_f64(1.0 + extra).min(self.max_delay)
    }
}

/// Runs `attempt` until it succeeds, fails for good, or the budget for
/// `context.kind` runs out. The closure gets the attempt number, from 0.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    context: &LoaderContext,
    token: &CancellationToken,
    mut attempt: F,
) -> Result<T, LoaderError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LoaderError>>,
{
    let budget = policy.retries_for(context.kind);
    let mut tries = 0;
    loop {
        if token.is_cancelled() {
            return Err(LoaderError::Cancelled);
        }

        let error = match attempt(tries).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        if !policy.should_retry(context.kind, &error) {
            debug!(url = %context.url, kind = ?context.kind, error = %error, "Giving up on resource");
            return Err(error);
        }
        if tries >= budget {
            warn!(
                url = %context.url,
                kind = ?context.kind,
                attempts = tries + 1,
                error = %error,
                "Retries exhausted"
            );
            return Err(error);
        }

        let delay = policy.delay(tries);
        warn!(
            url = %context.url,
            kind = ?context.kind,
            retry = tries + 1,
            of = budget,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Re-requesting after transient failure"
        );
        tokio::select! {
            _ = token.cancelled() => return Err(LoaderError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        tries += 1;
    }
}
