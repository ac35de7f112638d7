//! Consumers of playback progress and player analytics.

use serde_json::Value;

/// Receives every time-update tick. Throttling and persistence are the
/// receiver's business.
pub trait ProgressSink {
    fn on_time_update(&mut self, current_time: f64, duration: f64);

    fn on_ended(&mut self) {}
}

/// Store of titles the user is part-way through.
pub trait WatchingStore {
    fn update(
        &mut self,
        slug: &str,
        watch_time_secs: f64,
        total_duration_secs: f64,
        episode_slug: Option<&str>,
    );

    fn remove(&mut self, slug: &str);
}

/// Forwards progress of one title (and episode) into a [`WatchingStore`].
#[derive(Debug)]
pub struct WatchingProgress<S> {
    store: S,
    slug: String,
    episode_slug: Option<String>,
}

impl<S: WatchingStore> WatchingProgress<S> {
    pub fn new(store: S, slug: impl Into<String>, episode_slug: Option<String>) -> Self {
        Self {
            store,
            slug: slug.into(),
            episode_slug,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: WatchingStore> ProgressSink for WatchingProgress<S> {
    fn on_time_update(&mut self, current_time: f64, duration: f64) {
        if duration <= 0.0 {
            return;
        }
        self.store.update(
            &self.slug,
            current_time,
            duration,
            self.episode_slug.as_deref(),
        );
    }

    fn on_ended(&mut self) {
        self.store.remove(&self.slug);
    }
}

/// Fire-and-forget event sink. Implementations must not block.
pub trait AnalyticsSink {
    fn track(&self, event: &str, params: Value);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnalytics;

impl AnalyticsSink for NoAnalytics {
    fn track(&self, _event: &str, _params: Value) {}
}
