//! Fullscreen access across platforms.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FullscreenError {
    #[error("fullscreen is not available")]
    Unsupported,
    #[error("fullscreen request rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// No document-level fullscreen; only the media element can go fullscreen.
    Ios,
    Standard,
}

impl Platform {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if ["iPhone", "iPad", "iPod"]
            .iter()
            .any(|device| user_agent.contains(device))
        {
            Platform::Ios
        } else {
            Platform::Standard
        }
    }
}

pub type FullscreenHandler = Box<dyn Fn(bool)>;

/// Document-level fullscreen for the player container.
///
/// Requests complete asynchronously and can be denied, so the active state is
/// only ever learned from change notifications.
pub trait FullscreenAdapter {
    fn request(&self) -> Result<(), FullscreenError>;
    fn exit(&self) -> Result<(), FullscreenError>;
    fn on_fullscreen_change(&self, handler: FullscreenHandler) -> Subscription;
}

/// Registration returned by [`FullscreenAdapter::on_fullscreen_change`];
/// unsubscribes when dropped.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn empty() -> Self {
        Self { unsubscribe: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Adapter for environments without any fullscreen API.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFullscreen;

impl FullscreenAdapter for NoFullscreen {
    fn request(&self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unsupported)
    }

    fn exit(&self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unsupported)
    }

    fn on_fullscreen_change(&self, _handler: FullscreenHandler) -> Subscription {
        Subscription::empty()
    }
}
