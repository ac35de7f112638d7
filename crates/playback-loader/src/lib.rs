//! # Playback Loader
//!
//! The resource-loading hook of the adaptive playback engine. [`HttpLoader`]
//! fetches playlists, segments and keys with retry and backoff;
//! [`AdFilteringLoader`] wraps any loader and rewrites playlist responses
//! through the ad filter before the engine parses them.

pub mod config;
pub mod error;
pub mod interceptor;
pub mod loader;
pub mod retry;

pub use config::LoaderConfig;
pub use error::LoaderError;
pub use interceptor::{AdFilteringLoader, FilterStats};
pub use loader::{HttpLoader, LoaderContext, LoaderResponse, PlaylistLoader, ResourceKind};
pub use retry::{RetryPolicy, retry_with_backoff};
