//! Synchronizes locally built theme assets with a Scroll Viewport theme.
//!
//! [`ViewportTheme`] resolves configuration, looks up the remote theme and
//! hands out [`UploadBatch`]es that collect files from a build pipeline and
//! push them in one request. Upload and delete failures are reported through
//! hooks, [`events`] and the log instead of aborting the pipeline.

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod mapper;
pub mod remove;
pub mod source;
pub mod web_api;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use batch::{UploadBatch, UploadOutcome};
pub use client::ViewportTheme;
pub use config::{Config, NoProfiles, Options, ProfileStore, Target};
pub use error::{ConfigError, Error, RemoteError, Result};
pub use events::{Event, EventKind, Notifier};
pub use identity::ThemeIdentity;
pub use remove::RemoveOutcome;
pub use source::SourceFile;
