//! Where finished exports go
//!
//! [`DownloadSink`] saves the bytes of a finished export and [`Notifier`]
//! tells the user how it went. Hosts plug in their own; the defaults write
//! into a directory and report through the log.

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Saves a finished export under its file name
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Persist `bytes` as `file_name` and return where it ended up.
    ///
    /// On error nothing may be left behind under `file_name`.
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<PathBuf>;
}

/// Writes exports into a directory
///
/// Bytes go to `{file_name}.part` first and are renamed into place once
/// fully written, so a failed save never leaves a truncated export.
#[derive(Debug, Clone)]
pub struct FsDownloadSink {
    output_dir: PathBuf,
}

impl FsDownloadSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl DownloadSink for FsDownloadSink {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let target = self.output_dir.join(file_name);
        let partial = self.output_dir.join(format!("{}.part", file_name));

        if let Err(e) = tokio::fs::write(&partial, &bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        tracing::debug!("Saved {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }
}

/// A user-facing message about one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success { title: String, message: String },
    Error { title: String, message: String },
}

impl Notification {
    pub fn title(&self) -> &str {
        match self {
            Notification::Success { title, .. } | Notification::Error { title, .. } => title,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::Success { message, .. } | Notification::Error { message, .. } => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error { .. })
    }
}

/// Shows notifications to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sends notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::Success { title, message } => tracing::info!("{}: {}", title, message),
            Notification::Error { title, message } => tracing::warn!("{}: {}", title, message),
        }
    }
}
