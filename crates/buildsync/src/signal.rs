//! Interaction with the outside world: Ctrl-C and the publish marker.

use std::path::Path;

use anyhow::{Context, Result};
use buildsync_fs::AtomicWriteOptions;
use chrono::{DateTime, SecondsFormat, TimeZone};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `token` on the first Ctrl-C. Items already staging still finish.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    tracing::warn!("interrupted; finishing in-flight items and flushing the manifest");
                    token.cancel();
                }
                Err(err) => tracing::warn!(error = %err, "cannot listen for Ctrl-C"),
            },
        }
    })
}

/// Commit message for a publish step, stamped with `now`.
pub fn publish_message<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Updated DB as of - {}",
        now.to_rfc3339_opts(SecondsFormat::Secs, false)
    )
}

/// Atomically write `message` to `path`, for an external commit step to pick up.
pub fn write_publish_marker(path: &Path, message: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut content = message.as_bytes().to_vec();
    content.push(b'\n');
    buildsync_fs::atomic_write(path, &content, AtomicWriteOptions::default())
        .with_context(|| format!("failed to write publish marker {}", path.display()))
}
