//! Filesystem watching and the rebuild loop.
//!
//! ```text
//! notify callback ──blocking_send──► mpsc ──► rebuild_loop
//!                                              │ wait for a relevant event
//!                                              │ swallow the rest of the burst
//!                                              │ rebuild (blocking pool)
//!                                              └─► broadcast on success
//! ```
//!
//! Editors emit several events per save (create temp, write, rename, chmod).
//! Events arriving within the debounce window of each other are treated as
//! one change, so one save is one rebuild and one reload. Builds never
//! overlap: the loop waits for each rebuild before reading more events, and
//! anything that arrived meanwhile triggers the next one.

use super::Rebuild;
use super::live_reload::ReloadHub;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Quiet period that ends a burst of events.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Capacity of the channel between the notify thread and the rebuild loop.
pub const EVENT_BUFFER: usize = 256;

/// Kind of filesystem change that warrants a rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// Map a notify event kind to a change, ignoring reads and metadata-only
/// updates.
pub fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Start watching `dirs` recursively, forwarding raw events into `tx`.
///
/// Directories that cannot be watched (missing, permissions) are logged and
/// skipped. The returned watcher must be kept alive for events to flow.
pub fn watch(
    dirs: &[PathBuf],
    tx: mpsc::Sender<Event>,
) -> Result<RecommendedWatcher, notify::Error> {
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            // Callback runs on notify's own thread
            Ok(event) => {
                let _ = tx.blocking_send(event);
            }
            Err(e) => tracing::warn!(error = %e, "File watcher error"),
        }
    })?;

    for dir in dirs {
        match watcher.watch(dir, RecursiveMode::Recursive) {
            Ok(()) => tracing::debug!(dir = %dir.display(), "Watching"),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "Cannot watch directory, skipping"),
        }
    }

    Ok(watcher)
}

/// Outcome of one pass through the loop, reported for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// Rebuilt and signalled this many clients.
    Reloaded(usize),
    /// The build failed; the previous output stays in place.
    Failed,
}

/// Run one rebuild on the blocking pool and broadcast on success.
pub async fn rebuild_once<R: Rebuild>(builder: &Arc<R>, hub: &ReloadHub) -> RebuildOutcome {
    let started = Instant::now();
    let task_builder = Arc::clone(builder);
    let result = tokio::task::spawn_blocking(move || task_builder.rebuild()).await;

    match result {
        Ok(Ok(())) => {
            let sent = hub.broadcast();
            tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                clients = sent,
                "Rebuilt site"
            );
            RebuildOutcome::Reloaded(sent)
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Rebuild failed, serving previous output");
            RebuildOutcome::Failed
        }
        Err(e) => {
            tracing::error!(error = %e, "Rebuild task panicked, serving previous output");
            RebuildOutcome::Failed
        }
    }
}

/// Wait until no event has arrived for `window`. Returns false when the
/// channel closed while draining.
async fn drain_burst(rx: &mut mpsc::Receiver<Event>, window: Duration) -> bool {
    loop {
        match tokio::time::timeout(window, rx.recv()).await {
            Ok(Some(event)) => {
                tracing::trace!(kind = ?event.kind, "Coalesced event");
            }
            Ok(None) => return false,
            Err(_) => return true,
        }
    }
}

/// Consume events until the channel closes, rebuilding once per burst.
pub async fn rebuild_loop<R: Rebuild>(
    mut rx: mpsc::Receiver<Event>,
    builder: Arc<R>,
    hub: Arc<ReloadHub>,
    debounce: Duration,
) {
    while let Some(event) = rx.recv().await {
        let Some(kind) = classify(&event.kind) else {
            continue;
        };
        tracing::debug!(?kind, paths = ?event.paths, "Change detected");

        let open = drain_burst(&mut rx, debounce).await;
        rebuild_once(&builder, &hub).await;
        if !open {
            break;
        }
    }
    tracing::debug!("Watcher channel closed, rebuild loop exiting");
}
