//! Live-reload broadcast over Server-Sent Events.
//!
//! Every browser tab opens an `EventSource` on
//! [`LIVE_RELOAD_PATH`](crate::templates::LIVE_RELOAD_PATH). The handler
//! registers a [`Subscription`] with the shared [`ReloadHub`] and holds the
//! response open; after each successful rebuild the hub pushes one
//! `data: reload` event to every registered tab.
//!
//! Each client has a one-slot channel. A broadcast never waits: if a slow
//! client still has an undelivered signal, the new one is dropped, since one
//! pending reload is as good as two. Dropping the response (tab closed)
//! drops the subscription, which deregisters it.
//!
//! [`ReloadHub::close`] ends every open stream at once. The server calls it
//! on shutdown, since an event stream never finishes on its own and would
//! hold graceful shutdown open for as long as a tab stays connected.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Registry of connected live-reload clients.
#[derive(Debug, Default)]
pub struct ReloadHub {
    clients: Mutex<HashMap<u64, mpsc::Sender<()>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl ReloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn clients(&self) -> MutexGuard<'_, HashMap<u64, mpsc::Sender<()>>> {
        // The map stays consistent even if a holder panicked.
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new client. After [`close`](Self::close) the returned
    /// subscription is already ended.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(1);
        {
            let mut clients = self.clients();
            // Checked under the lock so a racing close cannot miss this client.
            if !self.closed.load(Ordering::Acquire) {
                clients.insert(id, tx);
                tracing::debug!(client = id, "Live-reload client connected");
            }
        }
        Subscription {
            id,
            rx,
            hub: Arc::clone(self),
        }
    }

    /// Signal every connected client. Returns how many were signalled;
    /// clients that already had a signal pending are skipped.
    pub fn broadcast(&self) -> usize {
        let clients = self.clients();
        let sent = clients
            .values()
            .filter(|tx| tx.try_send(()).is_ok())
            .count();
        tracing::debug!(sent, connected = clients.len(), "Broadcast reload");
        sent
    }

    /// End every subscription and refuse new ones. Pending signals are
    /// still delivered before the streams finish.
    pub fn close(&self) {
        let mut clients = self.clients();
        self.closed.store(true, Ordering::Release);
        let dropped = clients.len();
        clients.clear();
        tracing::debug!(clients = dropped, "Live-reload hub closed");
    }

    /// Number of currently registered clients.
    pub fn client_count(&self) -> usize {
        self.clients().len()
    }

    fn remove(&self, id: u64) {
        self.clients().remove(&id);
        tracing::debug!(client = id, "Live-reload client disconnected");
    }
}

/// One connected client. Deregisters itself when dropped.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<()>,
    hub: Arc<ReloadHub>,
}

impl Subscription {
    /// Wait for the next reload signal.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Take a pending reload signal without waiting.
    pub fn try_recv(&mut self) -> Option<()> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.remove(self.id);
    }
}

/// `GET /_reload`: an event stream that yields `reload` after each rebuild.
pub async fn sse_handler(State(hub): State<Arc<ReloadHub>>) -> impl IntoResponse {
    let subscription = hub.subscribe();
    let stream = futures::stream::unfold(subscription, |mut sub| async move {
        sub.recv()
            .await
            .map(|()| (Ok::<_, Infallible>(Event::default().data("reload")), sub))
    });

    (
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(stream).keep_alive(KeepAlive::default()),
    )
}
