//! QrColorService - caller handle plus the single flush worker
//!
//! `resolve` never waits on storage: a new allocation lands in the pending
//! buffer and a `Merge` request goes onto an unbounded channel. The worker
//! drains every queued request before writing, so a burst of allocations
//! becomes one durable write.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::allocator::ColorAllocator;
use super::cache::PersistenceCache;
use super::state::ColorState;
use crate::config::ColorConfig;
use crate::core::QrColors;
use crate::storage::KeyValueStore;

#[derive(Debug, Error)]
pub enum ColorError {
    #[error("flush worker stopped")]
    WorkerStopped,
}

#[derive(Debug)]
enum FlushRequest {
    /// New entries are waiting in the pending buffer
    Merge,
    /// Completes once everything queued before it is written
    Barrier(oneshot::Sender<()>),
}

/// Cloneable caller handle. All clones share one table.
#[derive(Clone)]
pub struct QrColorService {
    state: Arc<Mutex<ColorState>>,
    queue: mpsc::UnboundedSender<FlushRequest>,
    loaded: watch::Receiver<bool>,
}

impl QrColorService {
    /// Build the handle and its worker. Nothing is loaded or written until
    /// the worker runs.
    pub fn new(store: Arc<dyn KeyValueStore>, config: &ColorConfig) -> (Self, FlushWorker) {
        let allocator = match config.seed {
            Some(seed) => ColorAllocator::seeded(seed),
            None => ColorAllocator::new(),
        }
        .with_max_attempts(config.max_attempts);
        let state = Arc::new(Mutex::new(ColorState::new(allocator, config.privileged.iter().cloned())));
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (loaded_tx, loaded_rx) = watch::channel(false);

        let service = Self { state: state.clone(), queue: queue_tx, loaded: loaded_rx };
        let worker = FlushWorker {
            state,
            cache: PersistenceCache::new(store, config.storage_key.clone()),
            queue: queue_rx,
            loaded: loaded_tx,
            shutdown: None,
        };
        (service, worker)
    }

    /// Build and spawn the worker on the current tokio runtime.
    pub fn start(store: Arc<dyn KeyValueStore>, config: &ColorConfig) -> Self {
        let (service, worker) = Self::new(store, config);
        tokio::spawn(worker.run());
        service
    }

    /// Colors for `address`. `None` means no wallet is loaded yet.
    pub fn resolve(&self, address: Option<&str>) -> QrColors {
        let resolution = self.lock().resolve(address);
        if resolution.allocated && self.queue.send(FlushRequest::Merge).is_err() {
            tracing::warn!("flush worker gone, allocation kept in memory only");
        }
        resolution.colors
    }

    /// True once the persisted table has been read (or failed to read).
    pub fn is_loaded(&self) -> bool { *self.loaded.borrow() }

    pub async fn wait_loaded(&self) -> Result<(), ColorError> {
        let mut loaded = self.loaded.clone();
        loaded.wait_for(|ready| *ready).await.map(|_| ()).map_err(|_| ColorError::WorkerStopped)
    }

    /// Wait until every allocation made so far has been merged and written.
    /// A failed write still counts as flushed; it is logged by the worker.
    pub async fn flush(&self) -> Result<(), ColorError> {
        let (tx, rx) = oneshot::channel();
        self.queue.send(FlushRequest::Barrier(tx)).map_err(|_| ColorError::WorkerStopped)?;
        rx.await.map_err(|_| ColorError::WorkerStopped)
    }

    /// Every known assignment, merged or not
    pub fn assignments(&self) -> BTreeMap<String, String> { self.lock().snapshot() }

    fn lock(&self) -> MutexGuard<'_, ColorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Single consumer of flush requests. Loads the persisted table before it
/// processes anything, so no write can clobber an unread record.
pub struct FlushWorker {
    state: Arc<Mutex<ColorState>>,
    cache: PersistenceCache,
    queue: mpsc::UnboundedReceiver<FlushRequest>,
    loaded: watch::Sender<bool>,
    shutdown: Option<broadcast::Receiver<()>>,
}

impl FlushWorker {
    /// Stop (after a final merge) when the shutdown signal fires
    pub fn with_shutdown(mut self, shutdown: broadcast::Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Runs until every service handle is dropped or shutdown fires.
    pub async fn run(mut self) {
        let loaded = self.cache.load().await;
        let entries = loaded.len();
        self.lock().apply_loaded(loaded);
        self.loaded.send_replace(true);
        tracing::info!(entries, key = %self.cache.key(), "QR colors ready");

        while let Some(first) = self.next_request().await {
            let mut batch = vec![first];
            while let Ok(request) = self.queue.try_recv() {
                batch.push(request);
            }
            self.process(batch).await;
        }

        // Closed or shut down: settle whatever is still queued.
        self.queue.close();
        let mut rest = Vec::new();
        while let Ok(request) = self.queue.try_recv() {
            rest.push(request);
        }
        self.process(rest).await;
        tracing::debug!("flush worker stopped");
    }

    async fn next_request(&mut self) -> Option<FlushRequest> {
        loop {
            let Some(shutdown) = self.shutdown.as_mut() else {
                return self.queue.recv().await;
            };
            let signal = tokio::select! {
                request = self.queue.recv() => return request,
                signal = shutdown.recv() => signal,
            };
            match signal {
                // Handle dropped without firing: keep serving until the
                // service handles drop.
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("shutdown handle dropped, flush worker keeps running");
                    self.shutdown = None;
                }
                _ => {
                    tracing::info!("flush worker shutting down");
                    return None;
                }
            }
        }
    }

    async fn process(&self, batch: Vec<FlushRequest>) {
        let merges = batch.iter().filter(|r| matches!(r, FlushRequest::Merge)).count();
        self.merge().await;
        tracing::trace!(requests = batch.len(), merges, "flush batch processed");

        for request in batch {
            if let FlushRequest::Barrier(done) = request {
                let _ = done.send(());
            }
        }
    }

    /// Pending buffer into table, then one write of the whole table.
    /// The in-memory table stays authoritative if the write fails.
    async fn merge(&self) {
        let snapshot = {
            let mut state = self.lock();
            if !state.has_pending() {
                return;
            }
            state.merge_pending()
        };
        if self.cache.save(&snapshot).await {
            tracing::debug!(entries = snapshot.len(), "color assignments saved");
        }
    }

    fn lock(&self) -> MutexGuard<'_, ColorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Shutdown;
    use crate::storage::MemoryStore;

    fn service(store: &MemoryStore) -> (QrColorService, FlushWorker) {
        QrColorService::new(Arc::new(store.clone()), &ColorConfig::default().with_seed(11))
    }

    #[tokio::test]
    async fn not_loaded_until_worker_runs() {
        let store = MemoryStore::new();
        let (svc, worker) = service(&store);
        assert!(!svc.is_loaded());

        tokio::spawn(worker.run());
        svc.wait_loaded().await.unwrap();
        assert!(svc.is_loaded());
    }

    #[tokio::test]
    async fn burst_is_one_write() {
        let store = MemoryStore::new();
        let (svc, worker) = service(&store);
        tokio::spawn(worker.run());
        svc.wait_loaded().await.unwrap();

        let a = svc.resolve(Some("addrA")).foreground;
        let b = svc.resolve(Some("addrB")).foreground;
        let c = svc.resolve(Some("addrC")).foreground;
        svc.flush().await.unwrap();

        assert_eq!(store.write_count(), 1);
        let stored: BTreeMap<String, String> =
            serde_json::from_str(&store.record("btcon_qr_color_assignments").unwrap()).unwrap();
        assert_eq!(stored.get("addrA"), Some(&a));
        assert_eq!(stored.get("addrB"), Some(&b));
        assert_eq!(stored.get("addrC"), Some(&c));
    }

    #[tokio::test]
    async fn flush_without_allocations_writes_nothing() {
        let store = MemoryStore::new();
        let (svc, worker) = service(&store);
        tokio::spawn(worker.run());

        svc.resolve(None);
        svc.resolve(Some(crate::core::keys::qr::PRIVILEGED_ADDRESSES[0]));
        svc.flush().await.unwrap();
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn dropped_worker_reports_stopped() {
        let store = MemoryStore::new();
        let (svc, worker) = service(&store);
        drop(worker);

        // Allocation still works in memory.
        let first = svc.resolve(Some("addrA"));
        assert_eq!(svc.resolve(Some("addrA")), first);
        assert!(matches!(svc.flush().await, Err(ColorError::WorkerStopped)));
        assert!(matches!(svc.wait_loaded().await, Err(ColorError::WorkerStopped)));
    }

    #[tokio::test]
    async fn dropped_shutdown_handle_keeps_worker_running() {
        let store = MemoryStore::new();
        let (svc, worker) = service(&store);
        let signal = {
            let shutdown = Shutdown::new();
            shutdown.subscribe()
        };
        let handle = tokio::spawn(worker.with_shutdown(signal).run());
        svc.wait_loaded().await.unwrap();

        let qr = svc.resolve(Some("addrA"));
        svc.flush().await.unwrap();
        assert!(!handle.is_finished());

        let stored: BTreeMap<String, String> =
            serde_json::from_str(&store.record("btcon_qr_color_assignments").unwrap()).unwrap();
        assert_eq!(stored.get("addrA"), Some(&qr.foreground));

        // Dropping the last service handle still stops it.
        drop(svc);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn worker_exits_when_handles_drop() {
        let store = MemoryStore::new();
        let (svc, worker) = service(&store);
        let handle = tokio::spawn(worker.run());

        svc.resolve(Some("addrA"));
        drop(svc);
        handle.await.unwrap();

        // Final merge ran before exit.
        assert_eq!(store.write_count(), 1);
    }
}
