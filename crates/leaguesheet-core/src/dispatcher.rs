// Lookup dispatcher: a fixed pool of worker tasks draining one FIFO queue.
//
// The form submits requests without waiting. Each worker resolves the typed
// name, asks the ability source for the record, and sends the finished
// result back to the UI loop over an mpsc channel. Workers never touch form
// state.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::champion::{LookupRequest, LookupResult};
use crate::directory::ChampionDirectory;
use crate::source::{AbilitySource, LookupError};

/// Resolve and fetch one request. Every failure becomes a not-found result
/// for the request's row.
pub async fn perform_lookup(
    source: &dyn AbilitySource,
    directory: &ChampionDirectory,
    request: &LookupRequest,
) -> LookupResult {
    let Some(canonical) = directory.resolve(&request.raw_name) else {
        debug!(row = request.row_index, name = %request.raw_name, "no directory match");
        return LookupResult::not_found(request.row_index);
    };

    match source.fetch_abilities(&canonical, request.view_mode).await {
        Ok(record) => LookupResult::found(request.row_index, &record, request.view_mode),
        Err(LookupError::NotFound(id)) => {
            debug!(row = request.row_index, "{} has no ability data", id);
            LookupResult::not_found(request.row_index)
        }
        Err(e) => {
            warn!("Lookup of {} for row {} failed: {}", canonical, request.row_index, e);
            LookupResult::not_found(request.row_index)
        }
    }
}

/// Handle to the worker pool.
///
/// Dropping the handle closes the queue; workers finish what they hold and
/// exit.
pub struct LookupDispatcher {
    queue: Option<mpsc::UnboundedSender<LookupRequest>>,
    workers: Vec<JoinHandle<()>>,
}

impl LookupDispatcher {
    /// Spawn `workers` tasks (at least one). Each finished lookup is passed
    /// through `wrap` and sent on `out`.
    pub fn start<T, F>(
        workers: usize,
        source: Arc<dyn AbilitySource>,
        directory: ChampionDirectory,
        out: mpsc::Sender<T>,
        wrap: F,
    ) -> Self
    where
        T: Send + 'static,
        F: Fn(LookupResult) -> T + Send + Sync + 'static,
    {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel::<LookupRequest>();
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let wrap = Arc::new(wrap);
        let count = workers.max(1);

        let workers = (0..count)
            .map(|id| {
                let queue_rx = Arc::clone(&queue_rx);
                let source = Arc::clone(&source);
                let directory = directory.clone();
                let out = out.clone();
                let wrap = Arc::clone(&wrap);
                tokio::spawn(async move {
                    loop {
                        // Taking the lock hands the next queued request to
                        // exactly one worker, in submission order.
                        let next = queue_rx.lock().await.recv().await;
                        let Some(request) = next else {
                            break;
                        };
                        let result = perform_lookup(source.as_ref(), &directory, &request).await;
                        if out.send(wrap(result)).await.is_err() {
                            debug!(worker = id, "result channel closed");
                            break;
                        }
                    }
                    debug!(worker = id, "lookup worker exiting");
                })
            })
            .collect();

        info!("Lookup dispatcher started with {} workers", count);
        LookupDispatcher {
            queue: Some(queue_tx),
            workers,
        }
    }

    /// Queue a request. Never blocks. Returns `false` once the dispatcher has
    /// been shut down.
    pub fn submit(&self, request: LookupRequest) -> bool {
        match &self.queue {
            Some(queue) => queue.send(request).is_ok(),
            None => false,
        }
    }

    pub fn submit_all(&self, requests: impl IntoIterator<Item = LookupRequest>) -> usize {
        requests
            .into_iter()
            .filter(|request| self.submit(request.clone()))
            .count()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue. Requests already queued are still served.
    pub fn shutdown(&mut self) {
        self.queue = None;
    }

    /// Close the queue and wait for every worker to exit.
    pub async fn join(mut self) {
        self.shutdown();
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.await {
                warn!("Lookup worker ended abnormally: {}", e);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
