//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


//! Registry of live session workers
//!
//! The registry is the single source of truth for admission: a worker is registered iff it
//! is live. Entries are reserved under the lock *before* the worker task is spawned and are
//! removed by a [`Registration`] guard owned by the task, so removal happens exactly once on
//! every exit path (return, error, panic, abort).

use crate::{ConnectionId, Result, ServiceError};
use metrics::gauge;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Bookkeeping for one live worker.
///
/// `abort` is `None` while the slot is only reserved.
struct WorkerSlot {
    cancel: CancellationToken,
    abort: Option<AbortHandle>,
}

/// Mutex guarded set of live workers
pub struct WorkerRegistry {
    workers: Mutex<HashMap<ConnectionId, WorkerSlot>>,
    /// Next connection ID (monotonically increasing)
    next_id: AtomicU64,
    drained: Notify,
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            workers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            drained: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, WorkerSlot>> {
        // A panicking worker never holds the lock across user code, so the map is intact
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve a slot and spawn the worker built by `build` onto the current runtime.
    ///
    /// The slot is counted from the moment it is reserved. When no runtime is available the
    /// reservation is released, `build` is dropped unused (closing anything it captured),
    /// and [`ServiceError::SpawnFailed`] is returned.
    pub fn spawn<F, Fut>(self: &Arc<Self>, build: F) -> Result<ConnectionId>
    where
        F: FnOnce(Registration) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let registration = self.reserve();
        let id = registration.id;

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                drop(registration);
                return Err(ServiceError::SpawnFailed(err.to_string()));
            }
        };

        let task = handle.spawn(build(registration));

        // The task may already have finished and removed itself
        if let Some(slot) = self.lock().get_mut(&id) {
            slot.abort = Some(task.abort_handle());
        }
        Ok(id)
    }

    fn reserve(self: &Arc<Self>) -> Registration {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let cancel = CancellationToken::new();

        let size = {
            let mut workers = self.lock();
            workers.insert(
                id,
                WorkerSlot {
                    cancel: cancel.clone(),
                    abort: None,
                },
            );
            workers.len()
        };
        gauge!("faketelnetd.connections.active").increment(1.0);
        debug!(connection_id = %id, "registered worker ({} live)", size);

        Registration {
            id,
            cancel,
            registry: Arc::clone(self),
        }
    }

    fn deregister(&self, id: ConnectionId) {
        let (removed, size) = {
            let mut workers = self.lock();
            let removed = workers.remove(&id).is_some();
            (removed, workers.len())
        };
        if removed {
            gauge!("faketelnetd.connections.active").decrement(1.0);
            debug!(connection_id = %id, "deregistered worker ({} live)", size);
        }
        if size == 0 {
            self.drained.notify_waiters();
        }
    }

    /// Number of live (or reserved) workers
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no worker is live
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// True while `id` is registered
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Identifiers of all live workers, in ascending order
    pub fn ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = self.lock().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Request cooperative cancellation of every registered worker.
    ///
    /// Tokens are collected under the lock and cancelled after it is released. Returns
    /// how many workers were signalled.
    pub fn cancel_all(&self) -> usize {
        let tokens: Vec<CancellationToken> =
            self.lock().values().map(|slot| slot.cancel.clone()).collect();
        for token in &tokens {
            token.cancel();
        }
        tokens.len()
    }

    /// Forcefully abort every worker that is still registered. Returns how many were aborted.
    pub fn abort_all(&self) -> usize {
        let handles: Vec<AbortHandle> = self
            .lock()
            .values()
            .filter_map(|slot| slot.abort.clone())
            .collect();
        for handle in &handles {
            handle.abort();
        }
        handles.len()
    }

    /// Wait until the registry is empty or `timeout` elapses. Returns true when drained.
    pub async fn wait_drained(&self, timeout: Duration) -> bool {
        let drained = async {
            loop {
                let notified = self.drained.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.is_empty() {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, drained).await.is_ok()
    }
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("live", &self.len())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

/// Proof of registration owned by a worker task.
///
/// Dropping it removes the worker from the registry.
pub struct Registration {
    id: ConnectionId,
    cancel: CancellationToken,
    registry: Arc<WorkerRegistry>,
}

impl Registration {
    /// Identifier assigned to the worker
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Token cancelled when shutdown asks this worker to stop
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_registered_while_running() {
        let registry = Arc::new(WorkerRegistry::new());
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let id = registry
            .spawn(|registration| async move {
                let _registration = registration;
                let _ = release_rx.await;
            })
            .unwrap();

        assert_eq!(id, ConnectionId::new(1));
        assert!(registry.contains(id));
        assert_eq!(registry.ids(), vec![id]);

        release_tx.send(()).unwrap();
        assert!(registry.wait_drained(Duration::from_secs(5)).await);
        assert!(!registry.contains(id));
    }

    #[tokio::test]
    async fn test_ids_are_never_reused() {
        let registry = Arc::new(WorkerRegistry::new());
        let first = registry.spawn(|registration| async move { drop(registration) }).unwrap();
        assert!(registry.wait_drained(Duration::from_secs(5)).await);
        let second = registry.spawn(|registration| async move { drop(registration) }).unwrap();

        assert!(second > first);
        assert!(registry.wait_drained(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_deregistered_after_panic() {
        let registry = Arc::new(WorkerRegistry::new());
        let id = registry
            .spawn(|registration| async move {
                let _registration = registration;
                panic!("worker failure");
            })
            .unwrap();

        assert!(registry.wait_drained(Duration::from_secs(5)).await);
        assert!(!registry.contains(id));
    }

    #[tokio::test]
    async fn test_cancel_all_signals_workers() {
        let registry = Arc::new(WorkerRegistry::new());
        for _ in 0..3 {
            registry
                .spawn(|registration| async move {
                    registration.cancellation().clone().cancelled().await;
                })
                .unwrap();
        }
        assert_eq!(registry.len(), 3);

        assert_eq!(registry.cancel_all(), 3);
        assert!(registry.wait_drained(Duration::from_secs(5)).await);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_abort_all_removes_stuck_workers() {
        let registry = Arc::new(WorkerRegistry::new());
        registry
            .spawn(|registration| async move {
                let _registration = registration;
                std::future::pending::<()>().await;
            })
            .unwrap();
        tokio::task::yield_now().await;

        assert_eq!(registry.cancel_all(), 1);
        assert!(!registry.wait_drained(Duration::from_millis(50)).await);

        assert_eq!(registry.abort_all(), 1);
        assert!(registry.wait_drained(Duration::from_secs(5)).await);
    }

    #[test]
    fn test_spawn_without_runtime_releases_slot() {
        let registry = Arc::new(WorkerRegistry::new());
        let result = registry.spawn(|registration| async move { drop(registration) });

        assert!(matches!(result, Err(ServiceError::SpawnFailed(_))));
        assert!(registry.is_empty());
    }
}
