//! Client-side state synchronization engine.
//!
//! A redux-shaped loop over typed actions: callers dispatch a request
//! action, the effect layer performs the HTTP call and dispatches
//! outcome actions, and a single task folds every action into the
//! snapshot through the pure reducer — one at a time, in queue order,
//! so the reducer never races itself. Views watch the snapshot channel
//! and never touch shared state.

pub mod action;
pub mod effects;
pub mod remote;
pub mod state;
pub mod view;

use action::Action;
use effects::EffectRunner;
use remote::RemoteApi;
use state::{reduce, Snapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Handle to a running client engine. Cheap to clone.
#[derive(Clone)]
pub struct ClientStore {
    actions: mpsc::UnboundedSender<Action>,
    snapshots: watch::Receiver<Snapshot>,
}

impl ClientStore {
    /// Wire up the queue, the effect layer, and the dispatch loop.
    pub fn spawn(remote: Arc<dyn RemoteApi>) -> ClientStore {
        let (actions, queue) = mpsc::unbounded_channel();
        let (publish, snapshots) = watch::channel(Snapshot::default());
        let effects = EffectRunner::new(remote, actions.clone());

        tokio::spawn(dispatch_loop(queue, effects, publish));

        ClientStore { actions, snapshots }
    }

    /// Enqueue an action. Never blocks; the loop folds it in order.
    pub fn dispatch(&self, action: Action) {
        let _ = self.actions.send(action);
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that yields every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

/// The single thread of control for state updates. Each action is fully
/// folded before the next is taken off the queue.
async fn dispatch_loop(
    mut queue: mpsc::UnboundedReceiver<Action>,
    effects: EffectRunner,
    publish: watch::Sender<Snapshot>,
) {
    let mut snapshot = Snapshot::default();
    while let Some(action) = queue.recv().await {
        effects.handle(&action);
        snapshot = reduce(&snapshot, &action);
        let _ = publish.send(snapshot.clone());
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryInput, CreatedTask, Task};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use super::remote::RemoteError;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    /// Remote where the first list call is slower than the second.
    struct RacingRemote {
        list_calls: AtomicU64,
    }

    #[async_trait]
    impl RemoteApi for RacingRemote {
        async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError> {
            let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
            let (delay, description) = if call == 0 {
                (200, "stale")
            } else {
                (10, "fresh")
            };
            sleep(Duration::from_millis(delay)).await;
            Ok(vec![Task {
                id: call + 1,
                description: description.to_string(),
                is_completed: false,
                due_date: None,
                category_id: None,
            }])
        }

        async fn add_task(&self, description: &str) -> Result<CreatedTask, RemoteError> {
            Ok(CreatedTask { id: 7, description: description.to_string() })
        }

        async fn delete_task(&self, _id: u64) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn set_due_date(
            &self,
            _id: u64,
            _due_date: Option<DateTime<Utc>>,
        ) -> Result<Task, RemoteError> {
            Err(RemoteError::new("not wired"))
        }

        async fn toggle_complete(&self, _id: u64) -> Result<Task, RemoteError> {
            Err(RemoteError::new("not wired"))
        }

        async fn list_categories(&self) -> Result<Vec<Category>, RemoteError> {
            Err(RemoteError::new("not wired"))
        }

        async fn create_category(&self, _input: &CategoryInput) -> Result<Category, RemoteError> {
            Err(RemoteError::new("not wired"))
        }

        async fn update_category(
            &self,
            _id: u64,
            _input: &CategoryInput,
        ) -> Result<Category, RemoteError> {
            Err(RemoteError::new("not wired"))
        }

        async fn delete_category(&self, _id: u64) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    /// Wait until the published snapshot satisfies the predicate.
    async fn wait_for(
        store: &ClientStore,
        predicate: impl Fn(&Snapshot) -> bool,
    ) -> Snapshot {
        let mut rx = store.subscribe();
        timeout(Duration::from_secs(5), async {
            loop {
                if predicate(&rx.borrow()) {
                    return rx.borrow().clone();
                }
                rx.changed().await.expect("snapshot channel closed");
            }
        })
        .await
        .expect("timed out waiting for snapshot")
    }

    #[tokio::test(start_paused = true)]
    async fn add_task_round_trip() {
        let store = ClientStore::spawn(Arc::new(RacingRemote { list_calls: AtomicU64::new(0) }));

        store.dispatch(Action::AddTask { description: "Buy milk".into() });

        let settled = wait_for(&store, |s| !s.tasks.is_empty() && !s.in_progress).await;
        assert_eq!(settled.tasks[0].id, 7);
        assert_eq!(settled.tasks[0].description, "Buy milk");
        assert_eq!(settled.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn superseding_fetch_wins_regardless_of_completion_order() {
        let store = ClientStore::spawn(Arc::new(RacingRemote { list_calls: AtomicU64::new(0) }));

        store.dispatch(Action::ListTasks);
        store.dispatch(Action::ListTasks);

        let settled = wait_for(&store, |s| !s.tasks.is_empty() && !s.in_progress).await;
        assert_eq!(settled.tasks[0].description, "fresh");

        // Give the stale fetch time to resolve — the snapshot must not move.
        sleep(Duration::from_millis(500)).await;
        assert_eq!(store.snapshot().tasks[0].description, "fresh");
    }
}
