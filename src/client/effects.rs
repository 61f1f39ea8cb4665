//! The effect layer: turns request actions into remote calls and
//! outcome actions.
//!
//! Two in-flight policies, fixed per operation:
//!
//! - list/fetch: latest-wins. Each fetch takes a fresh token from a
//!   per-family counter; a result whose token is no longer current is
//!   dropped without dispatch, so a slow early fetch can never
//!   overwrite a faster later one.
//! - mutations: every-invocation. Each request runs independently to
//!   completion; concurrent duplicates each get their own
//!   started/success/failure sequence, completing in remote order.
//!
//! `Started` is sent synchronously from `handle`, before the call is
//! spawned, so it always precedes its own outcome in the queue.
//! Exactly one remote attempt per request — no retries.

use super::action::{Action, Op};
use super::remote::{RemoteApi, RemoteError};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub struct EffectRunner {
    remote: Arc<dyn RemoteApi>,
    actions: UnboundedSender<Action>,
    task_fetch_seq: Arc<AtomicU64>,
    category_fetch_seq: Arc<AtomicU64>,
}

impl EffectRunner {
    pub fn new(remote: Arc<dyn RemoteApi>, actions: UnboundedSender<Action>) -> Self {
        EffectRunner {
            remote,
            actions,
            task_fetch_seq: Arc::new(AtomicU64::new(0)),
            category_fetch_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Pick up a request action. Anything else is ignored.
    pub fn handle(&self, action: &Action) {
        match action {
            Action::ListTasks => {
                let remote = self.remote.clone();
                self.fetch_latest(Op::ListTasks, &self.task_fetch_seq, async move {
                    Ok(Action::ListTasksSuccess { tasks: remote.list_tasks().await? })
                });
            }

            Action::FetchCategories => {
                let remote = self.remote.clone();
                self.fetch_latest(Op::FetchCategories, &self.category_fetch_seq, async move {
                    Ok(Action::FetchCategoriesSuccess {
                        categories: remote.list_categories().await?,
                    })
                });
            }

            Action::AddTask { description } => {
                let remote = self.remote.clone();
                let description = description.clone();
                self.run(Op::AddTask, async move {
                    Ok(Action::AddTaskSuccess { task: remote.add_task(&description).await? })
                });
            }

            Action::DeleteTask { id } => {
                let remote = self.remote.clone();
                let id = *id;
                self.run(Op::DeleteTask, async move {
                    remote.delete_task(id).await?;
                    Ok(Action::DeleteTaskSuccess { id })
                });
            }

            Action::SetDueDate { id, due_date } => {
                let remote = self.remote.clone();
                let (id, due_date) = (*id, *due_date);
                self.run(Op::SetDueDate, async move {
                    Ok(Action::SetDueDateSuccess {
                        task: remote.set_due_date(id, due_date).await?,
                    })
                });
            }

            Action::ToggleComplete { id } => {
                let remote = self.remote.clone();
                let id = *id;
                self.run(Op::ToggleComplete, async move {
                    Ok(Action::ToggleCompleteSuccess {
                        task: remote.toggle_complete(id).await?,
                    })
                });
            }

            Action::CreateCategory { input } => {
                let remote = self.remote.clone();
                let input = input.clone();
                self.run(Op::CreateCategory, async move {
                    Ok(Action::CreateCategorySuccess {
                        category: remote.create_category(&input).await?,
                    })
                });
            }

            Action::UpdateCategory { id, input } => {
                let remote = self.remote.clone();
                let (id, input) = (*id, input.clone());
                self.run(Op::UpdateCategory, async move {
                    Ok(Action::UpdateCategorySuccess {
                        category: remote.update_category(id, &input).await?,
                    })
                });
            }

            Action::DeleteCategory { id } => {
                let remote = self.remote.clone();
                let id = *id;
                self.run(Op::DeleteCategory, async move {
                    remote.delete_category(id).await?;
                    Ok(Action::DeleteCategorySuccess { id })
                });
            }

            _ => {}
        }
    }

    /// Every-invocation policy: start, run to completion, report.
    fn run<Fut>(&self, op: Op, call: Fut)
    where
        Fut: Future<Output = Result<Action, RemoteError>> + Send + 'static,
    {
        let _ = self.actions.send(Action::Started(op));
        let actions = self.actions.clone();
        tokio::spawn(async move {
            let outcome = match call.await {
                Ok(action) => action,
                Err(e) => Action::Failed { op, message: e.message },
            };
            let _ = actions.send(outcome);
        });
    }

    /// Latest-wins policy: bump the family token, run, and drop the
    /// result if a newer fetch has been dispatched meanwhile.
    fn fetch_latest<Fut>(&self, op: Op, seq: &Arc<AtomicU64>, call: Fut)
    where
        Fut: Future<Output = Result<Action, RemoteError>> + Send + 'static,
    {
        let token = seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.actions.send(Action::Started(op));
        let actions = self.actions.clone();
        let seq = seq.clone();
        tokio::spawn(async move {
            let outcome = call.await;
            if seq.load(Ordering::SeqCst) != token {
                tracing::debug!(?op, token, "dropping superseded fetch result");
                return;
            }
            let action = match outcome {
                Ok(action) => action,
                Err(e) => Action::Failed { op, message: e.message },
            };
            let _ = actions.send(action);
        });
    }
}

// ── Tests ──────────────────────────────────────────────────────
