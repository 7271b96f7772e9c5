//! Side-effecting operations with optimistic cache updates.
//!
//! A [`Mutation`] runs an async operation and calls the [`MutationHooks`] at
//! each transition: `on_mutate` before the operation starts (optimistic
//! write, returns a context), then exactly one of `on_success` / `on_error`
//! with that context.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error(String),
}

/// Reconciliation hooks of a mutation over variables `V` producing `D`.
pub trait MutationHooks<V, D> {
    /// Handed from `on_mutate` to whichever of the other two hooks runs.
    type Context;

    fn on_mutate(&self, vars: &V) -> Self::Context;

    fn on_success(&self, _data: &D, _vars: &V, _ctx: Self::Context) {}

    fn on_error(&self, _error: &ClientError, _vars: &V, _ctx: Self::Context) {}
}

/// Hooks that do nothing.
pub struct NoHooks;

impl<V, D> MutationHooks<V, D> for NoHooks {
    type Context = ();

    fn on_mutate(&self, _vars: &V) {}
}

/// Status tracker shared by every run of one kind of mutation.
///
/// Overlapping runs keep the status `Pending` until the last one settles.
#[derive(Clone)]
pub struct Mutation {
    status: Arc<watch::Sender<MutationStatus>>,
    in_flight: Arc<AtomicUsize>,
}

impl Default for Mutation {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutation {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(MutationStatus::Idle);
        Self {
            status: Arc::new(tx),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn status(&self) -> MutationStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationStatus> {
        self.status.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn run<V, D, H, F, Fut>(&self, hooks: &H, vars: V, op: F) -> Result<D, ClientError>
    where
        V: Clone,
        H: MutationHooks<V, D>,
        F: FnOnce(V) -> Fut,
        Fut: Future<Output = Result<D, ClientError>>,
    {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.status.send_replace(MutationStatus::Pending);

        let ctx = hooks.on_mutate(&vars);
        let result = op(vars.clone()).await;

        match result {
            Ok(data) => {
                hooks.on_success(&data, &vars, ctx);
                self.settle(MutationStatus::Success);
                Ok(data)
            }
            Err(err) => {
                hooks.on_error(&err, &vars, ctx);
                self.settle(MutationStatus::Error(err.to_string()));
                Err(err)
            }
        }
    }

    fn settle(&self, outcome: MutationStatus) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.status.send_replace(outcome);
        }
    }
}
