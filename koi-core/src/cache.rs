//! Per-destiny memoization of relation lookups.
//!
//! Several table rows usually share the same destiny, so the relation
//! lists for one element are fetched at most once per session. The cache
//! is constructor-injected rather than ambient so each test (and each
//! browsing session) gets a fresh one.

use crate::source::RelationSource;
use koi_api::DestinyRelations;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type Outcome = Result<Arc<DestinyRelations>, koi_api::Error>;
type Waiter = oneshot::Sender<Outcome>;

enum Slot {
    /// A fetch for this key is in flight; waiters resolve when it lands.
    Pending(Vec<Waiter>),
    Ready(Arc<DestinyRelations>),
}

/// Session-scoped cache of destiny name to relation lists.
///
/// At most one fetch is in flight per key: concurrent callers for the same
/// uncached name await the outcome of the first one. Successes are kept for
/// the lifetime of the cache (relation data has no update path from this
/// side); failures are returned but never stored, so the next caller
/// retries the network.
pub struct RelationCache<S> {
    source: S,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<S: RelationSource> RelationCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get the relation lists for a destiny, fetching on first use.
    pub async fn get(&self, name: &str) -> Outcome {
        enum Plan {
            Hit(Arc<DestinyRelations>),
            Wait(oneshot::Receiver<Outcome>),
            Fetch,
        }

        let plan = {
            let mut slots = self.slots.lock().expect("relation cache lock poisoned");
            match slots.get_mut(name) {
                Some(Slot::Ready(value)) => Plan::Hit(value.clone()),
                Some(Slot::Pending(waiters)) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Plan::Wait(rx)
                }
                None => {
                    slots.insert(name.to_string(), Slot::Pending(Vec::new()));
                    Plan::Fetch
                }
            }
        };

        match plan {
            Plan::Hit(value) => Ok(value),
            Plan::Wait(rx) => match rx.await {
                Ok(outcome) => outcome,
                // The initiating task was dropped before it could publish.
                // Nothing was cached, so a later call retries.
                Err(_) => Err(koi_api::Error::Network(
                    "relation fetch abandoned".to_string(),
                )),
            },
            Plan::Fetch => self.fetch_and_publish(name).await,
        }
    }

    /// Row-rendering lookup: a failed fetch must not fail the whole view,
    /// so it is logged and rendered as absent.
    pub async fn lookup(&self, name: &str) -> Option<Arc<DestinyRelations>> {
        match self.get(name).await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(destiny = name, %error, "relation lookup failed");
                None
            }
        }
    }

    async fn fetch_and_publish(&self, name: &str) -> Outcome {
        let flight = Flight {
            slots: &self.slots,
            name,
            done: false,
        };

        let outcome = self.source.destiny_relations(name).await.map(Arc::new);

        for waiter in flight.publish(&outcome) {
            let _ = waiter.send(outcome.clone());
        }
        outcome
    }
}

/// Tracks one in-flight fetch. If the owning future is dropped before the
/// outcome is published, the pending slot is removed so waiters fail fast
/// and the key stays retryable.
struct Flight<'a> {
    slots: &'a Mutex<HashMap<String, Slot>>,
    name: &'a str,
    done: bool,
}

impl Flight<'_> {
    /// Store a success, discard a failure, and hand back the waiters.
    fn publish(mut self, outcome: &Outcome) -> Vec<Waiter> {
        self.done = true;
        let mut slots = self.slots.lock().expect("relation cache lock poisoned");
        let waiters = match slots.remove(self.name) {
            Some(Slot::Pending(waiters)) => waiters,
            _ => Vec::new(),
        };
        if let Ok(value) = outcome {
            slots.insert(self.name.to_string(), Slot::Ready(value.clone()));
        }
        waiters
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Ok(mut slots) = self.slots.lock() {
            slots.remove(self.name);
        }
    }
}
