//! Background refresh of the machine inventory.

use crate::{
    ConsoleResult, core::domain::model::machine::MachineListItem, inventory::Inventory,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

/// Anything that can produce the current machine listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetches the listing, bypassing any cache.
    async fn fetch_machines(&self) -> ConsoleResult<Vec<MachineListItem>>;
}

/// State published after every poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryUpdate {
    /// Latest successfully fetched inventory.
    pub inventory: Inventory,
    /// Message of the last poll if it failed.
    pub error: Option<String>,
    /// `true` once any poll succeeded.
    pub loaded: bool,
}

/// Refreshes an [`InventorySource`] on a fixed interval.
#[derive(Debug)]
pub struct InventoryPoller<S> {
    source: Arc<S>,
    interval: Duration,
}

impl<S> InventoryPoller<S>
where
    S: InventorySource + 'static,
{
    pub fn new(source: Arc<S>, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// Starts polling on the current runtime. The first poll runs immediately.
    pub fn spawn(self) -> PollerHandle {
        let (tx, rx) = watch::channel(InventoryUpdate::default());
        let task = tokio::spawn(run(self.source, self.interval, tx));
        info!(interval_secs = self.interval.as_secs(), "inventory poller started");
        PollerHandle { task, updates: rx }
    }
}

#[instrument(skip_all)]
async fn run<S>(source: Arc<S>, interval: Duration, tx: watch::Sender<InventoryUpdate>)
where
    S: InventorySource + ?Sized,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let update = match source.fetch_machines().await {
            Ok(items) => {
                let inventory = Inventory::from_items(&items);
                debug!(machines = inventory.len(), "inventory refreshed");
                InventoryUpdate {
                    inventory,
                    error: None,
                    loaded: true,
                }
            }
            Err(e) => {
                warn!(error = %e, "inventory refresh failed");
                let previous = tx.borrow().clone();
                InventoryUpdate {
                    error: Some(e.to_string()),
                    ..previous
                }
            }
        };
        tx.send_replace(update);
    }
}

/// Handle of a running poller. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
    updates: watch::Receiver<InventoryUpdate>,
}

impl PollerHandle {
    /// Receiver that is notified after every poll.
    pub fn subscribe(&self) -> watch::Receiver<InventoryUpdate> {
        self.updates.clone()
    }

    /// Most recently published state.
    pub fn latest(&self) -> InventoryUpdate {
        self.updates.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        self.task.abort();
        info!("inventory poller stopped");
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
