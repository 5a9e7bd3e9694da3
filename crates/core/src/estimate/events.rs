//! Change notifications for estimate trees.

use std::sync::mpsc::{self, Receiver, Sender};

use budgetcast_shared::types::EstimateId;
use serde::{Deserialize, Serialize};

/// A structural or content change to an estimate tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TreeEvent {
    /// An estimate was attached under `parent`.
    Added {
        /// The new estimate.
        id: EstimateId,
        /// Its parent.
        parent: EstimateId,
    },
    /// An estimate and its whole subtree were detached from `parent`.
    Removed {
        /// Root of the removed subtree.
        id: EstimateId,
        /// Former parent.
        parent: EstimateId,
    },
    /// An estimate's fields changed.
    Updated {
        /// The changed estimate.
        id: EstimateId,
    },
}

/// Fan-out of tree events to any number of subscribers.
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    subscribers: Vec<Sender<TreeEvent>>,
}

impl EventBus {
    pub(crate) fn subscribe(&mut self) -> Receiver<TreeEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Sends `event` to every live subscriber; hung-up receivers are dropped.
    pub(crate) fn publish(&mut self, event: &TreeEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
