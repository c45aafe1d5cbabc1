use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use lotsweep_core::{Incoming, InteractionController};

use crate::metrics::{DISPATCH_QUEUE_DEPTH, UPDATES_HANDLED_TOTAL};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Update queue is full")]
    Full,
    #[error("Dispatcher has stopped")]
    Closed,
}

/// Handle for queueing updates to the dispatcher
///
/// This is cheaply cloneable and can be shared across request handlers.
#[derive(Clone)]
pub struct UpdateQueue {
    tx: mpsc::Sender<Incoming>,
}

impl UpdateQueue {
    pub fn new(tx: mpsc::Sender<Incoming>) -> Self {
        Self { tx }
    }

    /// Queue an update without waiting
    ///
    /// A full queue is reported instead of blocking the webhook, so Telegram
    /// redelivers the update later.
    pub fn enqueue(&self, incoming: Incoming) -> Result<(), QueueError> {
        match self.tx.try_send(incoming) {
            Ok(()) => {
                DISPATCH_QUEUE_DEPTH.inc();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Update queue is full, rejecting update");
                Err(QueueError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::error!("Dispatcher is gone, rejecting update");
                Err(QueueError::Closed)
            }
        }
    }
}

/// Background task that hands queued updates to the controller one at a time
pub struct Dispatcher {
    rx: mpsc::Receiver<Incoming>,
    controller: Arc<InteractionController>,
}

impl Dispatcher {
    pub fn new(rx: mpsc::Receiver<Incoming>, controller: Arc<InteractionController>) -> Self {
        Self { rx, controller }
    }

    /// Run the dispatcher, consuming updates until every queue handle is dropped
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("Dispatcher started");

        while let Some(incoming) = self.rx.recv().await {
            DISPATCH_QUEUE_DEPTH.dec();
            match self.controller.handle(incoming).await {
                Ok(()) => UPDATES_HANDLED_TOTAL.with_label_values(&["ok"]).inc(),
                Err(e) => {
                    UPDATES_HANDLED_TOTAL.with_label_values(&["error"]).inc();
                    tracing::error!("Failed to handle update: {}", e);
                }
            }
        }

        tracing::info!("Dispatcher shutting down");
    }
}

/// Create a connected queue and dispatcher
///
/// Spawn the dispatcher with `tokio::spawn(dispatcher.run())`.
pub fn create_dispatcher(
    controller: Arc<InteractionController>,
    buffer_size: usize,
) -> (UpdateQueue, Dispatcher) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (UpdateQueue::new(tx), Dispatcher::new(rx, controller))
}
