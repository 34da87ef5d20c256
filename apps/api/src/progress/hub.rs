use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;
use uuid::Uuid;

use crate::models::progress::ProgressScope;
use crate::progress::store::ProgressView;

const HUB_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressChange {
    Updated(ProgressView),
    Cleared { roadmap_id: Uuid },
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub scope: ProgressScope,
    pub change: ProgressChange,
}

/// Fan-out of progress changes to every open dashboard.
pub struct ProgressHub {
    sender: broadcast::Sender<ProgressEvent>,
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HUB_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: ProgressEvent) {
        // No receivers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self, scope: ProgressScope) -> ProgressSubscription {
        ProgressSubscription {
            scope,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receives changes for a single scope. Dropping or cancelling it unsubscribes.
pub struct ProgressSubscription {
    scope: ProgressScope,
    receiver: broadcast::Receiver<ProgressEvent>,
}

impl ProgressSubscription {
    /// Next change for this scope, or `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<ProgressChange> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.scope == self.scope => return Some(event.change),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Progress subscriber lagged, skipped {skipped} event(s)");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn cancel(self) {}

    pub fn into_stream(self) -> impl Stream<Item = ProgressChange> + Send + 'static {
        let scope = self.scope;
        BroadcastStream::new(self.receiver).filter_map(move |item| match item {
            Ok(event) if event.scope == scope => Some(event.change),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                debug!("Progress stream lagged, skipped {skipped} event(s)");
                None
            }
        })
    }
}
