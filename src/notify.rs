use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::{mpsc, RwLock};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{CycloneError, CycloneResult};

/// A live client connection that can receive text pushes.
#[async_trait]
pub trait LiveConnection: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;
}

/// Connection backed by a bounded channel; the transport adapter serving the
/// client owns the receiving half. A full buffer counts as a slow client.
pub struct ChannelConnection {
    sender: mpsc::Sender<String>,
}

impl ChannelConnection {
    pub fn pair(buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl LiveConnection for ChannelConnection {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.sender
            .send(text.to_string())
            .await
            .map_err(|_| anyhow!("live connection closed"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberHandle(u64);

impl SubscriberHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: Vec<SubscriberHandle>,
}

pub struct NotificationHub {
    subscribers: RwLock<HashMap<SubscriberHandle, Arc<dyn LiveConnection>>>,
    next_id: AtomicU64,
    send_timeout: Duration,
}

impl NotificationHub {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            send_timeout,
        }
    }

    pub async fn subscribe(&self, connection: Arc<dyn LiveConnection>) -> SubscriberHandle {
        let handle = SubscriberHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().await.insert(handle, connection);
        debug!("Subscriber {} connected", handle.id());
        handle
    }

    /// Removing an unknown handle is a no-op.
    pub async fn unsubscribe(&self, handle: SubscriberHandle) -> bool {
        let removed = self.subscribers.write().await.remove(&handle).is_some();
        if removed {
            debug!("Subscriber {} disconnected", handle.id());
        }
        removed
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Sends `text` to every subscriber. Each send is isolated and bounded by
    /// the send timeout; failed subscribers are dropped.
    pub async fn broadcast(&self, text: &str) -> BroadcastReport {
        let targets: Vec<(SubscriberHandle, Arc<dyn LiveConnection>)> = self
            .subscribers
            .read()
            .await
            .iter()
            .map(|(handle, connection)| (*handle, connection.clone()))
            .collect();

        let results = join_all(targets.into_iter().map(|(handle, connection)| async move {
            (handle, self.deliver(connection.as_ref(), text).await)
        }))
        .await;

        let mut report = BroadcastReport::default();
        for (handle, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    warn!("Dropping subscriber {}: {error}", handle.id());
                    report.dropped.push(handle);
                }
            }
        }

        if !report.dropped.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for handle in &report.dropped {
                subscribers.remove(handle);
            }
        }
        report
    }

    pub async fn send_to(&self, handle: SubscriberHandle, text: &str) -> CycloneResult<()> {
        let connection = self
            .subscribers
            .read()
            .await
            .get(&handle)
            .cloned()
            .ok_or_else(|| {
                CycloneError::Delivery(format!("subscriber {} is not connected", handle.id()))
            })?;

        if let Err(error) = self.deliver(connection.as_ref(), text).await {
            warn!("Dropping subscriber {}: {error}", handle.id());
            self.unsubscribe(handle).await;
            return Err(error);
        }
        Ok(())
    }

    /// Acknowledges an inbound message from a live connection.
    pub async fn handle_inbound(&self, handle: SubscriberHandle, text: &str) -> CycloneResult<()> {
        self.send_to(handle, &format!("Server received: {text}")).await
    }

    async fn deliver(&self, connection: &dyn LiveConnection, text: &str) -> CycloneResult<()> {
        match timeout(self.send_timeout, connection.send_text(text)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(CycloneError::Delivery(format!("{error:#}"))),
            Err(_) => Err(CycloneError::Delivery(format!(
                "send timed out after {:?}",
                self.send_timeout
            ))),
        }
    }
}
