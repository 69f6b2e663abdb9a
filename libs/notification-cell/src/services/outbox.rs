// libs/notification-cell/src/services/outbox.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::models::Notification;
use crate::services::dispatcher::NotificationDispatcher;

const MAX_DELIVERY_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Handle for enqueueing notifications from request handlers.
///
/// State transitions are persisted first; the notification is then handed
/// to the outbox worker as an independent, retryable task. Enqueue never
/// fails the caller: a full or closed queue is logged and dropped.
#[derive(Clone)]
pub struct NotificationOutbox {
    sender: mpsc::Sender<Notification>,
}

impl NotificationOutbox {
    pub fn enqueue(&self, notification: Notification) {
        match self.sender.try_send(notification) {
            Ok(()) => debug!("Notification enqueued"),
            Err(mpsc::error::TrySendError::Full(n)) => {
                warn!("Notification outbox full, dropping message to {}", n.to_email)
            }
            Err(mpsc::error::TrySendError::Closed(n)) => {
                error!("Notification outbox closed, dropping message to {}", n.to_email)
            }
        }
    }
}

pub fn notification_channel(capacity: usize) -> (NotificationOutbox, mpsc::Receiver<Notification>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (NotificationOutbox { sender }, receiver)
}

/// Drain the outbox with bounded retries. Delivery failure is terminal for
/// the message after the retry budget; it never surfaces to the request
/// that enqueued it.
pub fn spawn_dispatcher(
    mut receiver: mpsc::Receiver<Notification>,
    dispatcher: Arc<dyn NotificationDispatcher>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Notification dispatcher worker started");

        while let Some(notification) = receiver.recv().await {
            let mut attempt = 0;
            loop {
                attempt += 1;
                match dispatcher.dispatch(&notification).await {
                    Ok(()) => break,
                    Err(e) if attempt < MAX_DELIVERY_ATTEMPTS => {
                        warn!(
                            "Notification delivery attempt {}/{} failed: {}",
                            attempt, MAX_DELIVERY_ATTEMPTS, e
                        );
                        tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    }
                    Err(e) => {
                        error!(
                            "Notification to {} dropped after {} attempts: {}",
                            notification.to_email, attempt, e
                        );
                        break;
                    }
                }
            }
        }

        info!("Notification dispatcher worker stopped");
    })
}
