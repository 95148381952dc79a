use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::streamrelay::sender::MessageSender;
use crate::streamrelay::store::SubscriberStore;
use crate::streamrelay::types::{LiveEvent, Recipient, Topic};

/// Result of one send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
    TimedOut,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Delivered => None,
            Self::Failed(_) => Some(ErrorCode::DeliveryFailed),
            Self::TimedOut => Some(ErrorCode::DeliveryTimeout),
        }
    }
}

/// Per-subscriber outcomes of one fan-out, in subscription order
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub id: Uuid,
    pub topic: Topic,
    pub message: String,
    pub outcomes: Vec<(Recipient, DeliveryOutcome)>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}

/// Fans a live notification out to everyone subscribed to the streamer
pub struct NotificationDispatcher {
    store: Arc<SubscriberStore>,
    sender: Arc<dyn MessageSender>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<SubscriberStore>, sender: Arc<dyn MessageSender>, timeout: Duration) -> Self {
        Self { store, sender, timeout }
    }

    /// Sends the notification to every subscriber.
    ///
    /// Each send runs as its own task under the configured timeout, so an
    /// error, a hang or a panic only marks that one subscriber as failed.
    pub async fn dispatch(&self, event: &LiveEvent) -> DispatchReport {
        let id = Uuid::new_v4();
        let topic = event.topic();
        let message = event.message();

        let recipients = self.store.lookup(&topic);
        info!("[{}] {} is live, notifying {} subscribers", id, event.streamer, recipients.len());

        let tasks: Vec<_> = recipients
            .into_iter()
            .map(|recipient| {
                let sender = self.sender.clone();
                let text = message.clone();
                let to = recipient.clone();
                let timeout = self.timeout;
                let task = tokio::spawn(async move {
                    tokio::time::timeout(timeout, sender.send(&text, &to)).await
                });
                (recipient, task)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (recipient, task) in tasks {
            let outcome = match task.await {
                Ok(Ok(Ok(()))) => DeliveryOutcome::Delivered,
                Ok(Ok(Err(e))) => DeliveryOutcome::Failed(e.to_string()),
                Ok(Err(_)) => DeliveryOutcome::TimedOut,
                // Sender panicked or the task was cancelled
                Err(e) => DeliveryOutcome::Failed(e.to_string()),
            };
            match (&outcome, outcome.code()) {
                (DeliveryOutcome::Failed(reason), Some(code)) => {
                    warn!("[{}] Delivery to {} failed: {} ({})", id, recipient, reason, code)
                }
                (DeliveryOutcome::TimedOut, Some(code)) => {
                    warn!("[{}] Delivery to {} timed out after {:?} ({})", id, recipient, self.timeout, code)
                }
                _ => debug!("[{}] Delivered to {}", id, recipient),
            }
            outcomes.push((recipient, outcome));
        }

        let report = DispatchReport { id, topic, message, outcomes };
        info!(
            "[{}] Dispatch completed. Delivered to {}/{} subscribers",
            id,
            report.delivered(),
            report.outcomes.len()
        );
        report
    }
}
