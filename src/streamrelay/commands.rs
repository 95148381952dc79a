use std::sync::Arc;

use log::{debug, info};

use crate::error::CommandError;
use crate::streamrelay::store::SubscriberStore;
use crate::streamrelay::types::{Recipient, Topic};

pub const SUBSCRIBE: &str = "subscribe";
pub const UNSUBSCRIBE: &str = "unsubscribe";

/// `<trigger>,subscribe,<streamer>` front end of the subscriber store
pub struct SubscriptionCommandHandler {
    store: Arc<SubscriberStore>,
    trigger: String,
    normalize_topics: bool,
}

impl SubscriptionCommandHandler {
    pub fn new(store: Arc<SubscriberStore>, trigger: impl Into<String>, normalize_topics: bool) -> Self {
        Self {
            store,
            trigger: trigger.into(),
            normalize_topics,
        }
    }

    /// Handles an already comma-split command issued by `caller`
    pub fn handle(&self, params: &[String], caller: &Recipient) -> Result<String, CommandError> {
        debug!("Subscription command from {}: {:?}", caller, params);

        if params.len() != 3 {
            return Err(CommandError::WrongArity(params.len()));
        }

        let action = params[1].as_str();
        let streamer = params[2].as_str();

        match action {
            UNSUBSCRIBE => Err(CommandError::Unsupported),
            SUBSCRIBE => {
                let topic = if self.normalize_topics {
                    Topic::normalized(streamer)
                } else {
                    Topic::verbatim(streamer)
                };
                self.store.append(&topic, caller.clone())?;
                info!("{} subscribed to {}", caller, topic);

                Ok(format!(
                    "You are now subscribed to stream notifications from {streamer}! To unsubscribe, use {trigger},{UNSUBSCRIBE},{streamer}",
                    trigger = self.trigger,
                ))
            }
            other => Err(CommandError::UnsupportedParameter(other.to_string())),
        }
    }
}
