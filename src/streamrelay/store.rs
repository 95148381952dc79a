use std::sync::{Arc, Mutex};

use log::{debug, error, info};

use crate::error::StoreError;
use crate::streamrelay::kv::KeyValueStore;
use crate::streamrelay::types::{Recipient, Topic};

/// Ordered, append-only subscriber sets keyed by topic
pub struct SubscriberStore {
    backend: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write so concurrent appends never drop an entry
    write_lock: Mutex<()>,
}

impl SubscriberStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Adds a subscriber at the end of the topic's set. Duplicates are kept.
    pub fn append(&self, topic: &Topic, recipient: Recipient) -> Result<(), StoreError> {
        debug!("Adding subscriber {} to topic {}", recipient, topic);

        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let key = topic.key();
        let mut entries = self.backend.get(&key)?.unwrap_or_default();
        let encoded = recipient.encode().map_err(|e| StoreError::Write {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        entries.push(encoded);
        let count = entries.len();
        self.backend.set(&key, entries)?;

        info!("Topic {} now has {} subscribers", topic, count);
        Ok(())
    }

    /// Returns the topic's subscribers in insertion order, empty if none
    pub fn lookup(&self, topic: &Topic) -> Vec<Recipient> {
        debug!("Getting subscribers for topic {}", topic);

        match self.backend.get(&topic.key()) {
            Ok(Some(entries)) => {
                let recipients: Vec<Recipient> = entries.iter().map(|e| Recipient::decode(e)).collect();
                debug!("Found {} subscribers for topic {}", recipients.len(), topic);
                recipients
            }
            Ok(None) => {
                debug!("No subscribers found for topic {}", topic);
                Vec::new()
            }
            Err(e) => {
                error!("Failed to read subscribers for topic {}: {}", topic, e);
                Vec::new()
            }
        }
    }
}
