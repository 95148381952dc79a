use std::fmt;
use serde::{Deserialize, Serialize};

/// Handles containing this sequence were written as group chats by the legacy format
pub const GROUP_DELIMITER: &str = ";=;";

/// Prefix of every subscriber-set key in the backing store
pub const KEY_PREFIX: &str = "stream:";

/// Subscription key for one streamer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Lowercased topic, the form every lookup uses
    pub fn normalized(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    /// Topic exactly as typed
    pub fn verbatim(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backing-store key for this topic's subscriber set
    pub fn key(&self) -> String {
        format!("{}{}", KEY_PREFIX, self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Addressee of an outbound message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "handle", rename_all = "lowercase")]
pub enum Recipient {
    Individual(String),
    Group(String),
}

impl Recipient {
    pub fn handle(&self) -> &str {
        match self {
            Self::Individual(handle) | Self::Group(handle) => handle,
        }
    }

    /// Classifies an untagged handle by sniffing for the group delimiter
    pub fn from_legacy_handle(handle: &str) -> Self {
        if handle.contains(GROUP_DELIMITER) {
            Self::Group(handle.to_string())
        } else {
            Self::Individual(handle.to_string())
        }
    }

    /// Stored form of this recipient
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Reads a stored entry; anything that is not a tagged record is a legacy handle
    pub fn decode(entry: &str) -> Self {
        match serde_json::from_str::<Recipient>(entry) {
            Ok(recipient) => recipient,
            Err(_) => Self::from_legacy_handle(entry),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual(handle) => write!(f, "individual:{}", handle),
            Self::Group(handle) => write!(f, "group:{}", handle),
        }
    }
}

/// A stream-online notification pulled out of a webhook body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEvent {
    pub streamer: String,
    pub title: String,
}

impl LiveEvent {
    pub fn new(streamer: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            streamer: streamer.into(),
            title: title.into(),
        }
    }

    pub fn topic(&self) -> Topic {
        Topic::normalized(&self.streamer)
    }

    /// Notification text, with the streamer name as the provider sent it
    pub fn message(&self) -> String {
        format!(
            "https://twitch.tv/{streamer} {streamer} is now live with {title}!",
            streamer = self.streamer,
            title = self.title
        )
    }
}
