use log::debug;
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::streamrelay::types::LiveEvent;

/// Event type that triggers a notification
pub const LIVE_TYPE: &str = "live";

/// Extracts a `LiveEvent` from a stream-changed webhook body.
///
/// Only the first entry of `data` is looked at; later entries are ignored.
pub fn parse(raw_body: &[u8]) -> Result<LiveEvent, ParseError> {
    let root: Value = serde_json::from_slice(raw_body).map_err(|e| {
        debug!("Webhook body is not JSON: {}", e);
        ParseError::MalformedJson
    })?;
    let root = root.as_object().ok_or(ParseError::MalformedJson)?;

    let data = data_entries(root)?;

    let first = match data.first() {
        Some(first) => first,
        None => return Err(ParseError::NotLiveEvent(None)),
    };

    match first.get("type").and_then(Value::as_str) {
        Some(LIVE_TYPE) => {}
        other => return Err(ParseError::NotLiveEvent(other.map(str::to_string))),
    }

    let streamer = first.get("user_name").and_then(Value::as_str);
    let title = first.get("title").and_then(Value::as_str);
    match (streamer, title) {
        (Some(streamer), Some(title)) => Ok(LiveEvent::new(streamer, title)),
        _ => Err(ParseError::MissingFields),
    }
}

/// `data` must be an array whose every element is an object
fn data_entries(root: &Map<String, Value>) -> Result<Vec<&Map<String, Value>>, ParseError> {
    root.get("data")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingDataArray)?
        .iter()
        .map(|entry| entry.as_object().ok_or(ParseError::MissingDataArray))
        .collect()
}
