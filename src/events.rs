use serde::{Deserialize, Serialize};
use std::fmt;

/// Event type shared by every message the module handles
pub const EVENT_TYPE_MESSAGE: &str = "message";

pub const ATTRIBUTE_KEY_MODULE: &str = "module";
pub const ATTRIBUTE_KEY_ACTION: &str = "action";
pub const ATTRIBUTE_KEY_SENDER: &str = "sender";
pub const ATTRIBUTE_KEY_AMOUNT: &str = "amount";

/// A key/value pair attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// Structured record of something the handler did, for audit and observability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Vec<Attribute>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Value of the first attribute with the given key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for attr in &self.attributes {
            write!(f, " {}={}", attr.key, attr.value)?;
        }
        Ok(())
    }
}

/// Collects the events emitted while a single command is processed
#[derive(Debug, Default)]
pub struct EventManager {
    events: Vec<Event>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_attributes() {
        let event = Event::new(EVENT_TYPE_MESSAGE)
            .with_attribute(ATTRIBUTE_KEY_MODULE, "surprise")
            .with_attribute(ATTRIBUTE_KEY_AMOUNT, "10");

        assert_eq!(event.attribute(ATTRIBUTE_KEY_MODULE), Some("surprise"));
        assert_eq!(event.attribute(ATTRIBUTE_KEY_AMOUNT), Some("10"));
        assert_eq!(event.attribute(ATTRIBUTE_KEY_SENDER), None);
        assert_eq!(event.to_string(), "message module=surprise amount=10");
    }

    #[test]
    fn test_manager_keeps_emission_order() {
        let mut manager = EventManager::new();
        manager.emit(Event::new("first"));
        manager.emit(Event::new("second"));

        assert_eq!(manager.events().len(), 2);
        let kinds: Vec<String> = manager.into_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec!["first", "second"]);
    }
}
