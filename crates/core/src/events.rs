// crates/core/src/events.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A unit of engine output, consumed by the voice layer or the UI sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputEvent {
    Speech { text: String },
    Command { name: String, payload: Value },
}

impl OutputEvent {
    pub fn speech(text: impl Into<String>) -> Self {
        OutputEvent::Speech { text: text.into() }
    }

    pub fn command(name: impl Into<String>, payload: Value) -> Self {
        OutputEvent::Command {
            name: name.into(),
            payload,
        }
    }

    pub fn as_speech(&self) -> Option<&str> {
        match self {
            OutputEvent::Speech { text } => Some(text),
            OutputEvent::Command { .. } => None,
        }
    }

    pub fn command_name(&self) -> Option<&str> {
        match self {
            OutputEvent::Command { name, .. } => Some(name),
            OutputEvent::Speech { .. } => None,
        }
    }
}

/// Raw slot value captured from a single utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCapture {
    pub slot_name: String,
    pub raw_value: String,
}

impl SlotCapture {
    pub fn new(slot_name: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            slot_name: slot_name.into(),
            raw_value: raw_value.into(),
        }
    }
}

/// Classifier verdict for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentMatch {
    pub intent: String,
    pub template: String,
    pub confidence: f32,
    pub slots: Vec<SlotCapture>,
}

impl IntentMatch {
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|capture| capture.slot_name == name)
            .map(|capture| capture.raw_value.as_str())
    }
}
