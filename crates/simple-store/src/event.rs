//! Change events and listener payloads.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use simple_store_path::{ConcretePath, Key};

/// What a [`ChangeEvent`] reports. Its string form is the event type
/// listeners subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    /// A value was replaced by a different one.
    Change,
    /// An object gained a key.
    Add,
    /// An object lost a key.
    Remove,
    AddItem,
    RemoveItem,
    MoveItem,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Change => "change",
            ChangeKind::Add => "add",
            ChangeKind::Remove => "remove",
            ChangeKind::AddItem => "add-item",
            ChangeKind::RemoveItem => "remove-item",
            ChangeKind::MoveItem => "move-item",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One semantic change found by a change emitter.
///
/// Item events (`add-item`, `remove-item`, `move-item`) carry the path of the
/// array and the element positions in `old_index` / `new_index`. All other
/// events carry the path of the changed value itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub old_path: ConcretePath,
    pub new_path: ConcretePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_index: Option<usize>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, old_path: &[Key], new_path: &[Key]) -> Self {
        Self {
            kind,
            old_path: old_path.to_vec(),
            new_path: new_path.to_vec(),
            old_value: None,
            new_value: None,
            old_index: None,
            new_index: None,
        }
    }

    pub fn with_values(mut self, old_value: Option<Value>, new_value: Option<Value>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }

    pub fn with_indices(mut self, old_index: Option<usize>, new_index: Option<usize>) -> Self {
        self.old_index = old_index;
        self.new_index = new_index;
        self
    }

    /// Event type used for dispatch.
    pub fn event_type(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Path used for dispatch: where the change lives in the new state.
    pub fn path(&self) -> &[Key] {
        &self.new_path
    }
}

/// What a listener receives.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A change found by the emitter after a write, or passed to
    /// `trigger_event`.
    Change(ChangeEvent),
    /// Arguments of a custom `trigger` call.
    Args(Vec<Value>),
}

impl Payload {
    pub fn as_change(&self) -> Option<&ChangeEvent> {
        match self {
            Payload::Change(event) => Some(event),
            Payload::Args(_) => None,
        }
    }

    pub fn args(&self) -> &[Value] {
        match self {
            Payload::Args(args) => args,
            Payload::Change(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names() {
        assert_eq!(ChangeKind::AddItem.as_str(), "add-item");
        assert_eq!(
            serde_json::to_value(ChangeKind::MoveItem).unwrap(),
            json!("move-item")
        );
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let path = [Key::from("p"), Key::Index(0)];
        let event = ChangeEvent::new(ChangeKind::Change, &path, &path)
            .with_values(Some(json!(1)), Some(json!(2)));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "change",
                "oldPath": ["p", 0],
                "newPath": ["p", 0],
                "oldValue": 1,
                "newValue": 2
            })
        );
    }

    #[test]
    fn test_payload_accessors() {
        let p = Payload::Args(vec![json!(1)]);
        assert!(p.as_change().is_none());
        assert_eq!(p.args(), &[json!(1)]);
    }
}
