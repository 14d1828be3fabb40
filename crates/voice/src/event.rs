use std::collections::{BTreeMap, HashMap};

/// A named parameter extracted from user speech. The platform sends the slot
/// even when nothing was captured for it, so the value is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    pub value: Option<String>,
}

impl Slot {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: Some(value.into()) }
    }
}

/// One recognized user request: intent name plus slot values. Immutable for
/// the duration of the request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntentRequest {
    pub name: String,
    pub slots: HashMap<String, Slot>,
}

impl IntentRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), slots: HashMap::new() }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(name.into(), Slot::new(value));
        self
    }

    /// The captured value for a slot, trimmed; empty captures read as absent.
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .and_then(|slot| slot.value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Conversation-scoped state owned by the voice platform. Attributes carry
/// handler scratch data between turns and are destroyed with the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub is_new: bool,
    pub attributes: BTreeMap<String, String>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), is_new: true, attributes: BTreeMap::new() }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn remove_attribute(&mut self, key: &str) {
        self.attributes.remove(key);
    }
}
