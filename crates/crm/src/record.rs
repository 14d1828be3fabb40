use std::collections::BTreeMap;

use serde_json::Value;

/// One row returned by a CRM query, exposed as named-field lookup. Relation
/// fields (`Who.Name`) come back as nested objects and are reachable through
/// [`Record::child`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from one entry of a query response. The service's
    /// per-row `attributes` metadata object is not a field and is dropped.
    pub fn from_value(value: &Value) -> Self {
        let mut fields = BTreeMap::new();
        if let Value::Object(map) = value {
            for (name, field_value) in map {
                if name == "attributes" {
                    continue;
                }
                fields.insert(name.clone(), field_value.clone());
            }
        }
        Self { fields }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Boolean field lookup; absent or non-boolean fields read as false.
    pub fn flag(&self, field: &str) -> bool {
        self.fields.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Raw interpolation text for a field: strings verbatim, numbers and
    /// booleans via their canonical rendering. No rounding, no locale.
    pub fn display(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Nested relation record, e.g. `record.child("Who")` for `Who.Name`.
    /// Null relations (no associated contact) read as absent.
    pub fn child(&self, field: &str) -> Option<Record> {
        match self.fields.get(field)? {
            value @ Value::Object(_) => Some(Record::from_value(value)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordSet {
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

/// A pending insert: target object plus the fields to write. Fields that were
/// never set are omitted from the payload entirely, never serialized as null.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecord {
    object: String,
    fields: BTreeMap<String, Value>,
}

impl NewRecord {
    pub fn new(object: impl Into<String>) -> Self {
        Self { object: object.into(), fields: BTreeMap::new() }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn to_body(&self) -> Value {
        Value::Object(self.fields.clone().into_iter().collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub success: bool,
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{NewRecord, Record};

    #[test]
    fn from_value_drops_attributes_metadata() {
        let record = Record::from_value(&json!({
            "attributes": {"type": "Shopify_Product__c"},
            "Name": "Widget",
            "Available__c": true,
        }));

        assert_eq!(record.text("Name"), Some("Widget"));
        assert!(record.flag("Available__c"));
        assert_eq!(record.text("attributes"), None);
    }

    #[test]
    fn display_renders_numbers_without_reformatting() {
        let record = Record::new().with_field("Price__c", json!(1500)).with_field(
            "Probability",
            json!(99.5),
        );

        assert_eq!(record.display("Price__c").as_deref(), Some("1500"));
        assert_eq!(record.display("Probability").as_deref(), Some("99.5"));
        assert_eq!(record.display("Amount"), None);
    }

    #[test]
    fn child_resolves_nested_relation_and_ignores_null() {
        let with_who = Record::from_value(&json!({"Who": {"Name": "Bob"}}));
        let without_who = Record::from_value(&json!({"Who": null}));

        assert_eq!(with_who.child("Who").and_then(|who| who.text("Name").map(String::from)),
            Some("Bob".to_string()));
        assert!(without_who.child("Who").is_none());
    }

    #[test]
    fn new_record_body_omits_unset_fields() {
        let record =
            NewRecord::new("Lead").field("FirstName", "Jane").field("Company", "Acme");

        assert_eq!(record.to_body(), json!({"FirstName": "Jane", "Company": "Acme"}));
        assert!(!record.has_field("LastName"));
    }
}
