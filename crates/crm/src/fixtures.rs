use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{CrmClient, CrmError, CrmOperation};
use crate::record::{InsertOutcome, NewRecord, Record, RecordSet};
use crate::soql::Soql;

/// Deterministic in-memory stand-in for the remote org. Queries return the
/// canned records registered for the target object; inserts are captured for
/// later inspection. Used by handler tests and local dry-runs.
pub struct StaticCrmClient {
    records_by_object: HashMap<String, Vec<Record>>,
    fail_authenticate: bool,
    fail_query: bool,
    fail_insert: bool,
    insert_success: bool,
    inserted: Mutex<Vec<NewRecord>>,
}

impl Default for StaticCrmClient {
    fn default() -> Self {
        Self {
            records_by_object: HashMap::new(),
            fail_authenticate: false,
            fail_query: false,
            fail_insert: false,
            insert_success: true,
            inserted: Mutex::new(Vec::new()),
        }
    }
}

impl StaticCrmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, object: impl Into<String>, records: Vec<Record>) -> Self {
        self.records_by_object.insert(object.into(), records);
        self
    }

    pub fn failing_authenticate(mut self) -> Self {
        self.fail_authenticate = true;
        self
    }

    pub fn failing_query(mut self) -> Self {
        self.fail_query = true;
        self
    }

    pub fn failing_insert(mut self) -> Self {
        self.fail_insert = true;
        self
    }

    /// Inserts resolve, but the service reports `success = false`.
    pub fn rejecting_insert(mut self) -> Self {
        self.insert_success = false;
        self
    }

    pub fn inserted(&self) -> Vec<NewRecord> {
        self.inserted.lock().expect("inserted records lock").clone()
    }
}

#[async_trait]
impl CrmClient for StaticCrmClient {
    async fn authenticate(&self) -> Result<(), CrmError> {
        if self.fail_authenticate {
            return Err(CrmError::remote(
                CrmOperation::Authenticate,
                "fixture rejected authentication",
            ));
        }
        Ok(())
    }

    async fn query(&self, soql: &Soql) -> Result<RecordSet, CrmError> {
        if self.fail_query {
            return Err(CrmError::remote(CrmOperation::Query, "fixture rejected query"));
        }
        let records = self.records_by_object.get(soql.object()).cloned().unwrap_or_default();
        Ok(RecordSet::new(records))
    }

    async fn insert(&self, record: NewRecord) -> Result<InsertOutcome, CrmError> {
        if self.fail_insert {
            return Err(CrmError::remote(CrmOperation::Insert, "fixture rejected insert"));
        }

        let mut inserted = self.inserted.lock().expect("inserted records lock");
        inserted.push(record);
        let id = self.insert_success.then(|| format!("fixture-{:04}", inserted.len()));

        Ok(InsertOutcome { success: self.insert_success, id })
    }
}

#[cfg(test)]
mod tests {
    use super::StaticCrmClient;
    use crate::client::{CrmClient, CrmError, CrmOperation};
    use crate::record::{NewRecord, Record};
    use crate::soql::Soql;

    #[tokio::test]
    async fn query_returns_records_for_the_target_object_only() {
        let client = StaticCrmClient::new()
            .with_records("Lead", vec![Record::new().with_field("Name", "Jane Doe")]);

        let leads = client
            .query(&Soql::select(["Name"]).from("Lead").and_raw("CreatedDate = TODAY"))
            .await
            .expect("query");
        let events = client.query(&Soql::select(["Id"]).from("Event")).await.expect("query");

        assert_eq!(leads.len(), 1);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn captured_inserts_are_inspectable() {
        let client = StaticCrmClient::new();
        let outcome = client
            .insert(NewRecord::new("Lead").field("FirstName", "Jane"))
            .await
            .expect("insert");

        assert!(outcome.success);
        assert!(outcome.id.is_some());
        assert_eq!(client.inserted().len(), 1);
        assert_eq!(client.inserted()[0].text("FirstName"), Some("Jane"));
    }

    #[tokio::test]
    async fn rejecting_insert_reports_failure_without_an_id() {
        let client = StaticCrmClient::new().rejecting_insert();
        let outcome = client.insert(NewRecord::new("Lead")).await.expect("insert");

        assert!(!outcome.success);
        assert!(outcome.id.is_none());
    }

    #[tokio::test]
    async fn failure_toggles_map_to_remote_errors() {
        let auth_failing = StaticCrmClient::new().failing_authenticate();
        let err = auth_failing.authenticate().await.err().expect("error");
        assert!(matches!(err, CrmError::Remote { operation: CrmOperation::Authenticate, .. }));

        let query_failing = StaticCrmClient::new().failing_query();
        let err = query_failing
            .query(&Soql::select(["Name"]).from("Lead"))
            .await
            .err()
            .expect("error");
        assert!(matches!(err, CrmError::Remote { operation: CrmOperation::Query, .. }));
    }
}
