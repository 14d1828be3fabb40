use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{InsertOutcome, NewRecord, RecordSet};
use crate::soql::Soql;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrmOperation {
    Authenticate,
    Query,
    Insert,
}

impl fmt::Display for CrmOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authenticate => "authenticate",
            Self::Query => "query",
            Self::Insert => "insert",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CrmError {
    /// Authentication, query, or insert rejected at transport or service
    /// level. Converted once per call chain into a fixed user-facing apology;
    /// never retried.
    #[error("remote {operation} call failed: {detail}")]
    Remote { operation: CrmOperation, detail: String },
    /// Missing or unusable credentials at construction time. A bootstrap
    /// failure, not a per-request condition.
    #[error("crm client is not configured: {0}")]
    NotConfigured(String),
}

impl CrmError {
    pub fn remote(operation: CrmOperation, detail: impl Into<String>) -> Self {
        Self::Remote { operation, detail: detail.into() }
    }
}

/// Capability interface to the remote CRM org. Handlers chain
/// `authenticate` and then exactly one `query` or `insert` per request; the
/// second call begins only after the first resolves.
#[async_trait]
pub trait CrmClient: Send + Sync {
    async fn authenticate(&self) -> Result<(), CrmError>;
    async fn query(&self, soql: &Soql) -> Result<RecordSet, CrmError>;
    async fn insert(&self, record: NewRecord) -> Result<InsertOutcome, CrmError>;
}
