//! Voxy CRM - capability interface for the remote CRM org
//!
//! This crate owns everything that crosses the wire to the CRM:
//! - **Capability trait** (`client`) - `authenticate` / `query` / `insert`,
//!   consumed by every voice handler through an injected `Arc<dyn CrmClient>`
//! - **Query construction** (`soql`) - parameterized SOQL builder; slot values
//!   are escaped, never spliced into query text by hand
//! - **Records** (`record`) - read-only field maps returned by queries and
//!   pending inserts
//! - **REST adapter** (`rest`) - username-password OAuth token exchange plus
//!   the JSON query/insert endpoints, one client per process
//! - **Fixtures** (`fixtures`) - deterministic in-memory client for tests
//!
//! Error model is deliberately small: a remote rejection is `CrmError::Remote`
//! and is reported to the user as a fixed apology, never retried. An empty
//! result set is not an error.

pub mod client;
pub mod fixtures;
pub mod record;
pub mod rest;
pub mod soql;

pub use client::{CrmClient, CrmError, CrmOperation};
pub use fixtures::StaticCrmClient;
pub use record::{InsertOutcome, NewRecord, Record, RecordSet};
pub use rest::RestCrmClient;
pub use soql::Soql;
