//! Voxy Voice - intent routing and speech formatting
//!
//! This crate turns a recognized voice intent into a spoken reply:
//! - **Events** (`event`) - intent name + slot values, plus the
//!   conversation-scoped session the platform carries between turns
//! - **Router** (`router`) - intent name → handler lookup, lifecycle hooks
//! - **Handlers** (`handlers`) - one per intent; each chains
//!   authenticate-then-query (or -insert) against the injected CRM client
//! - **Speech** (`speech`) - pure formatting of record sets into speech text
//!   and card content
//! - **Session** (`session`) - the typed lead-capture phase stored in the
//!   platform's string attribute bag
//!
//! # Control flow
//!
//! ```text
//! Voice event → IntentRouter → handler → CrmClient → speech:: → tell/ask
//! ```
//!
//! Handlers never surface remote failures: a rejected CRM call becomes the
//! fixed apology sentence, and an empty result set becomes the fixed
//! "not found" sentence.

pub mod event;
pub mod handlers;
pub mod response;
pub mod router;
pub mod session;
pub mod speech;

pub use event::{IntentRequest, Session, Slot};
pub use handlers::default_router;
pub use response::{Card, SpeechResponse};
pub use router::{HandlerError, IntentHandler, IntentRouter, RouteError, SessionHooks};
pub use session::LeadFlowPhase;
