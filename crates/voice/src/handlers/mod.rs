//! One handler per intent. Every CRM-backed handler follows the same shape:
//! build the query (or the pending record), chain authenticate-then-query
//! against the injected client, and format whatever came back. A remote
//! rejection at either step becomes the fixed apology; it is logged once and
//! never retried.

mod calendar;
mod help;
mod lead;
mod pipeline;
mod shop;

use std::sync::Arc;

use chrono_tz::Tz;
use tracing::warn;
use voxy_crm::{CrmClient, CrmError, InsertOutcome, NewRecord, RecordSet, Soql};

use crate::router::IntentRouter;

pub use calendar::CalendarTodayHandler;
pub use help::HelpHandler;
pub use lead::{LeadCompanyHandler, LeadNameHandler, LeadStartHandler};
pub use pipeline::{NewLeadsHandler, OpportunityStatusHandler};
pub use shop::{ProductAvailabilityHandler, ProductDetailHandler, ProductListHandler};

/// Builds the full intent table. One CRM client instance serves every
/// handler; the voice platform's intent names are the routing keys.
pub fn default_router(client: Arc<dyn CrmClient>, timezone: Tz) -> IntentRouter {
    let mut router = IntentRouter::new();
    router.register("GetAllAvailableProducts", ProductListHandler::new(client.clone()));
    router.register("GetProductDetail", ProductDetailHandler::new(client.clone()));
    router.register("GetProductAvailability", ProductAvailabilityHandler::new(client.clone()));
    router.register("OpportunityStatusEvent", OpportunityStatusHandler::new(client.clone()));
    router.register("NewLeadsIntent", NewLeadsHandler::new(client.clone()));
    router.register("MyCalendarIntent", CalendarTodayHandler::new(client.clone(), timezone));
    router.register("LeadStartIntent", LeadStartHandler);
    router.register("LeadNameIntent", LeadNameHandler);
    router.register("LeadCompanyIntent", LeadCompanyHandler::new(client));
    router.register("HelpIntent", HelpHandler);
    router
}

/// The authenticate-then-query composite: the query starts only after the
/// authenticate call resolves.
pub(crate) async fn fetch(client: &dyn CrmClient, soql: &Soql) -> Result<RecordSet, CrmError> {
    client.authenticate().await?;
    client.query(soql).await
}

/// The authenticate-then-insert composite.
pub(crate) async fn submit(
    client: &dyn CrmClient,
    record: NewRecord,
) -> Result<InsertOutcome, CrmError> {
    client.authenticate().await?;
    client.insert(record).await
}

pub(crate) fn log_remote_failure(intent: &str, err: &CrmError) {
    warn!(event_name = "crm.call_failed", intent, error = %err, "remote crm call failed");
}
