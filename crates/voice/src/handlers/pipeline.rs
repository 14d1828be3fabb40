use std::sync::Arc;

use async_trait::async_trait;
use voxy_crm::{CrmClient, Soql};

use crate::event::{IntentRequest, Session};
use crate::response::SpeechResponse;
use crate::router::{HandlerError, IntentHandler};
use crate::speech;

use super::{fetch, log_remote_failure};

const OPPORTUNITY_NAME_SLOT: &str = "OpportunityName";

/// Reports amount, stage, and probability for one opportunity, matched by
/// exact name.
pub struct OpportunityStatusHandler {
    client: Arc<dyn CrmClient>,
}

impl OpportunityStatusHandler {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntentHandler for OpportunityStatusHandler {
    async fn handle(
        &self,
        intent: &IntentRequest,
        _session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        let opportunity_name = intent
            .slot_value(OPPORTUNITY_NAME_SLOT)
            .ok_or_else(|| HandlerError::missing_slot(&intent.name, OPPORTUNITY_NAME_SLOT))?;

        let soql = Soql::select(["Name", "StageName", "Probability", "Amount"])
            .from("Opportunity")
            .and_eq("Name", opportunity_name);

        match fetch(self.client.as_ref(), &soql).await {
            Ok(records) => Ok(speech::opportunity_status(opportunity_name, &records)),
            Err(err) => {
                log_remote_failure(&intent.name, &err);
                Ok(speech::remote_failure())
            }
        }
    }
}

/// Lists the leads created today.
pub struct NewLeadsHandler {
    client: Arc<dyn CrmClient>,
}

impl NewLeadsHandler {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntentHandler for NewLeadsHandler {
    async fn handle(
        &self,
        intent: &IntentRequest,
        _session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        let soql =
            Soql::select(["Name", "Company"]).from("Lead").and_raw("CreatedDate = TODAY");

        match fetch(self.client.as_ref(), &soql).await {
            Ok(records) => Ok(speech::new_leads(&records)),
            Err(err) => {
                log_remote_failure(&intent.name, &err);
                Ok(speech::remote_failure())
            }
        }
    }
}
