use std::sync::Arc;

use async_trait::async_trait;
use voxy_crm::{CrmClient, NewRecord};

use crate::event::{IntentRequest, Session};
use crate::response::SpeechResponse;
use crate::router::{HandlerError, IntentHandler};
use crate::session::{split_name, spoken_name, LeadFlowPhase};
use crate::speech;

use super::{log_remote_failure, submit};

const NAME_SLOT: &str = "Name";
const COMPANY_SLOT: &str = "Company";

/// Opens the lead-capture flow: asks for the person's name and marks the
/// session as awaiting it.
pub struct LeadStartHandler;

#[async_trait]
impl IntentHandler for LeadStartHandler {
    async fn handle(
        &self,
        _intent: &IntentRequest,
        session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        LeadFlowPhase::AwaitingName.store(session);
        Ok(speech::lead_start_prompt())
    }
}

/// Captures the person's name, stashes the split tokens in the session, and
/// asks for the company.
pub struct LeadNameHandler;

#[async_trait]
impl IntentHandler for LeadNameHandler {
    async fn handle(
        &self,
        intent: &IntentRequest,
        session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        let raw_name = intent
            .slot_value(NAME_SLOT)
            .ok_or_else(|| HandlerError::missing_slot(&intent.name, NAME_SLOT))?;

        let (first_name, last_name) = split_name(raw_name);
        LeadFlowPhase::AwaitingCompany { first_name, last_name }.store(session);

        Ok(speech::lead_name_prompt(raw_name))
    }
}

/// Closes the flow: combines the stored name with the company slot and
/// submits the lead insert.
pub struct LeadCompanyHandler {
    client: Arc<dyn CrmClient>,
}

impl LeadCompanyHandler {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntentHandler for LeadCompanyHandler {
    async fn handle(
        &self,
        intent: &IntentRequest,
        session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        let company = intent
            .slot_value(COMPANY_SLOT)
            .ok_or_else(|| HandlerError::missing_slot(&intent.name, COMPANY_SLOT))?;

        let LeadFlowPhase::AwaitingCompany { first_name, last_name } =
            LeadFlowPhase::from_session(session)
        else {
            // Company arrived before a name was captured; re-prompt instead
            // of submitting an incomplete lead.
            LeadFlowPhase::AwaitingName.store(session);
            return Ok(speech::lead_restart_prompt());
        };

        let mut record = NewRecord::new("Lead");
        record.set("FirstName", first_name.clone());
        if let Some(last_name) = &last_name {
            record.set("LastName", last_name.clone());
        }
        record.set("Company", company);

        // The stored name attributes stay in the session after submission;
        // the platform discards them when the conversation ends.
        let full_name = spoken_name(&first_name, last_name.as_deref());
        match submit(self.client.as_ref(), record).await {
            Ok(outcome) if outcome.success => Ok(speech::lead_created(&full_name, company)),
            Ok(_) => Ok(speech::insert_rejected()),
            Err(err) => {
                log_remote_failure(&intent.name, &err);
                Ok(speech::remote_failure())
            }
        }
    }
}
