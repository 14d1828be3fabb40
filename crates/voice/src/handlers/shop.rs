use std::sync::Arc;

use async_trait::async_trait;
use voxy_crm::{CrmClient, Soql};

use crate::event::{IntentRequest, Session};
use crate::response::SpeechResponse;
use crate::router::{HandlerError, IntentHandler};
use crate::speech;

use super::{fetch, log_remote_failure};

const PRODUCT_NAME_SLOT: &str = "productName";

/// Names every product currently flagged available.
pub struct ProductListHandler {
    client: Arc<dyn CrmClient>,
}

impl ProductListHandler {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntentHandler for ProductListHandler {
    async fn handle(
        &self,
        intent: &IntentRequest,
        _session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        let soql =
            Soql::select(["Name"]).from("Shopify_Product__c").and_raw("Available__c = true");

        match fetch(self.client.as_ref(), &soql).await {
            Ok(records) => Ok(speech::product_list(&records)),
            Err(err) => {
                log_remote_failure(&intent.name, &err);
                Ok(speech::remote_failure())
            }
        }
    }
}

fn product_lookup(product_name: &str) -> Soql {
    Soql::select(["Name", "Available__c", "Price__c"])
        .from("Shopify_Product__c")
        .and_like("SearchName__c", product_name)
}

/// Speaks the price and stock state of one product, matched by substring.
pub struct ProductDetailHandler {
    client: Arc<dyn CrmClient>,
}

impl ProductDetailHandler {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntentHandler for ProductDetailHandler {
    async fn handle(
        &self,
        intent: &IntentRequest,
        _session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        let product_name = intent
            .slot_value(PRODUCT_NAME_SLOT)
            .ok_or_else(|| HandlerError::missing_slot(&intent.name, PRODUCT_NAME_SLOT))?;

        match fetch(self.client.as_ref(), &product_lookup(product_name)).await {
            Ok(records) => Ok(speech::product_detail(product_name, &records)),
            Err(err) => {
                log_remote_failure(&intent.name, &err);
                Ok(speech::remote_failure())
            }
        }
    }
}

/// Answers whether one product is in stock right now.
pub struct ProductAvailabilityHandler {
    client: Arc<dyn CrmClient>,
}

impl ProductAvailabilityHandler {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntentHandler for ProductAvailabilityHandler {
    async fn handle(
        &self,
        intent: &IntentRequest,
        _session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        let product_name = intent
            .slot_value(PRODUCT_NAME_SLOT)
            .ok_or_else(|| HandlerError::missing_slot(&intent.name, PRODUCT_NAME_SLOT))?;

        match fetch(self.client.as_ref(), &product_lookup(product_name)).await {
            Ok(records) => Ok(speech::product_availability(product_name, &records)),
            Err(err) => {
                log_remote_failure(&intent.name, &err);
                Ok(speech::remote_failure())
            }
        }
    }
}
