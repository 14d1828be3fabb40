use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use voxy_crm::{CrmClient, Soql};

use crate::event::{IntentRequest, Session};
use crate::response::SpeechResponse;
use crate::router::{HandlerError, IntentHandler};
use crate::speech;

use super::{fetch, log_remote_failure};

/// Walks today's calendar in start order, speaking each event's time in the
/// configured timezone and the associated contact when one exists.
pub struct CalendarTodayHandler {
    client: Arc<dyn CrmClient>,
    timezone: Tz,
}

impl CalendarTodayHandler {
    pub fn new(client: Arc<dyn CrmClient>, timezone: Tz) -> Self {
        Self { client, timezone }
    }
}

#[async_trait]
impl IntentHandler for CalendarTodayHandler {
    async fn handle(
        &self,
        intent: &IntentRequest,
        _session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        let soql = Soql::select(["Id", "StartDateTime", "Subject", "Who.Name"])
            .from("Event")
            .and_raw("StartDateTime = TODAY")
            .order_by("StartDateTime");

        match fetch(self.client.as_ref(), &soql).await {
            Ok(records) => Ok(speech::calendar_today(&records, self.timezone)),
            Err(err) => {
                log_remote_failure(&intent.name, &err);
                Ok(speech::remote_failure())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use voxy_crm::{Record, StaticCrmClient};

    use crate::event::{IntentRequest, Session};
    use crate::router::IntentHandler;

    use super::CalendarTodayHandler;

    #[tokio::test]
    async fn calendar_speaks_each_event_with_its_contact() {
        let client = Arc::new(StaticCrmClient::new().with_records(
            "Event",
            vec![
                Record::new()
                    .with_field("StartDateTime", "2026-01-12T17:05:00.000+0000")
                    .with_field("Subject", "Pipeline review")
                    .with_field("Who", serde_json::json!({"Name": "Bob"})),
                Record::new()
                    .with_field("StartDateTime", "2026-01-12T22:30:00.000+0000")
                    .with_field("Subject", "Forecast call"),
            ],
        ));
        let handler = CalendarTodayHandler::new(client, chrono_tz::America::Los_Angeles);
        let mut session = Session::new("conv-1");

        let response = handler
            .handle(&IntentRequest::new("MyCalendarIntent"), &mut session)
            .await
            .expect("handle");

        assert_eq!(
            response.speech_text,
            "You have 2 events for today, At 9:5 am, Pipeline review, with Bob, \
             At 2:30 pm, Forecast call, "
        );
    }
}
