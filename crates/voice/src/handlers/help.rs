use async_trait::async_trait;

use crate::event::{IntentRequest, Session};
use crate::response::SpeechResponse;
use crate::router::{HandlerError, IntentHandler};
use crate::speech;

/// Lists what the assistant can do and keeps the session open.
pub struct HelpHandler;

#[async_trait]
impl IntentHandler for HelpHandler {
    async fn handle(
        &self,
        _intent: &IntentRequest,
        _session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError> {
        Ok(speech::help())
    }
}

#[cfg(test)]
mod tests {
    use crate::event::{IntentRequest, Session};
    use crate::router::IntentHandler;

    use super::HelpHandler;

    #[tokio::test]
    async fn help_is_an_ask_so_the_user_can_follow_up() {
        let mut session = Session::new("conv-1");
        let response =
            HelpHandler.handle(&IntentRequest::new("HelpIntent"), &mut session).await.expect(
                "handle",
            );

        assert!(!response.is_tell());
        assert!(response.speech_text.starts_with("You can ask Salesforce"));
    }
}
