use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::event::{IntentRequest, Session};
use crate::response::SpeechResponse;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("required slot `{slot}` is missing from intent `{intent}`")]
    MissingSlot { intent: String, slot: String },
}

impl HandlerError {
    pub fn missing_slot(intent: &str, slot: &str) -> Self {
        Self::MissingSlot { intent: intent.to_owned(), slot: slot.to_owned() }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no handler registered for intent `{0}`")]
    UnknownIntent(String),
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// One intent's behavior. Handlers read slots and session state, call the CRM
/// at most once (authenticate-then-query or -insert), and end the turn with a
/// tell or an ask. Remote failures are absorbed into apology replies, never
/// returned as errors.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(
        &self,
        intent: &IntentRequest,
        session: &mut Session,
    ) -> Result<SpeechResponse, HandlerError>;
}

/// Intent name → handler lookup. Stateless across requests; the session is
/// the only state that outlives a dispatch, and the platform owns it.
#[derive(Default)]
pub struct IntentRouter {
    handlers: HashMap<String, Arc<dyn IntentHandler>>,
}

impl IntentRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, intent_name: impl Into<String>, handler: H)
    where
        H: IntentHandler + 'static,
    {
        self.handlers.insert(intent_name.into(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        intent: &IntentRequest,
        session: &mut Session,
    ) -> Result<SpeechResponse, RouteError> {
        let Some(handler) = self.handlers.get(&intent.name) else {
            return Err(RouteError::UnknownIntent(intent.name.clone()));
        };

        handler.handle(intent, session).await.map_err(RouteError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Session lifecycle hooks. The platform announces session start, launch,
/// and session end; none of them carry any behavior here beyond a structured
/// log line.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionHooks;

impl SessionHooks {
    pub fn on_session_started(&self, correlation_id: &str, session: &Session) {
        info!(
            event_name = "voice.session_started",
            correlation_id,
            session_id = %session.id,
            "session started"
        );
    }

    pub fn on_launch(&self, correlation_id: &str, session: &Session) {
        info!(
            event_name = "voice.launch",
            correlation_id,
            session_id = %session.id,
            "skill launched"
        );
    }

    pub fn on_session_ended(&self, correlation_id: &str, session: &Session, reason: Option<&str>) {
        info!(
            event_name = "voice.session_ended",
            correlation_id,
            session_id = %session.id,
            reason = reason.unwrap_or("unspecified"),
            "session ended"
        );
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::event::{IntentRequest, Session};
    use crate::response::SpeechResponse;

    use super::{HandlerError, IntentHandler, IntentRouter, RouteError};

    struct EchoHandler;

    #[async_trait]
    impl IntentHandler for EchoHandler {
        async fn handle(
            &self,
            intent: &IntentRequest,
            _session: &mut Session,
        ) -> Result<SpeechResponse, HandlerError> {
            Ok(SpeechResponse::tell(format!("handled {}", intent.name)))
        }
    }

    #[tokio::test]
    async fn dispatch_routes_to_the_registered_handler() {
        let mut router = IntentRouter::new();
        router.register("EchoIntent", EchoHandler);
        let mut session = Session::new("conv-1");

        let response = router
            .dispatch(&IntentRequest::new("EchoIntent"), &mut session)
            .await
            .expect("dispatch");

        assert_eq!(response.speech_text, "handled EchoIntent");
    }

    #[tokio::test]
    async fn dispatch_fails_with_unknown_intent() {
        let router = IntentRouter::new();
        let mut session = Session::new("conv-1");

        let err = router
            .dispatch(&IntentRequest::new("NopeIntent"), &mut session)
            .await
            .err()
            .expect("error");

        assert_eq!(err, RouteError::UnknownIntent("NopeIntent".to_owned()));
    }

    #[tokio::test]
    async fn handler_errors_surface_through_dispatch() {
        struct NeedySlotHandler;

        #[async_trait]
        impl IntentHandler for NeedySlotHandler {
            async fn handle(
                &self,
                intent: &IntentRequest,
                _session: &mut Session,
            ) -> Result<SpeechResponse, HandlerError> {
                Err(HandlerError::missing_slot(&intent.name, "productName"))
            }
        }

        let mut router = IntentRouter::new();
        router.register("GetProductDetail", NeedySlotHandler);
        let mut session = Session::new("conv-1");

        let err = router
            .dispatch(&IntentRequest::new("GetProductDetail"), &mut session)
            .await
            .err()
            .expect("error");

        assert!(matches!(err, RouteError::Handler(HandlerError::MissingSlot { .. })));
    }
}
