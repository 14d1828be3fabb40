//! Codec between the voice platform's request/response schema and the
//! crate-internal event model, plus the per-event dispatch path.
//!
//! The platform delivers one JSON document per turn: a session envelope and
//! one of three request kinds (launch, intent, session ended). Replies echo
//! the session attributes so the platform can carry them into the next turn.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use voxy_voice::{speech, IntentRequest, RouteError, Session, Slot, SpeechResponse};

use crate::bootstrap::Application;

#[derive(Debug, Deserialize)]
pub struct VoiceEvent {
    pub session: SessionEnvelope,
    pub request: RequestEnvelope,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEnvelope {
    pub session_id: String,
    #[serde(default, rename = "new")]
    pub is_new: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub application: Option<ApplicationEnvelope>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEnvelope {
    pub application_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum RequestEnvelope {
    LaunchRequest { request_id: String },
    IntentRequest { request_id: String, intent: IntentEnvelope },
    SessionEndedRequest { request_id: String, #[serde(default)] reason: Option<String> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct IntentEnvelope {
    pub name: String,
    #[serde(default)]
    pub slots: BTreeMap<String, SlotEnvelope>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SlotEnvelope {
    #[serde(default)]
    pub value: Option<String>,
}

impl IntentEnvelope {
    fn into_intent_request(self) -> IntentRequest {
        IntentRequest {
            name: self.name,
            slots: self
                .slots
                .into_iter()
                .map(|(name, slot)| (name, Slot { value: slot.value }))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformResponse {
    pub version: &'static str,
    pub session_attributes: BTreeMap<String, String>,
    pub response: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub output_speech: OutputSpeech,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<SimpleCard>,
    pub should_end_session: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    PlainText { text: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum SimpleCard {
    Simple { title: String, content: String },
}

impl PlatformResponse {
    fn from_speech(speech: SpeechResponse, session: &Session) -> Self {
        Self {
            version: "1.0",
            session_attributes: session.attributes.clone(),
            response: ResponseBody {
                output_speech: OutputSpeech::PlainText { text: speech.speech_text },
                card: speech.card.map(|card| SimpleCard::Simple {
                    title: card.title,
                    content: card.body,
                }),
                should_end_session: !speech.expects_reply,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("event application id `{actual}` does not match the configured app id")]
    ApplicationIdMismatch { actual: String },
    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Runs one platform event through the router. `Ok(None)` means the event
/// needs no reply (session end, unsupported request kinds).
pub async fn handle_event(
    app: &Application,
    event: VoiceEvent,
) -> Result<Option<PlatformResponse>, DispatchError> {
    if let Some(expected) = &app.config.voice.app_id {
        let actual = event
            .session
            .application
            .as_ref()
            .map(|application| application.application_id.as_str())
            .unwrap_or_default();
        if actual != expected {
            return Err(DispatchError::ApplicationIdMismatch { actual: actual.to_owned() });
        }
    }

    let mut session = Session {
        id: event.session.session_id,
        is_new: event.session.is_new,
        attributes: event.session.attributes,
    };

    match event.request {
        RequestEnvelope::LaunchRequest { request_id } => {
            if session.is_new {
                app.hooks.on_session_started(&request_id, &session);
            }
            app.hooks.on_launch(&request_id, &session);
            Ok(Some(PlatformResponse::from_speech(speech::help(), &session)))
        }
        RequestEnvelope::IntentRequest { request_id, intent } => {
            if session.is_new {
                app.hooks.on_session_started(&request_id, &session);
            }
            let request = intent.into_intent_request();
            let response = app.router.dispatch(&request, &mut session).await?;
            info!(
                event_name = "voice.intent_handled",
                correlation_id = %request_id,
                session_id = %session.id,
                intent = %request.name,
                expects_reply = response.expects_reply,
                "intent handled"
            );
            Ok(Some(PlatformResponse::from_speech(response, &session)))
        }
        RequestEnvelope::SessionEndedRequest { request_id, reason } => {
            app.hooks.on_session_ended(&request_id, &session, reason.as_deref());
            Ok(None)
        }
        RequestEnvelope::Unsupported => {
            warn!(event_name = "voice.unsupported_request", "unsupported request type dropped");
            Ok(None)
        }
    }
}
