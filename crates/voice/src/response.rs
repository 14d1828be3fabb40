/// Card content shown on screen-bearing devices alongside the spoken text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub body: String,
}

/// A terminal reply. `expects_reply = false` is a `tell` (the turn ends);
/// `true` is an `ask` (the platform keeps the session open for a follow-up
/// utterance).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechResponse {
    pub speech_text: String,
    pub card: Option<Card>,
    pub expects_reply: bool,
}

impl SpeechResponse {
    pub fn tell(speech_text: impl Into<String>) -> Self {
        Self { speech_text: speech_text.into(), card: None, expects_reply: false }
    }

    pub fn tell_with_card(
        speech_text: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            speech_text: speech_text.into(),
            card: Some(Card { title: title.into(), body: body.into() }),
            expects_reply: false,
        }
    }

    pub fn ask(speech_text: impl Into<String>) -> Self {
        Self { speech_text: speech_text.into(), card: None, expects_reply: true }
    }

    pub fn is_tell(&self) -> bool {
        !self.expects_reply
    }
}

#[cfg(test)]
mod tests {
    use super::SpeechResponse;

    #[test]
    fn tell_and_ask_set_the_terminal_shape() {
        assert!(SpeechResponse::tell("done").is_tell());
        assert!(!SpeechResponse::ask("what next?").is_tell());
        assert!(SpeechResponse::tell("done").card.is_none());
    }

    #[test]
    fn tell_with_card_carries_title_and_body() {
        let response = SpeechResponse::tell_with_card("speech", "Shop Product", "speech");
        let card = response.card.expect("card");
        assert_eq!(card.title, "Shop Product");
        assert_eq!(card.body, "speech");
    }
}
