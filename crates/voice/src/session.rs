use crate::event::Session;

const PHASE_KEY: &str = "lead_flow_phase";
const FIRST_NAME_KEY: &str = "lead_first_name";
const LAST_NAME_KEY: &str = "lead_last_name";

const PHASE_AWAITING_NAME: &str = "awaiting_name";
const PHASE_AWAITING_COMPANY: &str = "awaiting_company";

/// Typed view of the lead-capture scratch state carried in the session's
/// string attribute bag. Decoding is total: anything that is not a coherent
/// phase reads as `Idle`, so a conversation can always restart the flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeadFlowPhase {
    Idle,
    AwaitingName,
    AwaitingCompany { first_name: String, last_name: Option<String> },
}

impl LeadFlowPhase {
    pub fn from_session(session: &Session) -> Self {
        match session.attribute(PHASE_KEY) {
            Some(PHASE_AWAITING_NAME) => Self::AwaitingName,
            Some(PHASE_AWAITING_COMPANY) => match session.attribute(FIRST_NAME_KEY) {
                Some(first_name) => Self::AwaitingCompany {
                    first_name: first_name.to_owned(),
                    last_name: session.attribute(LAST_NAME_KEY).map(str::to_owned),
                },
                // A phase marker without a stored name is unusable scratch
                // state; treat the flow as not started.
                None => Self::Idle,
            },
            _ => Self::Idle,
        }
    }

    pub fn store(&self, session: &mut Session) {
        match self {
            Self::Idle => {
                session.remove_attribute(PHASE_KEY);
                session.remove_attribute(FIRST_NAME_KEY);
                session.remove_attribute(LAST_NAME_KEY);
            }
            Self::AwaitingName => {
                session.set_attribute(PHASE_KEY, PHASE_AWAITING_NAME);
                session.remove_attribute(FIRST_NAME_KEY);
                session.remove_attribute(LAST_NAME_KEY);
            }
            Self::AwaitingCompany { first_name, last_name } => {
                session.set_attribute(PHASE_KEY, PHASE_AWAITING_COMPANY);
                session.set_attribute(FIRST_NAME_KEY, first_name.clone());
                match last_name {
                    Some(last_name) => session.set_attribute(LAST_NAME_KEY, last_name.clone()),
                    None => session.remove_attribute(LAST_NAME_KEY),
                }
            }
        }
    }
}

/// Splits a captured full name at the first whitespace into first/last.
/// A single-token name ("Cher") has no last name; the remote side's handling
/// of a missing last name is an upstream contract, not ours to paper over.
pub fn split_name(raw: &str) -> (String, Option<String>) {
    let trimmed = raw.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_owned(), Some(rest.trim_start().to_owned())),
        None => (trimmed.to_owned(), None),
    }
}

/// Rejoins stored name tokens for speech output.
pub fn spoken_name(first_name: &str, last_name: Option<&str>) -> String {
    match last_name {
        Some(last_name) => format!("{first_name} {last_name}"),
        None => first_name.to_owned(),
    }
}
