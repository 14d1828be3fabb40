//! Pure formatting of CRM results into speech text and card content.
//!
//! Wording here is load-bearing: the sentences below are the product's voice
//! and are pinned by tests. Counted nouns pluralize on the count, lists of
//! two or more names join the last pair with "and", and money/percentage
//! values interpolate the raw field text with no reformatting.

use chrono::{DateTime, FixedOffset, Timelike};
use chrono_tz::Tz;
use voxy_crm::RecordSet;

use crate::response::SpeechResponse;

pub const REMOTE_APOLOGY: &str = "Darn, there was a Salesforce problem, sorry";
// Spoken when the service resolves the insert but reports success = false.
// Not the same sentence as the transport apology.
pub const INSERT_REJECTED_APOLOGY: &str = "Darn, there was a salesforce problem, sorry.";

pub const HELP_PROMPT: &str = "You can ask Salesforce to check for any new leads, your calendar \
                               for today, the status of a specific opportunity or to create a new \
                               lead, or, you can say exit... What can I help you with?";

/// Which card title a handler's successful replies carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardDomain {
    ShopProduct,
    Salesforce,
}

impl CardDomain {
    pub fn title(self) -> &'static str {
        match self {
            Self::ShopProduct => "Shop Product",
            Self::Salesforce => "Salesforce",
        }
    }
}

fn tell_card(domain: CardDomain, speech: String) -> SpeechResponse {
    SpeechResponse::tell_with_card(speech.clone(), domain.title(), speech)
}

/// Fixed apology for a rejected remote call. Plain tell, no card.
pub fn remote_failure() -> SpeechResponse {
    SpeechResponse::tell(REMOTE_APOLOGY)
}

pub fn insert_rejected() -> SpeechResponse {
    tell_card(CardDomain::Salesforce, INSERT_REJECTED_APOLOGY.to_owned())
}

pub fn help() -> SpeechResponse {
    SpeechResponse::ask(HELP_PROMPT)
}

/// Singular/plural form of a counted noun.
pub fn pluralize(noun: &str, count: usize) -> String {
    if count == 1 {
        return noun.to_owned();
    }

    if noun.ends_with('s')
        || noun.ends_with('x')
        || noun.ends_with('z')
        || noun.ends_with("ch")
        || noun.ends_with("sh")
    {
        return format!("{noun}es");
    }

    if let Some(stem) = noun.strip_suffix('y') {
        let preceded_by_vowel =
            stem.chars().next_back().is_some_and(|ch| "aeiou".contains(ch.to_ascii_lowercase()));
        if !preceded_by_vowel {
            return format!("{stem}ies");
        }
    }

    format!("{noun}s")
}

/// Comma-joined name list with " and " before the final name, each item
/// prefixed so it appends directly to a leading sentence:
/// `, A` / `, A and B` / `, A, B and C`.
fn spoken_list(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => format!(", {only}"),
        [rest @ .., last] => format!(", {} and {last}", rest.join(", ")),
    }
}

pub fn product_list(records: &RecordSet) -> SpeechResponse {
    if records.is_empty() {
        return tell_card(CardDomain::ShopProduct, "Sorry, no products are in stock.".to_owned());
    }

    let count = records.len();
    let names: Vec<&str> = records.iter().filter_map(|record| record.text("Name")).collect();
    let speech = format!(
        "There are {count} {} in stock{}",
        pluralize("product", count),
        spoken_list(&names)
    );
    tell_card(CardDomain::ShopProduct, speech)
}

pub fn product_detail(product_name: &str, records: &RecordSet) -> SpeechResponse {
    let Some(product) = records.first() else {
        return tell_card(
            CardDomain::ShopProduct,
            format!("Sorry, I could not find any Product named, {product_name}"),
        );
    };

    let name = product.text("Name").unwrap_or(product_name);
    let price = product.display("Price__c").unwrap_or_default();
    let availability =
        if product.flag("Available__c") { "in stock." } else { "not in stock." };
    let speech =
        format!("I found product, {name} for {price} points, the product is {availability}");
    tell_card(CardDomain::ShopProduct, speech)
}

pub fn product_availability(product_name: &str, records: &RecordSet) -> SpeechResponse {
    let Some(product) = records.first() else {
        return tell_card(
            CardDomain::ShopProduct,
            format!("Sorry, I could not find any Product named, {product_name}"),
        );
    };

    let name = product.text("Name").unwrap_or(product_name);
    let speech = if product.flag("Available__c") {
        let price = product.display("Price__c").unwrap_or_default();
        format!("{name} is in stock and it is available for {price} points.")
    } else {
        format!("{name} is currently not in stock.")
    };
    tell_card(CardDomain::ShopProduct, speech)
}

pub fn opportunity_status(opportunity_name: &str, records: &RecordSet) -> SpeechResponse {
    let Some(opportunity) = records.first() else {
        return tell_card(
            CardDomain::Salesforce,
            format!("Sorry, I could not find an Opportunity named, {opportunity_name}"),
        );
    };

    let amount = opportunity.display("Amount").unwrap_or_default();
    let stage = opportunity.display("StageName").unwrap_or_default();
    let probability = opportunity.display("Probability").unwrap_or_default();
    let speech = format!(
        "I found Opportunity {opportunity_name} for ${amount}, the stage is {stage} and the \
         probability is {probability}%"
    );
    tell_card(CardDomain::Salesforce, speech)
}

pub fn new_leads(records: &RecordSet) -> SpeechResponse {
    if records.is_empty() {
        return tell_card(
            CardDomain::Salesforce,
            "Sorry, you do not have any new leads for today.".to_owned(),
        );
    }

    let count = records.len();
    let entries: Vec<String> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            format!(
                "{}, {} from {}",
                index + 1,
                record.text("Name").unwrap_or_default(),
                record.text("Company").unwrap_or_default()
            )
        })
        .collect();
    let entry_refs: Vec<&str> = entries.iter().map(String::as_str).collect();

    let speech = format!(
        "You have {count} new {}{}, Go get them tiger!",
        pluralize("lead", count),
        spoken_list(&entry_refs)
    );
    tell_card(CardDomain::Salesforce, speech)
}

pub fn calendar_today(records: &RecordSet, timezone: Tz) -> SpeechResponse {
    let count = records.len();
    let mut speech = format!("You have {count} {} for today, ", pluralize("event", count));

    for record in records.iter() {
        let start = record.text("StartDateTime").map(|raw| start_time_text(raw, timezone));
        speech.push_str(&format!(
            "At {}, {}",
            start.unwrap_or_default(),
            record.text("Subject").unwrap_or_default()
        ));
        if let Some(who) = record.child("Who").and_then(|who| who.text("Name").map(String::from)) {
            speech.push_str(&format!(", with {who}"));
        }
        speech.push_str(", ");
    }

    tell_card(CardDomain::Salesforce, speech)
}

/// Unpadded clock reading with a lowercase meridiem, e.g. `9:5 am`.
pub fn clock_text(instant: DateTime<Tz>) -> String {
    let (is_pm, hour) = instant.hour12();
    format!("{hour}:{} {}", instant.minute(), if is_pm { "pm" } else { "am" })
}

// The service emits RFC 3339 timestamps with a colon-free offset
// (`2026-03-08T19:00:00.000+0000`); a value that parses as neither form is
// spoken verbatim.
fn start_time_text(raw: &str, timezone: Tz) -> String {
    parse_instant(raw)
        .map(|instant| clock_text(instant.with_timezone(&timezone)))
        .unwrap_or_else(|| raw.to_owned())
}

fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

pub fn lead_start_prompt() -> SpeechResponse {
    SpeechResponse::ask(
        "OK, let's create a new lead., What is the person's first and last name?",
    )
}

pub fn lead_name_prompt(spoken_name: &str) -> SpeechResponse {
    SpeechResponse::ask(format!(
        "Got it. the name is, {spoken_name}., What is the company name?"
    ))
}

pub fn lead_restart_prompt() -> SpeechResponse {
    SpeechResponse::ask(
        "I do not have a name for the new lead yet., What is the person's first and last name?",
    )
}

pub fn lead_created(spoken_name: &str, company: &str) -> SpeechResponse {
    tell_card(
        CardDomain::Salesforce,
        format!("Bingo! I created a new lead for {spoken_name} with the company name {company}"),
    )
}

#[cfg(test)]
mod tests {
    use chrono_tz::Tz;
    use voxy_crm::{Record, RecordSet};

    use super::{
        calendar_today, new_leads, opportunity_status, pluralize, product_availability,
        product_detail, product_list,
    };

    fn product(name: &str, available: bool, price: i64) -> Record {
        Record::new()
            .with_field("Name", name)
            .with_field("Available__c", available)
            .with_field("Price__c", price)
    }

    const PT: Tz = chrono_tz::America::Los_Angeles;

    #[test]
    fn product_list_empty_uses_fixed_not_in_stock_sentence() {
        let response = product_list(&RecordSet::default());
        assert_eq!(response.speech_text, "Sorry, no products are in stock.");
        assert!(response.is_tell());
    }

    #[test]
    fn product_list_singular_count() {
        let records = RecordSet::from(vec![product("Widget", true, 10)]);
        let response = product_list(&records);
        assert_eq!(response.speech_text, "There are 1 product in stock, Widget");
    }

    #[test]
    fn product_list_joins_last_two_names_with_and() {
        let records = RecordSet::from(vec![
            product("Widget", true, 10),
            product("Gadget", true, 20),
            product("Sprocket", true, 30),
        ]);
        let response = product_list(&records);
        assert_eq!(
            response.speech_text,
            "There are 3 products in stock, Widget, Gadget and Sprocket"
        );
    }

    #[test]
    fn product_list_pair_skips_serial_comma() {
        let records = RecordSet::from(vec![product("Widget", true, 10), product("Gadget", true, 20)]);
        assert_eq!(
            product_list(&records).speech_text,
            "There are 2 products in stock, Widget and Gadget"
        );
    }

    #[test]
    fn product_detail_not_found_interpolates_requested_name() {
        let response = product_detail("flux capacitor", &RecordSet::default());
        assert_eq!(
            response.speech_text,
            "Sorry, I could not find any Product named, flux capacitor"
        );
    }

    #[test]
    fn product_detail_speaks_raw_price_and_availability() {
        let records = RecordSet::from(vec![product("Widget", true, 1500)]);
        let response = product_detail("widget", &records);
        assert_eq!(
            response.speech_text,
            "I found product, Widget for 1500 points, the product is in stock."
        );
        assert_eq!(response.card.expect("card").title, "Shop Product");
    }

    #[test]
    fn product_availability_covers_both_stock_states() {
        let in_stock = RecordSet::from(vec![product("Widget", true, 25)]);
        let sold_out = RecordSet::from(vec![product("Widget", false, 25)]);

        assert_eq!(
            product_availability("widget", &in_stock).speech_text,
            "Widget is in stock and it is available for 25 points."
        );
        assert_eq!(
            product_availability("widget", &sold_out).speech_text,
            "Widget is currently not in stock."
        );
    }

    #[test]
    fn opportunity_status_interpolates_raw_amount_and_probability() {
        let records = RecordSet::from(vec![Record::new()
            .with_field("Name", "Acme Renewal")
            .with_field("StageName", "Negotiation")
            .with_field("Probability", serde_json::json!(62.5))
            .with_field("Amount", serde_json::json!(120000))]);

        let response = opportunity_status("Acme Renewal", &records);
        assert_eq!(
            response.speech_text,
            "I found Opportunity Acme Renewal for $120000, the stage is Negotiation and the \
             probability is 62.5%"
        );
    }

    #[test]
    fn opportunity_not_found_uses_fixed_template() {
        let response = opportunity_status("Acme Renewal", &RecordSet::default());
        assert_eq!(
            response.speech_text,
            "Sorry, I could not find an Opportunity named, Acme Renewal"
        );
    }

    #[test]
    fn new_leads_numbers_entries_and_keeps_the_closer() {
        let records = RecordSet::from(vec![
            Record::new().with_field("Name", "Jane Doe").with_field("Company", "Acme"),
            Record::new().with_field("Name", "John Roe").with_field("Company", "Globex"),
        ]);

        let response = new_leads(&records);
        assert_eq!(
            response.speech_text,
            "You have 2 new leads, 1, Jane Doe from Acme and 2, John Roe from Globex, \
             Go get them tiger!"
        );
    }

    #[test]
    fn new_leads_empty_uses_fixed_sentence() {
        assert_eq!(
            new_leads(&RecordSet::default()).speech_text,
            "Sorry, you do not have any new leads for today."
        );
    }

    #[test]
    fn calendar_renders_unpadded_pacific_time_with_contact() {
        // 17:05 UTC is 9:05 in Los Angeles (PST, winter).
        let records = RecordSet::from(vec![Record::new()
            .with_field("StartDateTime", "2026-01-12T17:05:00.000+0000")
            .with_field("Subject", "Pipeline review")
            .with_field("Who", serde_json::json!({"Name": "Bob"}))]);

        let response = calendar_today(&records, PT);
        assert_eq!(
            response.speech_text,
            "You have 1 event for today, At 9:5 am, Pipeline review, with Bob, "
        );
    }

    #[test]
    fn calendar_omits_with_clause_when_no_contact() {
        let records = RecordSet::from(vec![Record::new()
            .with_field("StartDateTime", "2026-01-12T22:30:00.000+0000")
            .with_field("Subject", "Forecast call")
            .with_field("Who", serde_json::Value::Null)]);

        let response = calendar_today(&records, PT);
        assert_eq!(
            response.speech_text,
            "You have 1 event for today, At 2:30 pm, Forecast call, "
        );
    }

    #[test]
    fn calendar_zero_events_still_reports_the_count() {
        let response = calendar_today(&RecordSet::default(), PT);
        assert_eq!(response.speech_text, "You have 0 events for today, ");
    }

    #[test]
    fn pluralize_follows_standard_rules() {
        assert_eq!(pluralize("product", 1), "product");
        assert_eq!(pluralize("product", 3), "products");
        assert_eq!(pluralize("lead", 0), "leads");
        assert_eq!(pluralize("event", 2), "events");
        assert_eq!(pluralize("opportunity", 2), "opportunities");
        assert_eq!(pluralize("match", 2), "matches");
    }
}
