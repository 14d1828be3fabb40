use std::fmt;

/// Parameterized SOQL construction. User-supplied slot values enter a query
/// only through [`Soql::and_eq`] and [`Soql::and_like`], which escape string
/// literals; trusted fixed clauses (`Available__c = true`,
/// `CreatedDate = TODAY`) go through [`Soql::and_raw`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Soql {
    fields: Vec<String>,
    object: String,
    conditions: Vec<String>,
    order: Option<String>,
}

impl Soql {
    pub fn select<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            object: String::new(),
            conditions: Vec::new(),
            order: None,
        }
    }

    pub fn from(mut self, object: impl Into<String>) -> Self {
        self.object = object.into();
        self
    }

    /// Equality filter on a string field. The value is escaped as a SOQL
    /// string literal.
    pub fn and_eq(mut self, field: &str, value: &str) -> Self {
        self.conditions.push(format!("{field} = '{}'", escape_literal(value)));
        self
    }

    /// Substring LIKE filter: the match text is stripped of its own wildcard
    /// characters, escaped, and wrapped in `%`.
    pub fn and_like(mut self, field: &str, contains: &str) -> Self {
        self.conditions.push(format!("{field} LIKE '%{}%'", like_fragment(contains)));
        self
    }

    /// Trusted literal clause. Never pass user-supplied text here.
    pub fn and_raw(mut self, clause: &str) -> Self {
        self.conditions.push(clause.to_owned());
        self
    }

    pub fn order_by(mut self, field: &str) -> Self {
        self.order = Some(field.to_owned());
        self
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn to_query_string(&self) -> String {
        let mut query = format!("SELECT {} FROM {}", self.fields.join(", "), self.object);
        if !self.conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.conditions.join(" AND "));
        }
        if let Some(order) = &self.order {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }
        query
    }
}

impl fmt::Display for Soql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn like_fragment(value: &str) -> String {
    let without_wildcards: String =
        value.chars().filter(|ch| !matches!(ch, '%' | '_')).collect();
    escape_literal(&without_wildcards)
}

#[cfg(test)]
mod tests {
    use super::Soql;

    #[test]
    fn renders_select_from_where() {
        let soql = Soql::select(["Name"]).from("Shopify_Product__c").and_raw("Available__c = true");

        assert_eq!(
            soql.to_query_string(),
            "SELECT Name FROM Shopify_Product__c WHERE Available__c = true"
        );
    }

    #[test]
    fn renders_like_filter_with_wrapping_wildcards() {
        let soql = Soql::select(["Name", "Available__c", "Price__c"])
            .from("Shopify_Product__c")
            .and_like("SearchName__c", "red widget");

        assert_eq!(
            soql.to_query_string(),
            "SELECT Name, Available__c, Price__c FROM Shopify_Product__c \
             WHERE SearchName__c LIKE '%red widget%'"
        );
    }

    #[test]
    fn renders_order_by_and_multiple_conditions() {
        let soql = Soql::select(["Id", "StartDateTime", "Subject", "Who.Name"])
            .from("Event")
            .and_raw("StartDateTime = TODAY")
            .order_by("StartDateTime");

        assert_eq!(
            soql.to_query_string(),
            "SELECT Id, StartDateTime, Subject, Who.Name FROM Event \
             WHERE StartDateTime = TODAY ORDER BY StartDateTime"
        );
    }

    #[test]
    fn escapes_quotes_and_backslashes_in_equality_values() {
        let soql = Soql::select(["Name"]).from("Opportunity").and_eq("Name", "O'Brien \\ Sons");

        assert_eq!(
            soql.to_query_string(),
            "SELECT Name FROM Opportunity WHERE Name = 'O\\'Brien \\\\ Sons'"
        );
    }

    #[test]
    fn strips_injected_wildcards_from_like_match_text() {
        let soql = Soql::select(["Name"]).from("Shopify_Product__c").and_like(
            "SearchName__c",
            "%' OR Name != '_",
        );

        assert_eq!(
            soql.to_query_string(),
            "SELECT Name FROM Shopify_Product__c WHERE SearchName__c LIKE '%\\' OR Name != \\'%'"
        );
    }
}
