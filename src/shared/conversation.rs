//! Conversation Data Structures
//!
//! A conversation is one recorded exchange between a customer and an agent.
//! Conversations hang off a customer-agent link (`CustAgent`) and carry a
//! `version` counter that guards concurrent edits.
//!
//! The request types in this module validate and normalise their own
//! contents; stores and handlers only ever see checked values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::SharedError;

/// Version assigned to a freshly created conversation
pub const INITIAL_VERSION: i64 = 1;

/// A recorded conversation between a customer and an agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation ID
    pub id: Uuid,
    /// Customer-agent link this conversation belongs to
    pub cust_agent_id: Uuid,
    /// Customer side of the link
    pub customer_id: Uuid,
    /// Agent side of the link
    pub agent_id: Uuid,
    /// When the conversation took place
    pub time_date: DateTime<Utc>,
    /// Length of the conversation in seconds
    pub duration: i32,
    /// Exchange content
    pub exchange: String,
    /// Optional transcript text
    pub transcript: Option<String>,
    /// Optional reference to a stored recording
    pub file: Option<String>,
    /// Optimistic concurrency counter, bumped by exactly one per update
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Build a new conversation at `INITIAL_VERSION` for the given link
    pub fn new(link: &CustAgent, input: NewConversation, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cust_agent_id: link.id,
            customer_id: link.customer_id,
            agent_id: link.agent_id,
            time_date: input.time_date,
            duration: input.duration,
            exchange: input.exchange,
            transcript: input.transcript,
            file: input.file,
            version: INITIAL_VERSION,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the set fields of `changes` into this conversation.
    ///
    /// The version is left alone; bumping it is the store's job.
    pub fn merge(&mut self, changes: &ConversationChanges) {
        if let Some(time_date) = changes.time_date {
            self.time_date = time_date;
        }
        if let Some(duration) = changes.duration {
            self.duration = duration;
        }
        if let Some(exchange) = &changes.exchange {
            self.exchange = exchange.clone();
        }
        if let Some(transcript) = &changes.transcript {
            self.transcript = Some(transcript.clone());
        }
        if let Some(file) = &changes.file {
            self.file = Some(file.clone());
        }
    }
}

/// Link between a customer and the agent serving them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustAgent {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub agent_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request body for linking a customer to an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCustAgentRequest {
    pub customer_id: Uuid,
    pub agent_id: Uuid,
}

/// Request body for creating a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub cust_agent_id: Uuid,
    pub time_date: DateTime<Utc>,
    pub duration: i32,
    pub exchange: String,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

impl NewConversation {
    /// Check field rules and trim text fields.
    ///
    /// # Errors
    ///
    /// Returns `SharedError::ValidationError` naming the first bad field.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Self, SharedError> {
        check_not_future(self.time_date, now)?;
        check_duration(self.duration)?;

        let exchange = self.exchange.trim().to_string();
        if exchange.is_empty() {
            return Err(SharedError::validation(
                "exchange",
                "Exchange content is required",
            ));
        }

        Ok(Self {
            exchange,
            transcript: trimmed(self.transcript),
            file: trimmed(self.file),
            ..self
        })
    }
}

/// Partial update for a conversation; unset fields stay untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ConversationChanges {
    /// Check field rules and trim text fields.
    ///
    /// Text fields that are blank after trimming count as unset.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Self, SharedError> {
        if let Some(time_date) = self.time_date {
            check_not_future(time_date, now)?;
        }
        if let Some(duration) = self.duration {
            check_duration(duration)?;
        }

        Ok(Self {
            time_date: self.time_date,
            duration: self.duration,
            exchange: trimmed(self.exchange),
            transcript: trimmed(self.transcript),
            file: trimmed(self.file),
        })
    }
}

/// Raw query string for listing conversations
///
/// Everything arrives as text so that malformed values can be reported
/// per field instead of as a blanket extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationQuery {
    pub customer_id: Option<String>,
    pub agent_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_duration: Option<String>,
    pub max_duration: Option<String>,
}

/// Checked listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationFilter {
    pub customer_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    /// Inclusive range; only set when both ends were given
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub min_duration: Option<i32>,
    pub max_duration: Option<i32>,
}

impl ConversationFilter {
    /// Filter on the customer side of the link only
    pub fn for_customer(customer_id: Uuid) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Self::default()
        }
    }

    /// Filter on the agent side of the link only
    pub fn for_agent(agent_id: Uuid) -> Self {
        Self {
            agent_id: Some(agent_id),
            ..Self::default()
        }
    }

    /// Parse and check a raw query.
    ///
    /// # Errors
    ///
    /// - malformed UUIDs, dates, or durations
    /// - `endDate` before `startDate`
    /// - `minDuration` above `maxDuration`
    pub fn from_query(query: &ConversationQuery) -> Result<Self, SharedError> {
        let customer_id = parse_opt(query.customer_id.as_deref(), "customerId", parse_uuid)?;
        let agent_id = parse_opt(query.agent_id.as_deref(), "agentId", parse_uuid)?;
        let start = parse_opt(query.start_date.as_deref(), "startDate", parse_date)?;
        let end = parse_opt(query.end_date.as_deref(), "endDate", parse_date)?;
        let min_duration = parse_opt(query.min_duration.as_deref(), "minDuration", parse_duration)?;
        let max_duration = parse_opt(query.max_duration.as_deref(), "maxDuration", parse_duration)?;

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(SharedError::validation(
                    "endDate",
                    "End date must be after start date",
                ));
            }
        }
        if let (Some(min), Some(max)) = (min_duration, max_duration) {
            if min > max {
                return Err(SharedError::validation(
                    "maxDuration",
                    "Maximum duration must not be below minimum duration",
                ));
            }
        }

        Ok(Self {
            customer_id,
            agent_id,
            time_range: start.zip(end),
            min_duration,
            max_duration,
        })
    }

    /// Whether a conversation passes this filter
    pub fn matches(&self, conversation: &Conversation) -> bool {
        if self.customer_id.is_some_and(|id| id != conversation.customer_id) {
            return false;
        }
        if self.agent_id.is_some_and(|id| id != conversation.agent_id) {
            return false;
        }
        if let Some((start, end)) = self.time_range {
            if conversation.time_date < start || conversation.time_date > end {
                return false;
            }
        }
        if self.min_duration.is_some_and(|min| conversation.duration < min) {
            return false;
        }
        if self.max_duration.is_some_and(|max| conversation.duration > max) {
            return false;
        }
        true
    }
}

/// Parse a path or query identifier
pub fn parse_uuid(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| "Invalid ID format".to_string())
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` read as midnight UTC
fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| "Invalid date format".to_string())
}

fn parse_duration(raw: &str) -> Result<i32, String> {
    match raw.trim().parse::<i32>() {
        Ok(value) if value >= 0 => Ok(value),
        _ => Err("Duration must be a positive number".to_string()),
    }
}

fn parse_opt<T>(
    raw: Option<&str>,
    field: &str,
    parse: fn(&str) -> Result<T, String>,
) -> Result<Option<T>, SharedError> {
    raw.map(|value| parse(value).map_err(|message| SharedError::validation(field, message)))
        .transpose()
}

fn check_not_future(time_date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), SharedError> {
    if time_date > now {
        return Err(SharedError::validation(
            "timeDate",
            "Date cannot be in the future",
        ));
    }
    Ok(())
}

fn check_duration(duration: i32) -> Result<(), SharedError> {
    if duration < 0 {
        return Err(SharedError::validation(
            "duration",
            "Duration must be a positive number",
        ));
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn link() -> CustAgent {
        CustAgent {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            agent_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    fn new_conversation(link: &CustAgent) -> NewConversation {
        NewConversation {
            cust_agent_id: link.id,
            time_date: Utc::now() - Duration::minutes(5),
            duration: 300,
            exchange: "  Test conversation  ".to_string(),
            transcript: Some(" hello ".to_string()),
            file: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_new_conversation_is_trimmed() {
        let link = link();
        let checked = new_conversation(&link).validate(Utc::now()).unwrap();
        assert_eq!(checked.exchange, "Test conversation");
        assert_eq!(checked.transcript.as_deref(), Some("hello"));
        assert_eq!(checked.file, None);
    }

    #[test]
    fn test_new_conversation_rejects_future_date() {
        let link = link();
        let now = Utc::now();
        let input = NewConversation {
            time_date: now + Duration::days(365),
            ..new_conversation(&link)
        };
        let err = input.validate(now).unwrap_err();
        assert_eq!(err.field(), "timeDate");
    }

    #[test]
    fn test_new_conversation_rejects_negative_duration() {
        let link = link();
        let input = NewConversation {
            duration: -300,
            ..new_conversation(&link)
        };
        let err = input.validate(Utc::now()).unwrap_err();
        assert_eq!(err.field(), "duration");
    }

    #[test]
    fn test_new_conversation_requires_exchange() {
        let link = link();
        let input = NewConversation {
            exchange: " \t ".to_string(),
            ..new_conversation(&link)
        };
        let err = input.validate(Utc::now()).unwrap_err();
        assert_eq!(err.field(), "exchange");
    }

    #[test]
    fn test_new_conversation_starts_at_initial_version() {
        let link = link();
        let now = Utc::now();
        let input = new_conversation(&link).validate(now).unwrap();
        let conversation = Conversation::new(&link, input, now);
        assert_eq!(conversation.version, INITIAL_VERSION);
        assert_eq!(conversation.customer_id, link.customer_id);
        assert_eq!(conversation.agent_id, link.agent_id);
    }

    #[test]
    fn test_merge_only_touches_set_fields() {
        let link = link();
        let now = Utc::now();
        let mut conversation = Conversation::new(&link, new_conversation(&link), now);
        let before = conversation.clone();

        conversation.merge(&ConversationChanges {
            duration: Some(0),
            transcript: Some("rewritten".to_string()),
            ..ConversationChanges::default()
        });

        assert_eq!(conversation.duration, 0);
        assert_eq!(conversation.transcript.as_deref(), Some("rewritten"));
        assert_eq!(conversation.exchange, before.exchange);
        assert_eq!(conversation.time_date, before.time_date);
        assert_eq!(conversation.version, before.version);
    }

    #[test]
    fn test_changes_blank_text_counts_as_unset() {
        let changes = ConversationChanges {
            exchange: Some("   ".to_string()),
            ..ConversationChanges::default()
        }
        .validate(Utc::now())
        .unwrap();
        assert_eq!(changes, ConversationChanges::default());
    }

    #[test]
    fn test_changes_deserialize_from_camel_case() {
        let changes: ConversationChanges =
            serde_json::from_str(r#"{"duration": 42, "timeDate": "2024-01-01T10:00:00Z"}"#).unwrap();
        assert_eq!(changes.duration, Some(42));
        assert!(changes.time_date.is_some());
        assert!(changes.exchange.is_none());
    }

    #[test]
    fn test_filter_date_range_needs_both_ends() {
        let query = ConversationQuery {
            start_date: Some("2024-01-01T00:00:00Z".to_string()),
            ..ConversationQuery::default()
        };
        let filter = ConversationFilter::from_query(&query).unwrap();
        assert_eq!(filter.time_range, None);
    }

    #[test]
    fn test_filter_accepts_bare_dates() {
        let query = ConversationQuery {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-02-01T12:30:00+02:00".to_string()),
            ..ConversationQuery::default()
        };
        let filter = ConversationFilter::from_query(&query).unwrap();
        let (start, end) = filter.time_range.unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-02-01T10:30:00+00:00");

        let query = ConversationQuery {
            start_date: Some("2024-13-01".to_string()),
            ..ConversationQuery::default()
        };
        let err = ConversationFilter::from_query(&query).unwrap_err();
        assert_eq!(err.field(), "startDate");
    }

    #[test]
    fn test_filter_rejects_inverted_range() {
        let query = ConversationQuery {
            start_date: Some("2024-02-01T00:00:00Z".to_string()),
            end_date: Some("2024-01-01T00:00:00Z".to_string()),
            ..ConversationQuery::default()
        };
        let err = ConversationFilter::from_query(&query).unwrap_err();
        assert_eq!(err.field(), "endDate");
    }

    #[test]
    fn test_filter_rejects_invalid_duration() {
        let query = ConversationQuery {
            min_duration: Some("invalid".to_string()),
            ..ConversationQuery::default()
        };
        let err = ConversationFilter::from_query(&query).unwrap_err();
        assert_eq!(err.field(), "minDuration");
    }

    #[test]
    fn test_filter_matches() {
        let link = link();
        let conversation = Conversation::new(&link, new_conversation(&link), Utc::now());

        assert!(ConversationFilter::for_customer(link.customer_id).matches(&conversation));
        assert!(!ConversationFilter::for_agent(Uuid::new_v4()).matches(&conversation));

        let bounded = ConversationFilter {
            min_duration: Some(100),
            max_duration: Some(600),
            ..ConversationFilter::default()
        };
        assert!(bounded.matches(&conversation));

        let too_long = ConversationFilter {
            min_duration: Some(301),
            ..ConversationFilter::default()
        };
        assert!(!too_long.matches(&conversation));
    }
}
