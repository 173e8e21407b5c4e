//! Contact message models and DTOs

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// `local@domain.tld` shape: no whitespace, a single `@`, a dot in the domain part
pub static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Lifecycle state of a contact message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Freshly submitted, nobody has looked at it yet
    #[default]
    New,
    Read,
    Responded,
    Archived,
}

impl MessageStatus {
    pub const ALL: [MessageStatus; 4] = [
        MessageStatus::New,
        MessageStatus::Read,
        MessageStatus::Responded,
        MessageStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::New => "new",
            MessageStatus::Read => "read",
            MessageStatus::Responded => "responded",
            MessageStatus::Archived => "archived",
        }
    }

    /// Whether a message currently in `self` may be moved to `next`.
    ///
    /// Staying in the same state is always allowed so that repeated updates
    /// are idempotent. Once answered, a message can only be archived; an
    /// archived message can only be reopened as `new`.
    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        use MessageStatus::*;

        if *self == next {
            return true;
        }
        match self {
            New | Read => true,
            Responded => next == Archived,
            Archived => next == New,
        }
    }

    /// States from which `target` is unreachable
    pub fn blocked_sources(target: MessageStatus) -> Vec<MessageStatus> {
        Self::ALL
            .into_iter()
            .filter(|from| !from.can_transition_to(target))
            .collect()
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Expected one of: new, read, responded, archived",
            self.0
        )
    }
}

impl FromStr for MessageStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(MessageStatus::New),
            "read" => Ok(MessageStatus::Read),
            "responded" => Ok(MessageStatus::Responded),
            "archived" => Ok(MessageStatus::Archived),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Raw body of `POST /api/contact`.
///
/// Every field is optional at the serde level so that absent fields reach
/// validation instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct ContactSubmissionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactSubmissionRequest {
    /// Names of required fields that are absent or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value.as_deref()))
        .map(|(field, _)| field)
        .collect()
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Request metadata recorded alongside a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

/// A submission that passed the required-field check, ready for insertion
#[derive(Debug, Clone, Validate)]
pub struct NewContactMessage {
    pub name: String,
    #[validate(regex(path = *EMAIL_RE, message = "Invalid email address"))]
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl NewContactMessage {
    /// Build from a request whose required fields are known to be present.
    /// Values are trimmed; a blank phone number is stored as NULL.
    pub fn from_request(req: ContactSubmissionRequest, client: ClientInfo) -> Self {
        let trimmed = |value: Option<String>| value.unwrap_or_default().trim().to_string();
        Self {
            name: trimmed(req.name),
            email: trimmed(req.email),
            phone: req
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            message: trimmed(req.message),
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        }
    }
}

/// A persisted message as exposed by the list endpoint.
/// `ip_address` and `user_agent` are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

/// Payload returned after a successful submission
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionCreated {
    pub id: String,
}

/// Body of `PUT /api/contact/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> ClientInfo {
        ClientInfo {
            ip_address: "203.0.113.7".to_string(),
            user_agent: "curl/8.0".to_string(),
        }
    }

    #[test]
    fn email_pattern_accepts_plain_addresses() {
        for ok in ["a@b.com", "first.last+tag@mail.example.org", "x@y.z"] {
            assert!(EMAIL_RE.is_match(ok), "{} should match", ok);
        }
    }

    #[test]
    fn email_pattern_rejects_malformed_addresses() {
        for bad in ["not-an-email", "a@b", "@b.com", "a@.com", "a b@c.com", "a@b.", "a@@b.com"] {
            assert!(!EMAIL_RE.is_match(bad), "{} should not match", bad);
        }
    }

    #[test]
    fn missing_fields_treats_blank_as_missing() {
        let req = ContactSubmissionRequest {
            name: Some("  ".to_string()),
            email: None,
            phone: None,
            message: Some("hello".to_string()),
        };
        assert_eq!(req.missing_fields(), vec!["name", "email"]);
    }

    #[test]
    fn new_message_trims_and_drops_blank_phone() {
        let req = ContactSubmissionRequest {
            name: Some(" Ada ".to_string()),
            email: Some("ada@example.com ".to_string()),
            phone: Some("   ".to_string()),
            message: Some("hi".to_string()),
        };
        let msg = NewContactMessage::from_request(req, client());
        assert_eq!(msg.name, "Ada");
        assert_eq!(msg.email, "ada@example.com");
        assert_eq!(msg.phone, None);
        assert_eq!(msg.ip_address, "203.0.113.7");
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn new_message_validation_flags_email() {
        let req = ContactSubmissionRequest {
            name: Some("Ada".to_string()),
            email: Some("a@b".to_string()),
            phone: Some("555-0100".to_string()),
            message: Some("hi".to_string()),
        };
        let msg = NewContactMessage::from_request(req, client());
        assert_eq!(msg.phone.as_deref(), Some("555-0100"));
        let errors = msg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("READ".parse::<MessageStatus>().unwrap(), MessageStatus::Read);
        assert_eq!(" archived ".parse::<MessageStatus>().unwrap(), MessageStatus::Archived);
        assert!("spam".parse::<MessageStatus>().is_err());
    }

    #[test]
    fn status_transitions() {
        use MessageStatus::*;

        assert!(New.can_transition_to(Read));
        assert!(Read.can_transition_to(New));
        assert!(Read.can_transition_to(Responded));
        assert!(Responded.can_transition_to(Archived));
        assert!(Responded.can_transition_to(Responded));
        assert!(!Responded.can_transition_to(New));
        assert!(!Responded.can_transition_to(Read));
        assert!(Archived.can_transition_to(New));
        assert!(!Archived.can_transition_to(Read));
    }

    #[test]
    fn blocked_sources_inverts_transition_table() {
        use MessageStatus::*;

        assert!(MessageStatus::blocked_sources(Archived).is_empty());
        assert_eq!(MessageStatus::blocked_sources(New), vec![Responded]);
        assert_eq!(MessageStatus::blocked_sources(Read), vec![Responded, Archived]);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&MessageStatus::Responded).unwrap();
        assert_eq!(json, "\"responded\"");
        assert_eq!(MessageStatus::default(), MessageStatus::New);
    }
}
