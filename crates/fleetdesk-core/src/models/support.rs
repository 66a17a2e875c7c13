use serde::{Deserialize, Serialize};

use super::common::{Envelope, PaginationMeta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" => Some(TicketStatus::Pending),
            "open" => Some(TicketStatus::Open),
            "in_progress" => Some(TicketStatus::InProgress),
            "resolved" => Some(TicketStatus::Resolved),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requester {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A support ticket opened by a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportRequest {
    pub id: i64,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub admin_response: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub user: Option<Requester>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

impl SupportRequest {
    pub fn status(&self) -> Option<TicketStatus> {
        self.status.as_deref().and_then(TicketStatus::parse)
    }

    pub fn is_open(&self) -> bool {
        !matches!(
            self.status(),
            Some(TicketStatus::Resolved) | Some(TicketStatus::Closed)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportRequestCollection {
    #[serde(default)]
    pub support_requests: Vec<SupportRequest>,
    #[serde(default)]
    pub meta: PaginationMeta,
}

pub type SupportRequestsResponse = Envelope<SupportRequestCollection>;

/// Payload for answering a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportReply {
    pub admin_response: String,
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_support_requests() {
        let json = r#"{"success": true, "message": "ok", "data": {"support_requests": [
            {"id": 4, "request_id": "SR-0004", "subject": "App crash", "issue_type": "Technical",
             "details": "Crashes on login", "admin_response": "", "status": "in_progress",
             "date_created": "2025-01-02", "user": {"id": 9, "name": "Ali", "email": "a@x", "phone": "05"}}],
            "meta": {"current_page": "1", "last_page": "1", "per_page": "0", "total": "1"}}}"#;

        let resp: SupportRequestsResponse =

            serde_json::from_str(json).expect("Failed to parse support JSON");
        let ticket = &resp.data.support_requests[0];
        assert_eq!(ticket.status(), Some(TicketStatus::InProgress));
        assert!(ticket.is_open());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(TicketStatus::parse("In Progress"), Some(TicketStatus::InProgress));
        assert_eq!(TicketStatus::parse("closed"), Some(TicketStatus::Closed));
        assert_eq!(TicketStatus::parse("archived"), None);
    }

    #[test]
    fn test_reply_serializes_snake_case_status() {
        let reply = SupportReply {
            admin_response: "Fixed in 2.1".into(),
            status: TicketStatus::InProgress,
        };
        let value = serde_json::to_value(&reply).expect("serialize");
        assert_eq!(value["status"], "in_progress");
    }
}
