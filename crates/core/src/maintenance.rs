//! Maintenance ticket statuses, priorities, and attachment naming.

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

pub const TICKET_NEW: &str = "New";
pub const TICKET_UNDER_REVIEW: &str = "Under Review";
pub const TICKET_IN_PROGRESS: &str = "In Progress";
pub const TICKET_RESOLVED: &str = "Resolved";
pub const TICKET_CLOSED: &str = "Closed";

/// All valid ticket statuses, in workflow order.
pub const VALID_TICKET_STATUSES: &[&str] = &[
    TICKET_NEW,
    TICKET_UNDER_REVIEW,
    TICKET_IN_PROGRESS,
    TICKET_RESOLVED,
    TICKET_CLOSED,
];

/// Maintenance ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    New,
    UnderReview,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => TICKET_NEW,
            Self::UnderReview => TICKET_UNDER_REVIEW,
            Self::InProgress => TICKET_IN_PROGRESS,
            Self::Resolved => TICKET_RESOLVED,
            Self::Closed => TICKET_CLOSED,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            TICKET_NEW => Ok(Self::New),
            TICKET_UNDER_REVIEW => Ok(Self::UnderReview),
            TICKET_IN_PROGRESS => Ok(Self::InProgress),
            TICKET_RESOLVED => Ok(Self::Resolved),
            TICKET_CLOSED => Ok(Self::Closed),
            other => Err(CoreError::Validation(format!(
                "Invalid ticket status '{other}'. Must be one of: {}",
                VALID_TICKET_STATUSES.join(", ")
            ))),
        }
    }

    /// Open tickets still hold their asset out of service.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::New | Self::UnderReview | Self::InProgress)
    }
}

/// Whether a stored status string denotes an open ticket.
///
/// Unknown strings are treated as open so the asset is not silently restored.
pub fn is_open(status: &str) -> bool {
    TicketStatus::parse(status).map_or(true, |s| s.is_open())
}

/// Status a ticket takes when someone is assigned to it.
///
/// Only `New` tickets advance; anything further along keeps its status.
pub fn status_after_ticket_assignment(current: TicketStatus) -> TicketStatus {
    match current {
        TicketStatus::New => TicketStatus::UnderReview,
        other => other,
    }
}

pub const PRIORITY_LOW: &str = "Low";
pub const PRIORITY_MEDIUM: &str = "Medium";
pub const PRIORITY_HIGH: &str = "High";
pub const PRIORITY_CRITICAL: &str = "Critical";

pub const VALID_PRIORITIES: &[&str] = &[PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH, PRIORITY_CRITICAL];

/// Ticket urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => PRIORITY_LOW,
            Self::Medium => PRIORITY_MEDIUM,
            Self::High => PRIORITY_HIGH,
            Self::Critical => PRIORITY_CRITICAL,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            PRIORITY_LOW => Ok(Self::Low),
            PRIORITY_MEDIUM => Ok(Self::Medium),
            PRIORITY_HIGH => Ok(Self::High),
            PRIORITY_CRITICAL => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "Invalid priority '{other}'. Must be one of: {}",
                VALID_PRIORITIES.join(", ")
            ))),
        }
    }
}

/// Maximum length of a ticket title.
pub const MAX_TITLE_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// File extensions accepted for ticket attachments.
pub const ALLOWED_ATTACHMENT_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "pdf", "doc", "docx"];

/// Reduce a client-supplied filename to a safe ASCII basename.
///
/// Path components are dropped, whitespace becomes `_`, and anything outside
/// `[A-Za-z0-9._-]` is removed. Leading dots are stripped.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Validate an attachment filename and return its sanitized form.
pub fn validate_attachment_filename(name: &str) -> Result<String, CoreError> {
    let sanitized = sanitize_filename(name);
    if sanitized.is_empty() {
        return Err(CoreError::Validation("No file selected".into()));
    }

    let ext = sanitized
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_ATTACHMENT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CoreError::Validation(format!(
            "File type not allowed. Allowed types: {}",
            ALLOWED_ATTACHMENT_EXTENSIONS.join(", ")
        )));
    }
    Ok(sanitized)
}

/// Stored name for a ticket attachment: `ticket_{id}_{YYYYmmdd_HHMMSS}_{name}`.
pub fn attachment_storage_name(ticket_id: DbId, uploaded_at: Timestamp, sanitized: &str) -> String {
    format!(
        "ticket_{ticket_id}_{}_{sanitized}",
        uploaded_at.format("%Y%m%d_%H%M%S")
    )
}
