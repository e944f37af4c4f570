//! Message entity - a message within a conversation

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Window after creation during which the author may edit a message
pub const EDIT_WINDOW: Duration = Duration::minutes(15);

/// Message content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    File,
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Text
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
            Self::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "file" => Ok(Self::File),
            _ => Err(format!("Invalid message kind: {s}")),
        }
    }
}

/// Attachment descriptor
///
/// The Storage collaborator owns the bytes; the domain stores only this
/// descriptor, never raw content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub path: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

impl Attachment {
    /// Check if the attachment is an image
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Message entity
///
/// State machine: created → (optionally) edited, window-gated → (optionally)
/// soft-deleted. There is no transition out of soft-deleted. `created_at` is
/// immutable and totally orders messages within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub author_id: Uuid,
    pub body: Option<String>,
    pub kind: MessageKind,
    pub attachments: Vec<Attachment>,
    pub read_at: Option<DateTime<Utc>>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message
    ///
    /// New messages always start unread; the kind is derived from the
    /// attachment list when one is present.
    pub fn new(
        conversation_id: Uuid,
        author_id: Uuid,
        body: Option<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        let kind = match attachments.first() {
            Some(a) if a.is_image() => MessageKind::Image,
            Some(_) => MessageKind::File,
            None => MessageKind::Text,
        };
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            author_id,
            body,
            kind,
            attachments,
            read_at: None,
            edited_at: None,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Check if message has been read
    #[inline]
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Check if message is tombstoned
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check whether the message is still inside the edit window at `now`
    pub fn is_editable_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.created_at) <= EDIT_WINDOW
    }

    /// Tombstone the message: body and attachments are cleared, id and
    /// timestamps survive so ordering stays stable.
    pub fn tombstone(&mut self, at: DateTime<Utc>) {
        self.body = None;
        self.attachments.clear();
        self.deleted_at = Some(at);
    }
}
