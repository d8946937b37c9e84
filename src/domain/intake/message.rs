//! Transcript messages.
//!
//! Messages are immutable once appended to a profile's transcript. A user
//! message may carry one binary attachment (a photo of a wound, a lab
//! report) which is forwarded to reply generation only.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Side of the conversation that produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The pet owner.
    User,
    /// The assistant.
    Assistant,
}

/// Binary payload attached to a message.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Raw bytes.
    pub data: Vec<u8>,
    /// MIME type, e.g. `image/jpeg`.
    pub media_type: String,
    /// Original file name.
    pub filename: String,
}

impl Attachment {
    /// Creates a new attachment.
    pub fn new(data: Vec<u8>, media_type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
            filename: filename.into(),
        }
    }

    /// Returns true for `image/*` payloads.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Payloads can be megabytes; keep them out of debug output and logs.
impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("media_type", &self.media_type)
            .field("filename", &self.filename)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub attachment: Option<Attachment>,
    pub created_at: Timestamp,
}

impl Message {
    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            attachment: None,
            created_at: Timestamp::now(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            attachment: None,
            created_at: Timestamp::now(),
        }
    }

    /// Attaches a binary payload.
    pub fn with_attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.attachment = attachment;
        self
    }

    /// Returns true if this message came from the pet owner.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_roles() {
        assert_eq!(Message::user("hi").role, Role::User);
        assert_eq!(Message::assistant("hello").role, Role::Assistant);
        assert!(Message::user("hi").is_user());
    }

    #[test]
    fn attachment_is_optional() {
        let msg = Message::user("look at this")
            .with_attachment(Some(Attachment::new(vec![1, 2, 3], "image/png", "paw.png")));
        let attachment = msg.attachment.as_ref().unwrap();
        assert!(attachment.is_image());
        assert_eq!(attachment.len(), 3);
        assert!(Message::user("plain").attachment.is_none());
    }

    #[test]
    fn attachment_debug_omits_payload() {
        let attachment = Attachment::new(vec![0xAB; 64], "application/pdf", "labs.pdf");
        let debug = format!("{:?}", attachment);
        assert!(debug.contains("bytes: 64"));
        assert!(!debug.contains("171"));
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
