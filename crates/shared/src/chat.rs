//! Chat transcript types shared between the UI and the dispatcher.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

/// Reference to binary content shown alongside a message.
///
/// Two locator formats, never mixed: user attachments carry the local
/// file path they were loaded from; assistant images carry a
/// `data:image/png;base64,...` URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAttachment {
    pub locator: String,
    pub media_type: String,
}

impl MessageAttachment {
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// A single transcript entry. Append-only: never mutated once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub text: Option<String>,
    pub attachment: Option<MessageAttachment>,
    pub timestamp: String,
}

impl Message {
    pub fn user(text: Option<String>, attachment: Option<MessageAttachment>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            text,
            attachment,
            timestamp: now_hhmm(),
        }
    }

    pub fn assistant(text: Option<String>, attachment: Option<MessageAttachment>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Assistant,
            text,
            attachment,
            timestamp: now_hhmm(),
        }
    }
}

fn now_hhmm() -> String {
    Utc::now().format("%H:%M").to_string()
}

/// Normalized output of one model dispatch. Transient: immediately
/// turned into a `Message` by the UI controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResult {
    pub text: Option<String>,
    pub image_locator: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors_set_sender() {
        let user = Message::user(Some("hi".to_string()), None);
        let reply = Message::assistant(Some("hello".to_string()), None);

        assert_eq!(user.sender, Sender::User);
        assert_eq!(reply.sender, Sender::Assistant);
        assert_ne!(user.id, reply.id);
    }

    #[test]
    fn test_attachment_image_detection() {
        let image = MessageAttachment {
            locator: "data:image/png;base64,QUJD".to_string(),
            media_type: "image/png".to_string(),
        };
        let pdf = MessageAttachment {
            locator: "/tmp/report.pdf".to_string(),
            media_type: "application/pdf".to_string(),
        };

        assert!(image.is_image());
        assert!(!pdf.is_image());
    }
}
