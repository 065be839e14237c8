use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DateTime;

/// An uploaded image attached to an outbound message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
}

impl Attachment {
    /// Markdown image tag for embedding the attachment in a message body.
    pub fn to_markdown(&self) -> String {
        format!("![]({})\n\n", self.url)
    }
}

/// Reference to the message an outbound message replies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRef {
    pub message_id: String,
}

/// An outbound message before validation and dispatch.
#[derive(Clone, Debug, Default)]
pub struct Draft {
    pub body: String,
    pub attachments: Vec<Attachment>,
    pub reply_to: Option<ReplyRef>,
}

impl Draft {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }
}

/// Receipt returned once a message was handed to the transport.
#[derive(Clone, Debug)]
pub struct SentReceipt {
    pub message_id: Uuid,
    pub sent_at: DateTime,
}

impl SentReceipt {
    pub(crate) fn new() -> Self {
        Self {
            message_id: Uuid::now_v7(),
            sent_at: DateTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_markdown_embeds_url() {
        let attachment = Attachment {
            url: "https://img.example/cat.png".to_owned(),
        };
        assert_eq!(
            attachment.to_markdown(),
            "![](https://img.example/cat.png)\n\n"
        );
    }
}
