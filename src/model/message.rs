//! Decoded chat records handed to the layout layer.
//!
//! These are the already-decoded, already-ordered message records produced
//! by the messaging client and store. The layout engine never inspects them;
//! only the data source (for grouping) and the measurer (for sizing) do.

use super::identifiers::ItemId;
use super::size::Alignment;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The local user; rendered trailing.
    Me,
    /// Another participant; rendered leading.
    Them,
    /// System notice; rendered centered.
    System,
}

impl Sender {
    /// Bubble justification for this sender.
    pub fn alignment(&self) -> Alignment {
        match self {
            Sender::Me => Alignment::Trailing,
            Sender::Them => Alignment::Leading,
            Sender::System => Alignment::Center,
        }
    }
}

/// Body of a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBody {
    /// Plain text bubble.
    Text {
        /// Message text, may contain newlines.
        text: String,
    },
    /// Image attachment with its intrinsic pixel size.
    Image {
        /// Intrinsic width.
        width: f64,
        /// Intrinsic height.
        height: f64,
    },
}

/// One decoded chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable message identity.
    pub id: ItemId,
    /// Author.
    pub sender: Sender,
    /// Send time, used to group messages by day.
    pub sent_at: DateTime<Utc>,
    /// Message body.
    #[serde(flatten)]
    pub body: MessageBody,
}

impl ChatMessage {
    /// Calendar day the message belongs to.
    pub fn day(&self) -> NaiveDate {
        self.sent_at.date_naive()
    }
}

/// Renderable content of a layout item.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatContent {
    /// A message bubble.
    Message {
        /// Author, drives alignment.
        sender: Sender,
        /// Message body.
        body: MessageBody,
    },
    /// Date header introducing a day section.
    DayHeader(NaiveDate),
}

impl ChatContent {
    /// Justification the renderer should use.
    pub fn alignment(&self) -> Alignment {
        match self {
            ChatContent::Message { sender, .. } => sender.alignment(),
            ChatContent::DayHeader(_) => Alignment::Center,
        }
    }
}

impl From<&ChatMessage> for ChatContent {
    fn from(message: &ChatMessage) -> Self {
        ChatContent::Message {
            sender: message.sender,
            body: message.body.clone(),
        }
    }
}
