//! Chat transcript grouped into one section per calendar day.

use super::DataSource;
use crate::diff::{ItemSnapshot, SectionSnapshot, Snapshot};
use crate::model::{ChatContent, ChatMessage, ItemId, ItemSize, MessageBody, SectionId, Size};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors while loading a transcript file.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The file does not exist.
    #[error("Transcript not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// I/O failure while reading.
    #[error("Failed to read transcript: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a JSON array of chat messages.
    #[error("Invalid transcript {path}: {source}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// Production data source: decoded chat records, ordered as received.
///
/// Messages are grouped by the UTC calendar day of `sent_at`, oldest day
/// first; within a day they keep their input order. Each day section gets a
/// date header whose identity is derived from the date, so it survives
/// reloads.
#[derive(Debug, Clone, Default)]
pub struct TranscriptSource {
    messages: Vec<ChatMessage>,
}

impl TranscriptSource {
    /// Source over `messages`.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Load a JSON array of messages from `path`.
    ///
    /// # Errors
    ///
    /// Returns `TranscriptError::FileNotFound` if the file does not exist,
    /// `TranscriptError::Io` for read failures and `TranscriptError::Parse`
    /// for malformed JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TranscriptError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let messages = serde_json::from_str(&contents).map_err(|source| TranscriptError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(messages))
    }

    /// Messages in input order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append a newly received message.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replace the whole transcript (e.g. after a history fetch).
    pub fn replace(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }
}

impl DataSource for TranscriptSource {
    type Content = ChatContent;

    fn snapshot(&self) -> Snapshot<ChatContent> {
        let mut days: BTreeMap<NaiveDate, Vec<&ChatMessage>> = BTreeMap::new();
        for message in &self.messages {
            days.entry(message.day()).or_default().push(message);
        }

        let sections = days
            .into_iter()
            .filter_map(|(day, messages)| {
                let items = messages.into_iter().map(message_item).collect();
                let section = SectionSnapshot::new(day_section_id(day)?, items);
                Some(match day_header(day) {
                    Some(header) => section.with_header(header),
                    None => section,
                })
            })
            .collect();

        Snapshot::new(sections)
    }
}

fn message_item(message: &ChatMessage) -> ItemSnapshot<ChatContent> {
    let hint = match message.body {
        MessageBody::Image { width, height } => ItemSize::Estimated(Size::new(width, height)),
        MessageBody::Text { .. } => ItemSize::Auto,
    };
    ItemSnapshot::new(message.id.clone(), ChatContent::from(message))
        .with_size_hint(hint)
        .with_alignment(message.sender.alignment())
}

fn day_section_id(day: NaiveDate) -> Option<SectionId> {
    SectionId::new(day.format("%Y-%m-%d").to_string()).ok()
}

fn day_header(day: NaiveDate) -> Option<ItemSnapshot<ChatContent>> {
    let id = ItemId::new(format!("day-{}", day.format("%Y-%m-%d"))).ok()?;
    let content = ChatContent::DayHeader(day);
    let alignment = content.alignment();
    Some(ItemSnapshot::new(id, content).with_alignment(alignment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alignment, Sender};
    use chrono::{TimeZone, Utc};

    fn message(id: &str, sender: Sender, day: u32, hour: u32, text: &str) -> ChatMessage {
        ChatMessage {
            id: ItemId::new(id).expect("valid id"),
            sender,
            sent_at: Utc
                .with_ymd_and_hms(2024, 3, day, hour, 0, 0)
                .single()
                .expect("valid timestamp"),
            body: MessageBody::Text {
                text: text.to_string(),
            },
        }
    }

    #[test]
    fn groups_messages_by_day_with_headers() {
        let source = TranscriptSource::new(vec![
            message("m1", Sender::Them, 1, 9, "morning"),
            message("m2", Sender::Me, 1, 10, "hi"),
            message("m3", Sender::Them, 2, 8, "next day"),
        ]);

        let snapshot = source.snapshot();

        assert_eq!(snapshot.sections.len(), 2);
        assert_eq!(snapshot.sections[0].id.as_str(), "2024-03-01");
        assert_eq!(snapshot.sections[0].items.len(), 2);
        assert_eq!(snapshot.sections[1].items[0].id.as_str(), "m3");

        let header = snapshot.sections[0].header.as_ref().expect("day header");
        assert_eq!(header.id.as_str(), "day-2024-03-01");
        assert_eq!(header.alignment, Alignment::Center);
    }

    #[test]
    fn sender_drives_alignment() {
        let source = TranscriptSource::new(vec![
            message("m1", Sender::Them, 1, 9, "a"),
            message("m2", Sender::Me, 1, 10, "b"),
        ]);

        let snapshot = source.snapshot();
        let items = &snapshot.sections[0].items;

        assert_eq!(items[0].alignment, Alignment::Leading);
        assert_eq!(items[1].alignment, Alignment::Trailing);
        assert_eq!(items[0].size_hint, ItemSize::Auto);
    }

    #[test]
    fn image_dimensions_become_estimates() {
        let mut source = TranscriptSource::default();
        source.push(ChatMessage {
            body: MessageBody::Image {
                width: 640.0,
                height: 480.0,
            },
            ..message("img", Sender::Them, 1, 9, "")
        });

        let snapshot = source.snapshot();

        assert_eq!(
            snapshot.sections[0].items[0].size_hint,
            ItemSize::Estimated(Size::new(640.0, 480.0))
        );
    }

    #[test]
    fn days_are_sorted_even_if_input_is_not() {
        let source = TranscriptSource::new(vec![
            message("late", Sender::Them, 5, 9, "x"),
            message("early", Sender::Them, 3, 9, "y"),
        ]);

        let ids: Vec<_> = source
            .snapshot()
            .sections
            .iter()
            .map(|s| s.id.as_str().to_string())
            .collect();

        assert_eq!(ids, vec!["2024-03-03", "2024-03-05"]);
    }

    #[test]
    fn load_reports_missing_file() {
        let result = TranscriptSource::load("/nonexistent/transcript.json");
        assert!(matches!(result, Err(TranscriptError::FileNotFound { .. })));
    }
}
