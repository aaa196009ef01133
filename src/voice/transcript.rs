//! Live transcript assembled from provider update events.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Agent,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Agent => write!(f, "Agent"),
            Role::User => write!(f, "User"),
        }
    }
}

/// One delta inside an update event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptSegment {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl TranscriptSegment {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Payload of an `update` event
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranscriptUpdate {
    #[serde(default)]
    pub transcript: Vec<TranscriptSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Ordered conversation. Consecutive segments from the same speaker are
/// merged into one message.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one segment. Empty content is ignored.
    pub fn apply(&mut self, segment: &TranscriptSegment) {
        if segment.content.is_empty() {
            return;
        }
        match self.messages.last_mut() {
            Some(last) if last.role == segment.role => last.content.push_str(&segment.content),
            _ => self.messages.push(Message {
                role: segment.role,
                content: segment.content.clone(),
            }),
        }
    }

    pub fn apply_update(&mut self, update: &TranscriptUpdate) {
        for segment in &update.transcript {
            self.apply(segment);
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// `Role: content` lines, one per message
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
