use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned when a wire string does not name a known message type or video source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Envelope discriminant. Decides which detail table holds the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Video,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl FromStr for MessageType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(UnknownVariant {
                kind: "message type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    Youtube,
    Vimeo,
}

impl VideoSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Vimeo => "vimeo",
        }
    }
}

impl FromStr for VideoSource {
    type Err = UnknownVariant;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(Self::Youtube),
            "vimeo" => Ok(Self::Vimeo),
            other => Err(UnknownVariant {
                kind: "video source",
                value: other.to_string(),
            }),
        }
    }
}

/// Type-specific payload of a message. Exactly one detail row backs each
/// envelope, and the variant always agrees with the envelope's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageDetail {
    Text { text: String },
    Image { width: u32, height: u32, url: String },
    Video { source: VideoSource, url: String },
}

impl MessageDetail {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Text { .. } => MessageType::Text,
            Self::Image { .. } => MessageType::Image,
            Self::Video { .. } => MessageType::Video,
        }
    }
}

/// A stored message as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    /// SQLite's native rendering, `YYYY-MM-DD HH:MM:SS` in UTC.
    pub timestamp: String,
    pub sender: i64,
    pub recipient: i64,
    pub content: MessageDetail,
}
