//! Database row types. These map directly to SQLite rows and stay distinct
//! from the courier-types wire models.

use courier_types::models::{Message, MessageDetail, MessageType, VideoSource};

use crate::StoreError;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_on: String,
}

/// One row of the envelope LEFT JOIN texts/images/videos query. Only the
/// column group matching `kind` is populated.
pub struct MessageRow {
    pub msg_id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub kind: String,
    pub text: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub source: Option<String>,
    pub created_on: String,
}

impl MessageRow {
    fn missing(&self, column: &str) -> StoreError {
        StoreError::Corrupt {
            msg_id: self.msg_id,
            reason: format!("{} message has no {column}", self.kind),
        }
    }

    fn dimension(&self, value: Option<i64>, column: &str) -> Result<u32, StoreError> {
        let v = value.ok_or_else(|| self.missing(column))?;
        u32::try_from(v).map_err(|_| StoreError::Corrupt {
            msg_id: self.msg_id,
            reason: format!("{column} {v} out of range"),
        })
    }

    fn detail(&self) -> Result<MessageDetail, StoreError> {
        let kind: MessageType = self
            .kind
            .parse()
            .map_err(|_| StoreError::UnsupportedType(self.kind.clone()))?;

        let detail = match kind {
            MessageType::Text => MessageDetail::Text {
                text: self.text.clone().ok_or_else(|| self.missing("msg"))?,
            },
            MessageType::Image => MessageDetail::Image {
                width: self.dimension(self.width, "width")?,
                height: self.dimension(self.height, "height")?,
                url: self.image_url.clone().ok_or_else(|| self.missing("i_url"))?,
            },
            MessageType::Video => {
                let source = self.source.as_deref().ok_or_else(|| self.missing("source"))?;
                MessageDetail::Video {
                    source: source.parse::<VideoSource>().map_err(|e| StoreError::Corrupt {
                        msg_id: self.msg_id,
                        reason: e.to_string(),
                    })?,
                    url: self.video_url.clone().ok_or_else(|| self.missing("v_url"))?,
                }
            }
        };
        Ok(detail)
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let content = row.detail()?;
        Ok(Message {
            id: row.msg_id,
            timestamp: row.created_on,
            sender: row.sender_id,
            recipient: row.recipient_id,
            content,
        })
    }
}
