//! Shape and content checks for inbound requests. Pure functions: no I/O,
//! the only output is a typed request or the reason it was rejected.

use courier_types::api::{GetMessagesQuery, SendMessageRequest, UserRequest};
use courier_types::models::{MessageDetail, MessageType, VideoSource};

pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_PASSWORD_LEN: usize = 100;
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("error missing argument")]
    MissingArgument,
    #[error("error username exceed size limit")]
    UsernameTooLong,
    #[error("error password exceed size limit")]
    PasswordTooLong,
    #[error("error video source not supported")]
    UnsupportedSource,
    #[error("error type of message not supported")]
    UnsupportedType,
    #[error("error image dimension out of range")]
    DimensionOutOfRange,
    #[error("error {0} must be a positive integer")]
    InvalidInteger(&'static str),
    #[error("error malformed request: {0}")]
    MalformedRequest(String),
}

/// A send request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender: i64,
    pub recipient: i64,
    pub detail: MessageDetail,
}

/// Cursor for `GET /messages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePage {
    pub recipient: i64,
    pub start: i64,
    pub limit: u32,
}

pub fn validate_user(req: &UserRequest) -> Result<(), ValidationError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ValidationError::MissingArgument);
    }
    if req.username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::UsernameTooLong);
    }
    if req.password.chars().count() > MAX_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooLong);
    }
    Ok(())
}

pub fn validate_send_message(req: &SendMessageRequest) -> Result<NewMessage, ValidationError> {
    if req.sender <= 0 || req.recipient <= 0 || req.content.kind.is_empty() {
        return Err(ValidationError::MissingArgument);
    }

    let content = &req.content;
    let kind: MessageType = content
        .kind
        .parse()
        .map_err(|_| ValidationError::UnsupportedType)?;

    let detail = match kind {
        MessageType::Text => {
            if content.text.is_empty() {
                return Err(ValidationError::MissingArgument);
            }
            MessageDetail::Text {
                text: content.text.clone(),
            }
        }
        MessageType::Image => {
            let width = positive_dimension(content.width)?;
            let height = positive_dimension(content.height)?;
            if content.url.is_empty() {
                return Err(ValidationError::MissingArgument);
            }
            MessageDetail::Image {
                width,
                height,
                url: content.url.clone(),
            }
        }
        MessageType::Video => {
            if content.source.is_empty() || content.url.is_empty() {
                return Err(ValidationError::MissingArgument);
            }
            let source: VideoSource = content
                .source
                .parse()
                .map_err(|_| ValidationError::UnsupportedSource)?;
            MessageDetail::Video {
                source,
                url: content.url.clone(),
            }
        }
    };

    Ok(NewMessage {
        sender: req.sender,
        recipient: req.recipient,
        detail,
    })
}

pub fn validate_get_messages(query: &GetMessagesQuery) -> Result<MessagePage, ValidationError> {
    let recipient = parse_positive_int("recipient", query.recipient.as_deref())?;
    let start = parse_positive_int("start", query.start.as_deref())?;

    // Anything that is not a positive integer falls back to the default.
    let limit = query
        .limit
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
        .unwrap_or(DEFAULT_PAGE_LIMIT);

    Ok(MessagePage {
        recipient,
        start,
        limit,
    })
}

fn positive_dimension(value: i64) -> Result<u32, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::MissingArgument);
    }
    u32::try_from(value).map_err(|_| ValidationError::DimensionOutOfRange)
}

fn parse_positive_int(field: &'static str, raw: Option<&str>) -> Result<i64, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::MissingArgument);
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidInteger(field))?;
    if value <= 0 {
        return Err(ValidationError::MissingArgument);
    }
    Ok(value)
}
