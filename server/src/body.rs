//! JSON request body decoding.
//!
//! # Design
//! Bodies are read into memory up to `MAX_BODY_BYTES`, then decoded with
//! `serde_path_to_error` so type errors can name the offending field. The
//! deserializer must reach the end of input after the first value; a second
//! value (or any other trailing content) is an error, not silently ignored.

use axum::body::Body;
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

/// Request bodies larger than this are rejected before decoding.
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Ways a request body can fail to decode. Every variant maps to 400 and
/// its message is returned to the client.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BodyError {
    #[error("empty request body")]
    Empty,

    #[error("request body too large (max {max} bytes)")]
    TooLarge { max: usize },

    /// `offset` counts bytes from the start of the body.
    #[error("malformed JSON at position {offset}")]
    Syntax { offset: usize },

    #[error("unexpected end of JSON input")]
    Truncated,

    #[error("invalid value for field {field}")]
    InvalidField { field: String },

    #[error("invalid request body: {0}")]
    UnknownField(String),

    #[error("invalid request body: {0}")]
    Invalid(String),

    #[error("request body must contain a single JSON object")]
    MultipleValues,

    #[error("failed to read request body: {0}")]
    Read(String),
}

/// Collect `body` (bounded by `MAX_BODY_BYTES`) and decode it as `T`.
pub async fn read_json<T: DeserializeOwned>(body: Body) -> Result<T, BodyError> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| {
            let inner = err.into_inner();
            if inner.downcast_ref::<LengthLimitError>().is_some() {
                BodyError::TooLarge { max: MAX_BODY_BYTES }
            } else {
                BodyError::Read(inner.to_string())
            }
        })?;
    decode_json(&bytes)
}

/// Decode exactly one JSON value from `bytes`.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, BodyError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(BodyError::Empty);
    }

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|err| classify(bytes, err))?;
    deserializer.end().map_err(|_| BodyError::MultipleValues)?;
    Ok(value)
}

fn classify(bytes: &[u8], err: serde_path_to_error::Error<serde_json::Error>) -> BodyError {
    let field = err.path().to_string();
    let inner = err.into_inner();
    match inner.classify() {
        Category::Syntax => BodyError::Syntax {
            offset: byte_offset(bytes, inner.line(), inner.column()),
        },
        Category::Eof => BodyError::Truncated,
        Category::Data if is_unknown_field(&inner) => BodyError::UnknownField(inner.to_string()),
        Category::Data if field != "." => BodyError::InvalidField { field },
        Category::Data => BodyError::Invalid(inner.to_string()),
        Category::Io => BodyError::Read(inner.to_string()),
    }
}

/// serde_json files `deny_unknown_fields` rejections under `Category::Data`
/// with no other marker, so the message from serde's
/// `de::Error::unknown_field` is the only way to tell them apart.
/// `unknown_field_is_rejected` pins the wording.
fn is_unknown_field(err: &serde_json::Error) -> bool {
    err.to_string().starts_with("unknown field `")
}

/// Convert serde_json's 1-based line/column into a byte offset.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    let preceding: usize = bytes
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|segment| segment.len() + 1)
        .sum();
    preceding + column
}
