//! Error types for the resting client.
//!
//! # Design
//! Every fallible boundary of the pipeline (response construction, body
//! read, charset decode, transport call, parse) has its own variant so the
//! caller can tell them apart. Nothing is logged and dropped: a failed call
//! always comes back as one of these.

use std::path::PathBuf;

use crate::encoding::{DecodeError, EncodeError};
use crate::transform::TransformationType;

/// Errors returned by the accessor, the transformers and the builder.
#[derive(Debug, thiserror::Error)]
pub enum RestingError {
    /// The response handle was absent or carried an impossible status.
    #[error("cannot construct service response: {0}")]
    Construction(String),

    /// Draining the response body failed.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] std::io::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The connection could not be established or the transport raised.
    #[error("transport failure: {0}")]
    Transport(#[from] ureq::Error),

    /// A file payload could not be read.
    #[error("cannot read request file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is malformed or does not match the target type.
    #[error("{format} parse error: {message}")]
    Parse {
        format: TransformationType,
        message: String,
        /// Excerpt of the text that failed to parse, when one can be located.
        fragment: Option<String>,
    },

    /// Required configuration (alias map, URL, port) is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The server answered with a non-2xx status where entities were expected.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl RestingError {
    pub(crate) fn parse(
        format: TransformationType,
        message: impl Into<String>,
        fragment: Option<String>,
    ) -> Self {
        RestingError::Parse {
            format,
            message: message.into(),
            fragment,
        }
    }
}
