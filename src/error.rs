//! Error types for decoding and restoring records.

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("empty record")]
    Empty,

    #[error("unknown record kind: {0}")]
    UnknownKind(String),

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("invalid count {token:?}: {source}")]
    InvalidCount {
        token: String,
        source: ParseIntError,
    },

    #[error("invalid tree value {token:?}: {source}")]
    InvalidValue {
        token: String,
        source: ParseIntError,
    },

    #[error("record announces {expected} tokens but holds {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("token {0:?} is empty or contains whitespace")]
    InvalidToken(String),

    #[error("{0} unexpected trailing tokens")]
    TrailingTokens(usize),

    #[error("expected a {expected} record, got {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}
