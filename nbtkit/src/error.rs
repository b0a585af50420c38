//! The error and result types used across the crate.

use std::io;

use thiserror::Error;

use crate::TagKind;

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while reading, writing or (de)serializing
/// NBT data.
///
/// All variants are fatal to the current operation; callers may retry on a
/// fresh stream. The only sanctioned recovery point is a
/// [`TypeResolver`](crate::TypeResolver)'s `on_error` hook.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying byte source or sink reported a failure.
    #[error("io error: {0}")]
    Io(#[source] io::Error),

    /// The stream ended in the middle of a token.
    #[error("unexpected end of nbt data")]
    UnexpectedEnd,

    /// A read asserted the wrong tag kind.
    #[error("expected {expected} but got {found} at: {path}")]
    UnexpectedKind {
        expected: TagKind,
        found: TagKind,
        path: String,
    },

    /// A kind-id byte outside 0..=12 where a tag kind was expected.
    #[error("invalid tag-id: {0}")]
    InvalidTagId(u8),

    /// A string payload was not valid modified UTF-8.
    #[error("invalid modified-utf8 string data")]
    InvalidUtf8,

    /// An array, string or list length below zero.
    #[error("negative length: {0}")]
    NegativeLength(i32),

    /// The writer received a name in a list context, or a value in a
    /// compound without a preceding name.
    #[error("{0}")]
    NameOutOfPlace(String),

    /// `end_list`/`end_compound` at the wrong place, or a value of the
    /// wrong kind for the surrounding context.
    #[error("{0}")]
    ContextMismatch(String),

    /// The writer was closed while frames were still open.
    #[error("incomplete document: {0} frame(s) still open")]
    IncompleteDocument(usize),

    /// No instance-creation strategy succeeded for a type.
    #[error("no way to construct an instance of type {0}")]
    NoConstructor(&'static str),

    /// An enum reader saw an unknown name or an out-of-range ordinal.
    #[error("invalid value for enum type {enum_type}: {value}")]
    InvalidEnumValue {
        enum_type: &'static str,
        value: String,
    },

    /// A mapping was asked to handle a key that is not a string or enum.
    #[error("unsupported map key type: {0}")]
    UnsupportedKeyType(&'static str),

    /// Catch-all for adapter-detected inconsistency in the data or the
    /// engine configuration.
    #[error("{0}")]
    CorruptData(String),

    /// A lower-level error, annotated with the field it occurred in.
    #[error("failed to read field '{field}' of {type_name}")]
    Field {
        field: String,
        type_name: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        // EOF mid-read means the document was truncated; everything else is
        // a genuine transport failure.
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::UnexpectedEnd,
            _ => Error::Io(e),
        }
    }
}

impl Error {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Error {
        Error::CorruptData(msg.into())
    }

    pub(crate) fn field(field: &str, type_name: &'static str, source: Error) -> Error {
        Error::Field {
            field: field.to_owned(),
            type_name,
            source: Box::new(source),
        }
    }
}
