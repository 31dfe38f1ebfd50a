use std::io;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Wire-serializable error returned by any remote operation.
///
/// Mirrors the taxonomy in the protocol design: every failure that can cross the
/// wire boils down to a `kind` plus a human description. The `kind` drives which
/// [`crate::protocol::ResponseStatus`] a skeleton worker attaches to the envelope;
/// the description is carried along for diagnostics only.
#[derive(Clone, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[display(fmt = "{kind}: {description}")]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Error {
    pub kind: ErrorKind,
    pub description: String,
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    pub fn not_found(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, description)
    }

    pub fn invalid_argument(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, description)
    }

    pub fn out_of_bounds(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfBounds, description)
    }

    pub fn io_error(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoError, description)
    }

    pub fn already_started(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyStarted, description)
    }

    pub fn already_registered(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyRegistered, description)
    }

    pub fn remote(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote, description)
    }

    pub fn fatal(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, description)
    }

    pub fn internal(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, description)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self {
            kind: ErrorKind::from(err.kind()),
            description: err.to_string(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(err.kind.into(), err.description)
    }
}

/// Closed taxonomy of failure concepts from the error handling design (spec §7).
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ErrorKind {
    /// Path or method absent.
    NotFound,
    /// Null where non-null required, bad path string, reserved characters.
    InvalidArgument,
    /// Negative offset/length or read/write past end of file.
    OutOfBounds,
    /// Permission denied or lower-level filesystem failure.
    IoError,
    /// `start()` called on a running or already-stopped skeleton.
    AlreadyStarted,
    /// `register()` called twice for the same stub pair.
    AlreadyRegistered,
    /// Transport/protocol failure: connect refused, stream corrupted, method
    /// signature mismatch not caught as `NotFound`.
    Remote,
    /// Non-recoverable misuse: interface descriptor is not an interface, or a
    /// method does not declare the transport failure contract.
    Fatal,
    /// Deserialization failure or unexpected server-side condition.
    Internal,
    /// Catchall mirroring `std::io::ErrorKind`'s non-exhaustiveness.
    Other,
}

impl From<io::ErrorKind> for ErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => Self::InvalidArgument,
            io::ErrorKind::PermissionDenied => Self::IoError,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::TimedOut => Self::Remote,
            _ => Self::Other,
        }
    }
}

impl From<ErrorKind> for io::ErrorKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::InvalidArgument => Self::InvalidInput,
            ErrorKind::IoError => Self::PermissionDenied,
            ErrorKind::OutOfBounds => Self::InvalidInput,
            ErrorKind::Remote => Self::ConnectionRefused,
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_round_trip_through_msgpack() {
        let error = Error::not_found("/a/b/c");
        let bytes = rmp_serde::encode::to_vec_named(&error).unwrap();
        let decoded: Error = rmp_serde::decode::from_slice(&bytes).unwrap();
        assert_eq!(error, decoded);
    }

    #[test]
    fn should_round_trip_through_json() {
        let kind = ErrorKind::OutOfBounds;
        let value = serde_json::to_value(kind).unwrap();
        assert_eq!(value, serde_json::json!("out_of_bounds"));
    }
}
