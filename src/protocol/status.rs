use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::ErrorKind;

/// Numeric response status attached to every response envelope (spec §3).
///
/// `Forbidden`/`Conflict`/`ServiceUnavailable` are reserved but never emitted by
/// any path in this implementation, matching the spec's note that they appear in
/// the source taxonomy without a corresponding emission site.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum ResponseStatus {
    Ok = 200,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    Conflict = 409,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl ResponseStatus {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn is_ok(self) -> bool {
        matches!(self, ResponseStatus::Ok)
    }

    fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            200 => Self::Ok,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            500 => Self::InternalServerError,
            503 => Self::ServiceUnavailable,
            _ => return None,
        })
    }
}

/// Maps a failure's kind onto the response status a skeleton worker should emit
/// when that failure is the *reason dispatch could not even be attempted* (as
/// opposed to the target method itself returning an `Err`, which is always
/// `BadRequest` regardless of kind per spec §4.5 step 6).
impl From<ErrorKind> for ResponseStatus {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => ResponseStatus::NotFound,
            ErrorKind::Fatal => ResponseStatus::Unauthorized,
            ErrorKind::Internal | ErrorKind::Other => ResponseStatus::InternalServerError,
            _ => ResponseStatus::BadRequest,
        }
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

impl<'de> Deserialize<'de> for ResponseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CodeVisitor;

        impl<'de> Visitor<'de> for CodeVisitor {
            type Value = ResponseStatus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a response status code")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                ResponseStatus::from_code(v as u16)
                    .ok_or_else(|| E::custom(format!("unknown response status code: {v}")))
            }
        }

        deserializer.deserialize_u16(CodeVisitor)
    }
}

/// Re-export of the wire error type under the name the protocol layer uses.
pub type ErrorPayload = crate::error::Error;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_msgpack() {
        for status in [
            ResponseStatus::Ok,
            ResponseStatus::BadRequest,
            ResponseStatus::NotFound,
            ResponseStatus::InternalServerError,
        ] {
            let bytes = rmp_serde::encode::to_vec(&status).unwrap();
            let decoded: ResponseStatus = rmp_serde::decode::from_slice(&bytes).unwrap();
            assert_eq!(status, decoded);
        }
    }
}
