use std::io;
use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::protocol::utils;

/// Self-describing argument/return value carried across the wire.
///
/// Wraps [`serde_json::Value`] so the envelope can carry an arbitrary value graph
/// without the RPC substrate needing to know concrete argument/return types ahead
/// of time; concrete stubs cast back to a typed value with [`Value::cast_as`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(serde_json::Value);

impl Value {
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self(value.into())
    }

    pub fn null() -> Self {
        Self(serde_json::Value::Null)
    }

    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        utils::serialize_to_vec(self)
    }

    pub fn from_slice(slice: &[u8]) -> io::Result<Self> {
        utils::deserialize_from_slice(slice)
    }

    /// Attempts to convert this generic value into a specific type.
    pub fn cast_as<T: DeserializeOwned>(self) -> io::Result<T> {
        serde_json::from_value(self.0).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl Deref for Value {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Value {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> From<T> for Value
where
    T: Into<serde_json::Value>,
{
    fn from(x: T) -> Self {
        Self(x.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_round_trip() {
        let v = Value::new(vec![1u8, 2, 3]);
        let back: Vec<u8> = v.cast_as().unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
