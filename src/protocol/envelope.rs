use serde::{Deserialize, Serialize};

use crate::protocol::{ResponseStatus, Value};

/// A request envelope: method name, argument list, each argument self-describing.
///
/// This is the tagged-union-by-string-name redesign of the source's reflective
/// `(methodName, paramTypes, args)` tuple (spec §4.2/§9): parameter types are not
/// carried separately because each [`Value`] already knows its own shape, and a
/// handler resolves overload-free method names directly against a match arm
/// rather than a `(name, paramTypes)` pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: u64,
    pub method: String,
    pub args: Vec<Value>,
}

impl RequestEnvelope {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            id: rand::random(),
            method: method.into(),
            args,
        }
    }
}

/// A response envelope: status plus exactly one payload value (spec §3/§4.2).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: u64,
    pub origin_id: u64,
    pub status: ResponseStatus,
    pub payload: Value,
}

impl ResponseEnvelope {
    pub fn ok(origin_id: u64, payload: Value) -> Self {
        Self {
            id: rand::random(),
            origin_id,
            status: ResponseStatus::Ok,
            payload,
        }
    }

    pub fn error(origin_id: u64, status: ResponseStatus, error: crate::error::Error) -> Self {
        Self {
            id: rand::random(),
            origin_id,
            status,
            payload: Value::new(serde_json::to_value(error).expect("Error always serializes")),
        }
    }
}
