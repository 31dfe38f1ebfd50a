use async_trait::async_trait;

use crate::error::Error;
use crate::protocol::{ResponseStatus, Value};

/// A target object reachable through a [`crate::rpc::Skeleton`].
///
/// This is the Rust-idiomatic replacement for the source's reflective method
/// lookup (spec §4.3/§9 DESIGN NOTES option (b)): rather than resolving a method
/// by `(name, paramTypes)` via reflection, a `Handler` matches `method` against
/// its own set of known names and returns a [`DispatchError::NotFound`] for
/// anything else, which a worker (§4.5 step 3) turns into a `NotFound` response.
///
/// Every implementation's failure contract is `Result<_, DispatchError>`, which
/// structurally guarantees the "every method declares the transport failure
/// kind" precondition the source checks at construction time (spec §4.3): since
/// `dispatch`'s signature is fixed by this trait, there is no way to implement a
/// `Handler` whose methods *don't* report failures through `Error`.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Invokes `method` with `args`, returning the method's result as a
    /// self-describing [`Value`] or a [`DispatchError`] describing why it
    /// couldn't be produced.
    async fn dispatch(&self, method: &str, args: Vec<Value>) -> Result<Value, DispatchError>;
}

/// Why a dispatch attempt failed, carrying enough information for a worker to
/// pick the right [`ResponseStatus`] (spec §4.5 steps 3, 6, 8).
#[derive(Debug)]
pub enum DispatchError {
    /// No method by that name is known to this handler.
    NotFound(Error),
    /// The method was found and invoked, but the target's own logic failed.
    Failed(Error),
    /// Argument deserialization failed or some other internal condition arose.
    Internal(Error),
}

impl DispatchError {
    pub fn status(&self) -> ResponseStatus {
        match self {
            DispatchError::NotFound(_) => ResponseStatus::NotFound,
            DispatchError::Failed(_) => ResponseStatus::BadRequest,
            DispatchError::Internal(_) => ResponseStatus::InternalServerError,
        }
    }

    pub fn into_error(self) -> Error {
        match self {
            DispatchError::NotFound(e) | DispatchError::Failed(e) | DispatchError::Internal(e) => {
                e
            }
        }
    }

    pub fn no_such_method(method: &str) -> Self {
        DispatchError::NotFound(Error::not_found(format!("no such method: {method}")))
    }

    pub fn bad_argument(description: impl Into<String>) -> Self {
        DispatchError::Internal(Error::internal(description))
    }
}

impl From<Error> for DispatchError {
    /// Any domain error a handler's own method logic returns is, by definition,
    /// the target throwing (spec §4.5 step 6): `BadRequest`.
    fn from(err: Error) -> Self {
        DispatchError::Failed(err)
    }
}
