//! Storage server (spec §4.6): hosts a subtree of the local filesystem and
//! serves `size`/`read`/`write` (`Storage`) and `create`/`delete` (`Command`).

mod client;
mod handler;
mod node;
mod server;

pub use client::{CommandClient, StorageClient};
pub use handler::{CommandHandler, StorageHandler};
pub use node::StorageNode;
pub use server::StorageServer;

use serde::{Deserialize, Serialize};

use crate::rpc::Stub;

/// A pair of stubs referring to the same storage server (spec §3): one for the
/// `Storage` interface clients use, one for the `Command` interface the
/// naming server uses. Equality is pairwise on stub identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStubs {
    pub storage: Stub,
    pub command: Stub,
}

impl ServerStubs {
    pub fn new(storage: Stub, command: Stub) -> Self {
        Self { storage, command }
    }
}
