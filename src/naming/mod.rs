//! Naming server (spec §4.7–§4.8): the directory tree plus the client-facing
//! `Service` and storage-server-facing `Registration` interfaces.

mod client;
mod handler;
mod node;
mod server;
mod tree;

pub use client::{NamingRegistrationClient, NamingServiceClient, NamingStubs};
pub use handler::{RegistrationHandler, ServiceHandler};
pub use node::NamingNode;
pub use server::NamingServer;
pub use tree::PathNode;
