use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Error;
use crate::naming::NamingRegistrationClient;
use crate::rpc::{Skeleton, Stub};
use crate::storage::handler::{CommandHandler, StorageHandler};
use crate::storage::server::StorageServer;
use crate::storage::ServerStubs;

/// A running storage server: the shared [`StorageServer`] plus its two
/// skeletons (`Storage` for clients, `Command` for the naming server) and the
/// registration handshake that ties it into a naming server (spec §4.6).
pub struct StorageNode {
    server: Arc<StorageServer>,
    storage_skeleton: Skeleton<StorageHandler>,
    command_skeleton: Skeleton<CommandHandler>,
}

impl StorageNode {
    /// Creates a node rooted at `root`. Fails *not-found* if `root` does not
    /// exist or is not a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let server = Arc::new(StorageServer::new(root)?);
        Ok(Self {
            storage_skeleton: Skeleton::new(StorageHandler(Arc::clone(&server))),
            command_skeleton: Skeleton::new(CommandHandler(Arc::clone(&server))),
            server,
        })
    }

    pub fn storage(&self) -> &Arc<StorageServer> {
        &self.server
    }

    /// Binds both skeletons to system-assigned ports, then registers with the
    /// naming server at `naming_registration_addr`, advertising every local
    /// file under `root`. Storage servers this node offered that the naming
    /// server already owns are deleted locally and their now-empty parent
    /// directories pruned (spec §4.6 registration protocol).
    pub async fn start(
        &self,
        hostname: &str,
        naming_registration_addr: SocketAddr,
    ) -> Result<ServerStubs, Error> {
        let storage_addr = self.storage_skeleton.start(None).await?;
        let command_addr = self.command_skeleton.start(None).await?;

        let storage_stub = Stub::new(resolve_host(hostname, storage_addr.port())?, "Storage");
        let command_stub = Stub::new(resolve_host(hostname, command_addr.port())?, "Command");
        let stubs = ServerStubs::new(storage_stub, command_stub);

        let files = self.server.list_local_files()?;
        let registration = NamingRegistrationClient::new(Stub::new(
            naming_registration_addr,
            "Registration",
        ));

        let duplicates = registration.register(stubs.clone(), files).await?;
        for duplicate in duplicates {
            log::info!("deleting duplicate file offered at registration: {duplicate}");
            self.server.delete(&duplicate).await?;
        }

        Ok(stubs)
    }

    pub async fn stop(&self) {
        self.storage_skeleton.stop().await;
        self.command_skeleton.stop().await;
    }
}

fn resolve_host(hostname: &str, port: u16) -> Result<SocketAddr, Error> {
    (hostname, port)
        .to_socket_addrs()
        .map_err(|e| Error::invalid_argument(format!("unknown host {hostname}: {e}")))?
        .next()
        .ok_or_else(|| Error::invalid_argument(format!("unknown host {hostname}")))
}
