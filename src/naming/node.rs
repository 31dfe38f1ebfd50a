use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::Error;
use crate::naming::client::NamingStubs;
use crate::naming::handler::{RegistrationHandler, ServiceHandler};
use crate::naming::server::NamingServer;
use crate::rpc::Skeleton;

/// A running naming server: the shared [`NamingServer`] plus its two
/// skeletons, bound to the well-known `Service` and `Registration` ports
/// (spec §6).
pub struct NamingNode {
    server: Arc<NamingServer>,
    service_skeleton: Skeleton<ServiceHandler>,
    registration_skeleton: Skeleton<RegistrationHandler>,
}

impl Default for NamingNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingNode {
    pub fn new() -> Self {
        let server = Arc::new(NamingServer::new());
        Self {
            service_skeleton: Skeleton::new(ServiceHandler(Arc::clone(&server))),
            registration_skeleton: Skeleton::new(RegistrationHandler(Arc::clone(&server))),
            server,
        }
    }

    pub fn naming_server(&self) -> &Arc<NamingServer> {
        &self.server
    }

    /// Starts both skeletons bound to `bind_ip` on the well-known ports (spec
    /// §6), returning their bound addresses as `(service, registration)`.
    pub async fn start(
        &self,
        bind_ip: std::net::IpAddr,
    ) -> Result<(SocketAddr, SocketAddr), Error> {
        let service_addr = self
            .service_skeleton
            .start(Some(SocketAddr::new(bind_ip, NamingStubs::SERVICE_PORT)))
            .await?;
        let registration_addr = self
            .registration_skeleton
            .start(Some(SocketAddr::new(
                bind_ip,
                NamingStubs::REGISTRATION_PORT,
            )))
            .await?;
        Ok((service_addr, registration_addr))
    }

    pub async fn stop(&self) {
        self.service_skeleton.stop().await;
        self.registration_skeleton.stop().await;
    }
}
