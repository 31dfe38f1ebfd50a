use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use meshfs::naming::NamingStubs;
use meshfs::storage::StorageNode;

/// Runs a storage server rooted at a local directory, then registers it with
/// a naming server.
#[derive(Parser, Debug)]
#[command(name = "storage-server")]
struct Args {
    /// Directory to host.
    #[arg(long)]
    root: PathBuf,

    /// Address the naming server's `Registration` interface is bound to.
    #[arg(long)]
    naming: IpAddr,

    /// Hostname this server should advertise to clients.
    #[arg(long, default_value = "127.0.0.1")]
    hostname: String,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let node = match StorageNode::new(&args.root) {
        Ok(node) => node,
        Err(e) => {
            log::error!("failed to create storage server at {}: {e}", args.root.display());
            std::process::exit(1);
        }
    };

    let naming_registration_addr = SocketAddr::new(args.naming, NamingStubs::REGISTRATION_PORT);
    match node.start(&args.hostname, naming_registration_addr).await {
        Ok(stubs) => log::info!(
            "registered with naming server at {naming_registration_addr} as {} / {}",
            stubs.storage,
            stubs.command
        ),
        Err(e) => {
            log::error!("failed to register with naming server: {e}");
            std::process::exit(1);
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {e}");
    }

    log::info!("shutting down");
    node.stop().await;
}
