use std::net::IpAddr;

use clap::Parser;
use meshfs::naming::NamingNode;

/// Runs a naming server exposing the `Service` and `Registration` interfaces
/// on their well-known ports.
#[derive(Parser, Debug)]
#[command(name = "naming-server")]
struct Args {
    /// Address to bind both interfaces on.
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let node = NamingNode::new();
    let (service_addr, registration_addr) = match node.start(args.bind).await {
        Ok(addrs) => addrs,
        Err(e) => {
            log::error!("failed to start naming server: {e}");
            std::process::exit(1);
        }
    };

    log::info!("Service listening on {service_addr}");
    log::info!("Registration listening on {registration_addr}");

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {e}");
    }

    log::info!("shutting down");
    node.stop().await;
}
