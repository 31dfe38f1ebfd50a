use std::io;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::protocol::{self, ResponseEnvelope};
use crate::rpc::hooks::Hooks;
use crate::rpc::interface::Handler;

/// Services exactly one request on `stream` (spec §4.5): read one request,
/// dispatch, write one response, close. This is the "worker" of C5.
pub async fn handle_connection<H: Handler>(
    mut stream: TcpStream,
    handler: Arc<H>,
    hooks: Arc<Hooks>,
) {
    let outcome = service_one_request(&mut stream, handler).await;

    if let Err(err) = outcome {
        hooks.service_error(&err);
    }

    // `stream` drops here regardless of which branch ran, closing the connection
    // on every exit path per spec §4.5 step 9.
}

async fn service_one_request<H: Handler>(
    stream: &mut TcpStream,
    handler: Arc<H>,
) -> Result<(), Error> {
    let request = protocol::read_request(stream)
        .await
        .map_err(|e| Error::internal(format!("reading request: {e}")))?;

    let response = match handler.dispatch(&request.method, request.args).await {
        Ok(value) => ResponseEnvelope::ok(request.id, value),
        Err(dispatch_err) => {
            let status = dispatch_err.status();
            ResponseEnvelope::error(request.id, status, dispatch_err.into_error())
        }
    };

    protocol::write_response(stream, &response)
        .await
        .map_err(|e| Error::internal(format!("writing response: {e}")))
}

/// Spawns the worker for one accepted connection and returns its handle so the
/// listener can track in-flight workers (spec §4.5/§5: "stop() ... lets
/// in-flight service workers run to completion").
pub fn spawn_worker<H: Handler>(
    stream: TcpStream,
    handler: Arc<H>,
    hooks: Arc<Hooks>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        handle_connection(stream, handler, hooks).await;
    })
}

/// The outcome of one pass of the accept loop, used by [`crate::rpc::Skeleton`]
/// to decide whether to keep accepting.
pub enum AcceptOutcome {
    Accepted(TcpStream),
    ListenError(io::Error),
}

pub async fn accept_once(listener: &tokio::net::TcpListener) -> AcceptOutcome {
    match listener.accept().await {
        Ok((stream, _peer_addr)) => AcceptOutcome::Accepted(stream),
        Err(err) => AcceptOutcome::ListenError(err),
    }
}
