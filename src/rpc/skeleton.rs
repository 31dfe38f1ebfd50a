use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener as TokioTcpListener;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::rpc::hooks::Hooks;
use crate::rpc::interface::Handler;
use crate::rpc::listener::{accept_once, spawn_worker, AcceptOutcome};
use crate::rpc::stub::Stub;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Created,
    Running,
    Stopped,
}

/// Server side of the RPC substrate (spec §4.3): binds a listening socket,
/// accepts connections, and dispatches invocations to `handler`.
///
/// State machine: `CREATED -> RUNNING -> STOPPED`, strictly monotonic. A
/// skeleton that has been stopped, or is already running, cannot be (re)started.
pub struct Skeleton<H: Handler> {
    handler: Arc<H>,
    state: Arc<Mutex<State>>,
    bound_addr: Arc<Mutex<Option<SocketAddr>>>,
    listener_task: Mutex<Option<JoinHandle<()>>>,
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
    shutdown: Arc<Notify>,
    hooks: Arc<Hooks>,
}

impl<H: Handler> Skeleton<H> {
    /// Creates a new, not-yet-started skeleton around `handler`.
    pub fn new(handler: H) -> Self {
        Self::with_hooks(handler, Hooks::default())
    }

    pub fn with_hooks(handler: H, hooks: Hooks) -> Self {
        Self {
            handler: Arc::new(handler),
            state: Arc::new(Mutex::new(State::Created)),
            bound_addr: Arc::new(Mutex::new(None)),
            listener_task: Mutex::new(None),
            workers: Arc::new(Mutex::new(Vec::new())),
            shutdown: Arc::new(Notify::new()),
            hooks: Arc::new(hooks),
        }
    }

    /// Binds a server socket (a system-assigned port if `addr` is `None`),
    /// records the bound address, spawns the listener task, and returns
    /// immediately.
    pub async fn start(&self, addr: Option<SocketAddr>) -> Result<SocketAddr, Error> {
        {
            let mut state = self.state.lock().await;
            if *state != State::Created {
                return Err(Error::already_started(
                    "skeleton has already been started or stopped",
                ));
            }
            *state = State::Running;
        }

        let bind_addr = addr.unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 0)));
        let listener = TokioTcpListener::bind(bind_addr)
            .await
            .map_err(|e| Error::io_error(format!("binding {bind_addr}: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| Error::io_error(format!("reading bound address: {e}")))?;

        *self.bound_addr.lock().await = Some(local_addr);

        let handler = Arc::clone(&self.handler);
        let workers = Arc::clone(&self.workers);
        let hooks = Arc::clone(&self.hooks);
        let shutdown = Arc::clone(&self.shutdown);
        let state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.notified() => break,
                    outcome = accept_once(&listener) => {
                        match outcome {
                            AcceptOutcome::Accepted(stream) => {
                                let handle = spawn_worker(stream, Arc::clone(&handler), Arc::clone(&hooks));
                                workers.lock().await.push(handle);
                            }
                            AcceptOutcome::ListenError(err) => {
                                if !hooks.listen_error(&err) {
                                    break;
                                }
                            }
                        }
                    }
                }
            }

            *state.lock().await = State::Stopped;
            hooks.stopped(None);
        });

        *self.listener_task.lock().await = Some(task);

        log::info!("skeleton listening on {local_addr}");
        Ok(local_addr)
    }

    /// Signals the listener to cease accepting and closes the server socket.
    /// In-flight workers are allowed to run to completion; they are not
    /// forcibly cancelled (spec §5).
    pub async fn stop(&self) {
        self.shutdown.notify_waiters();

        let task = self.listener_task.lock().await.take();
        if let Some(task) = task {
            let _ = task.await;
        }

        // Let in-flight workers finish naturally; we don't abort them.
        let workers: Vec<_> = self.workers.lock().await.drain(..).collect();
        for worker in workers {
            let _ = worker.await;
        }
    }

    pub async fn bound_addr(&self) -> Option<SocketAddr> {
        *self.bound_addr.lock().await
    }

    pub async fn is_running(&self) -> bool {
        *self.state.lock().await == State::Running
    }

    /// Builds a stub pointed at this skeleton's bound address. Fails fatally
    /// (via `Err`) if the skeleton has not yet bound an address.
    pub async fn stub(&self, interface: impl Into<String>) -> Result<Stub, Error> {
        let addr = self
            .bound_addr()
            .await
            .ok_or_else(|| Error::fatal("skeleton has not been started"))?;
        Ok(Stub::new(addr, interface))
    }

    /// Builds a stub pointed at this skeleton's bound port but a caller-supplied
    /// hostname, for cases where the skeleton bound `0.0.0.0` but clients must
    /// dial a specific advertised host.
    pub async fn stub_with_hostname(
        &self,
        hostname: &str,
        interface: impl Into<String>,
    ) -> Result<Stub, Error> {
        let addr = self
            .bound_addr()
            .await
            .ok_or_else(|| Error::fatal("skeleton has not been started"))?;
        let resolved: SocketAddr = format!("{hostname}:{}", addr.port())
            .parse()
            .map_err(|e| Error::invalid_argument(format!("unknown host {hostname}: {e}")))?;
        Ok(Stub::new(resolved, interface))
    }
}
