use std::io;
use std::sync::Mutex;

use crate::error::Error;

type ListenErrorHook = Box<dyn Fn(&io::Error) -> bool + Send + Sync>;
type ServiceErrorHook = Box<dyn Fn(&Error) + Send + Sync>;
type StoppedHook = Box<dyn FnOnce(Option<Error>) + Send>;

/// User-overridable lifecycle hooks for a [`crate::rpc::Skeleton`] (spec §4.3).
///
/// `listen_error` drives shutdown: returning `true` keeps the listener
/// accepting, `false` (the default) tears it down. `service_error` is
/// telemetry-only and must not influence shutdown (spec §7), so it returns
/// nothing. `stopped` fires exactly once, after `stop()` completes.
pub struct Hooks {
    listen_error: Option<ListenErrorHook>,
    service_error: Option<ServiceErrorHook>,
    stopped: Mutex<Option<StoppedHook>>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            listen_error: None,
            service_error: None,
            stopped: Mutex::new(None),
        }
    }
}

impl Hooks {
    pub fn on_listen_error(
        mut self,
        hook: impl Fn(&io::Error) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.listen_error = Some(Box::new(hook));
        self
    }

    pub fn on_service_error(mut self, hook: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.service_error = Some(Box::new(hook));
        self
    }

    pub fn on_stopped(mut self, hook: impl FnOnce(Option<Error>) + Send + 'static) -> Self {
        self.stopped = Mutex::new(Some(Box::new(hook)));
        self
    }

    /// Returns whether the listener should keep accepting after this error.
    pub fn listen_error(&self, err: &io::Error) -> bool {
        match &self.listen_error {
            Some(hook) => hook(err),
            None => {
                log::warn!("listener accept error, shutting down: {err}");
                false
            }
        }
    }

    pub fn service_error(&self, err: &Error) {
        match &self.service_error {
            Some(hook) => hook(err),
            None => log::debug!("worker error: {err}"),
        }
    }

    /// Invokes the `stopped` hook exactly once; subsequent calls are no-ops.
    pub fn stopped(&self, cause: Option<Error>) {
        if let Some(hook) = self.stopped.lock().unwrap().take() {
            hook(cause);
        }
    }
}
