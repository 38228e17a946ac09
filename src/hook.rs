//! The interception hook.
//!
//! While enabled, every call dispatched through the registry is answered by
//! the hook's request handler instead of the network.

use crate::{
    BoxError, Error,
    handler::{DynRequestHandler, RequestHandler},
    transport::{Request, Response, Transport, registry, registry::InstallToken},
    util::url::sanitize_url_for_error,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// Transport that answers with the hook's handler.
struct HandlerTransport {
    handler: DynRequestHandler,
}

impl HandlerTransport {
    fn failure(req: &Request, source: BoxError) -> Error {
        Error::Handler {
            method: req.method().clone(),
            url: Box::new(sanitize_url_for_error(req.url())),
            source,
        }
    }
}

impl Transport for HandlerTransport {
    fn send(&self, req: &Request) -> Result<Response, Error> {
        let response = self.handler.handle(req).map_err(|source| {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                http.method = %req.method(),
                http.path = %req.url().path(),
                error = %source,
                "request handler failed"
            );
            Self::failure(req, source)
        })?;

        if response.status_code().is_none() {
            return Err(Self::failure(
                req,
                format!("handler returned invalid status code {}", response.status).into(),
            ));
        }
        Ok(response)
    }

    fn intercepts(&self) -> bool {
        true
    }
}

/// Toggleable interception of every outgoing call.
///
/// Starts disabled. [`enable`](Self::enable) and [`disable`](Self::disable)
/// are idempotent and never fail. Dropping an enabled hook disables it.
///
/// ```no_run
/// use vcr_hook::{BoxError, Handle, InterceptionHook, Request, Response};
///
/// # fn main() -> Result<(), vcr_hook::Error> {
/// let hook = InterceptionHook::new(|_req: &Request| -> Result<Response, BoxError> {
///     Ok(Response::ok("example response body"))
/// });
/// hook.enable();
///
/// let mut handle = Handle::open("http://example.com/")?;
/// handle.set_return_transfer(true);
/// let body = handle.perform()?.into_body();
/// assert_eq!(body.as_deref(), Some(&b"example response body"[..]));
///
/// hook.disable();
/// # Ok(())
/// # }
/// ```
pub struct InterceptionHook {
    transport: Arc<HandlerTransport>,
    // `Some` while enabled.
    installed: Mutex<Option<InstallToken>>,
}

impl InterceptionHook {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Response, BoxError> + Send + Sync + 'static,
    {
        Self::with_handler(handler)
    }

    pub fn with_handler(handler: impl RequestHandler) -> Self {
        Self {
            transport: Arc::new(HandlerTransport {
                handler: Arc::new(handler),
            }),
            installed: Mutex::new(None),
        }
    }

    fn state(&self) -> MutexGuard<'_, Option<InstallToken>> {
        self.installed.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn enable(&self) {
        let mut installed = self.state();
        if installed.is_some() {
            return;
        }
        *installed = Some(registry::install(self.transport.clone()));

        #[cfg(feature = "tracing")]
        tracing::debug!("interception hook enabled");
    }

    pub fn disable(&self) {
        let mut installed = self.state();
        if let Some(token) = installed.take() {
            registry::uninstall(token);

            #[cfg(feature = "tracing")]
            tracing::debug!("interception hook disabled");
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state().is_some()
    }
}

impl Drop for InterceptionHook {
    fn drop(&mut self) {
        self.disable();
    }
}
