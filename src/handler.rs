//! Request handlers: what answers a call while a hook is enabled.

use crate::{
    BoxError,
    transport::{DynTransport, Request, Response, Transport},
};
use std::sync::{Arc, Mutex, MutexGuard};

/// Produces the response for an intercepted request.
///
/// Implemented for every `Fn(&Request) -> Result<Response, BoxError>`, so a
/// closure is usually enough. Called synchronously, once per intercepted
/// call, in call order.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, req: &Request) -> Result<Response, BoxError>;
}

impl<F> RequestHandler for F
where
    F: Fn(&Request) -> Result<Response, BoxError> + Send + Sync + 'static,
{
    fn handle(&self, req: &Request) -> Result<Response, BoxError> {
        self(req)
    }
}

pub type DynRequestHandler = Arc<dyn RequestHandler>;

/// One recorded request/response pair.
#[derive(Clone, Debug)]
pub struct Interaction {
    pub request: Request,
    pub response: Response,
}

/// Handler that forwards every request to a real transport and keeps what
/// came back.
///
/// The wrapped transport is called directly, never through the registry, so
/// recording cannot loop back into the hook that owns the recorder.
#[derive(Clone)]
pub struct Recorder {
    upstream: DynTransport,
    interactions: Arc<Mutex<Vec<Interaction>>>,
}

impl Recorder {
    pub fn new(upstream: DynTransport) -> Self {
        Self {
            upstream,
            interactions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Interaction>> {
        self.interactions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Everything recorded so far, oldest first.
    #[must_use]
    pub fn interactions(&self) -> Vec<Interaction> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl RequestHandler for Recorder {
    fn handle(&self, req: &Request) -> Result<Response, BoxError> {
        let response = self.upstream.send(req)?;
        self.lock().push(Interaction {
            request: req.clone(),
            response: response.clone(),
        });
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    struct Counting(AtomicUsize);

    impl Transport for Counting {
        fn send(&self, req: &Request) -> Result<Response, Error> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Response::ok(format!("{} #{n}", req.url().path())))
        }
    }

    struct Refusing;

    impl Transport for Refusing {
        fn send(&self, _req: &Request) -> Result<Response, Error> {
            Err(Error::invalid_config("offline"))
        }
    }

    fn get(path: &str) -> Request {
        Request::get(Url::parse("http://example.com").unwrap().join(path).unwrap())
    }

    #[test]
    fn closures_are_handlers() {
        let handler = |req: &Request| -> Result<Response, BoxError> {
            Ok(Response::ok(req.url().as_str()))
        };
        let resp = handler.handle(&get("/x")).unwrap();
        assert_eq!(resp.text_lossy(), "http://example.com/x");
    }

    #[test]
    fn recorder_keeps_interactions_in_call_order() {
        let recorder = Recorder::new(Arc::new(Counting(AtomicUsize::new(0))));
        recorder.handle(&get("/a")).unwrap();
        recorder.handle(&get("/b")).unwrap();

        let recorded = recorder.interactions();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].request.url().path(), "/a");
        assert_eq!(recorded[1].response.text_lossy(), "/b #1");

        recorder.clear();
        assert!(recorder.is_empty());
    }

    #[test]
    fn recorder_does_not_record_failures() {
        let recorder = Recorder::new(Arc::new(Refusing));
        let err = recorder.handle(&get("/a")).unwrap_err();
        assert!(err.to_string().contains("offline"));
        assert_eq!(recorder.len(), 0);
    }
}
