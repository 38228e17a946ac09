use crate::{Error, delivery::Destination};
use http::{HeaderMap, HeaderValue, Method, header::HeaderName};
use std::{
    fmt,
    fs::File,
    io::{self, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use url::Url;

/// Shared writable handle a response body can be downloaded into.
///
/// Cloning shares the underlying writer, so the caller can keep a handle to
/// the same file it passed to the call.
#[derive(Clone)]
pub struct OutputFile {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputFile {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::create(path.as_ref()).map_err(|err| Error::InvalidConfig {
            message: format!("cannot open output file {}", path.as_ref().display())
                .into_boxed_str(),
            source: Some(Box::new(err)),
        })?;
        Ok(Self::new(file))
    }

    pub(crate) fn writer(&self) -> io::Result<MutexGuard<'_, Box<dyn Write + Send>>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("output file lock poisoned"))
    }

    pub(crate) fn write_body(&self, body: &[u8]) -> io::Result<()> {
        let mut writer = self.writer()?;
        writer.write_all(body)?;
        writer.flush()
    }
}

impl fmt::Debug for OutputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OutputFile(..)")
    }
}

/// Per-call options captured alongside the request.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
    /// Return the body from the call instead of writing it to stdout.
    pub return_transfer: bool,
    /// Write the body into this handle. Takes precedence over `return_transfer`.
    pub output_file: Option<OutputFile>,
    pub follow_location: bool,
    pub timeout: Option<Duration>,
}

impl CallOptions {
    /// Where a response body for this call ends up.
    #[must_use]
    pub fn destination(&self) -> Destination {
        if self.output_file.is_some() {
            Destination::File
        } else if self.return_transfer {
            Destination::Return
        } else {
            Destination::Stdout
        }
    }
}

/// One outgoing call, captured before any I/O happens.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    options: CallOptions,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            options: CallOptions::default(),
        }
    }

    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    #[must_use]
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text, if present and valid UTF-8.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn call_options(&self) -> &CallOptions {
        &self.options
    }
}
