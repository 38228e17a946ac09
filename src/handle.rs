//! Caller-facing call surface.
//!
//! A [`Handle`] is configured with typed setters, performed, inspected with
//! [`Handle::info`] and closed. Code written against it works the same
//! whether calls reach the network or an enabled [`crate::InterceptionHook`].

use crate::{
    Error, TransportErrorKind,
    delivery::{Destination, Transfer, deliver},
    transport::{
        CallOptions, OutputFile, Request,
        registry::{self, Dispatched},
    },
    util::url::parse_call_url,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode, header::HeaderName};
use std::{io, time::Duration};
use url::Url;

#[cfg(feature = "tracing")]
use tracing::field;

/// Details of the last successful call, the "get info" view.
#[derive(Debug, Clone)]
pub struct TransferInfo {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Where the body came from: the requested URL, or the last one of a
    /// followed redirect chain.
    pub effective_url: Url,
    pub body_len: usize,
    /// Answered by an interception hook rather than the network.
    pub intercepted: bool,
}

/// One reusable call handle.
#[derive(Debug, Default)]
pub struct Handle {
    url: Option<Url>,
    method: Option<Method>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    options: CallOptions,
    // Process stdout when unset.
    echo: Option<OutputFile>,
    info: Option<TransferInfo>,
}

impl Handle {
    /// A handle with no URL yet; set one with [`set_url`](Self::set_url).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(url: impl AsRef<str>) -> Result<Self, Error> {
        let mut handle = Self::new();
        handle.set_url(url)?;
        Ok(handle)
    }

    pub fn set_url(&mut self, url: impl AsRef<str>) -> Result<&mut Self, Error> {
        self.url = Some(parse_call_url(url.as_ref())?);
        Ok(self)
    }

    pub fn set_method(&mut self, method: Method) -> &mut Self {
        self.method = Some(method);
        self
    }

    /// Append a request header; repeated names are all sent.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.append(name, value);
        self
    }

    /// Append a header given as text, validating name and value.
    pub fn set_header_str(&mut self, name: &str, value: &str) -> Result<&mut Self, Error> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| Error::InvalidConfig {
            message: format!("invalid header name: {name}").into_boxed_str(),
            source: Some(Box::new(err)),
        })?;
        let value = HeaderValue::from_str(value).map_err(|err| Error::InvalidConfig {
            message: "invalid header value".into(),
            source: Some(Box::new(err)),
        })?;
        Ok(self.set_header(name, value))
    }

    /// Request body. Without an explicit method this makes the call a `POST`.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    pub fn set_return_transfer(&mut self, yes: bool) -> &mut Self {
        self.options.return_transfer = yes;
        self
    }

    /// Download the body into `file` instead of returning or echoing it.
    pub fn set_output_file(&mut self, file: OutputFile) -> &mut Self {
        self.options.output_file = Some(file);
        self
    }

    /// Send echoed bodies here instead of process stdout.
    pub fn set_echo_target(&mut self, target: OutputFile) -> &mut Self {
        self.echo = Some(target);
        self
    }

    pub fn set_follow_location(&mut self, yes: bool) -> &mut Self {
        self.options.follow_location = yes;
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Clear every option and the last call's info.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn info(&self) -> Option<&TransferInfo> {
        self.info.as_ref()
    }

    pub fn close(self) {}

    fn effective_method(&self) -> Method {
        match (&self.method, &self.body) {
            (Some(method), _) => method.clone(),
            (None, Some(_)) => Method::POST,
            (None, None) => Method::GET,
        }
    }

    fn build_request(&self) -> Result<Request, Error> {
        let url = self
            .url
            .clone()
            .ok_or_else(|| Error::invalid_config("no url set on handle"))?;

        let mut req = Request::new(self.effective_method(), url)
            .headers(self.headers.clone())
            .options(self.options.clone());
        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }
        Ok(req)
    }

    /// Run the call: dispatch it, then return, echo or download the body as
    /// configured.
    pub fn perform(&mut self) -> Result<Transfer, Error> {
        self.info = None;
        let req = self.build_request()?;

        #[cfg(feature = "metrics")]
        let _inflight = crate::transport::metrics::InFlightGuard::new();

        #[cfg(any(feature = "tracing", feature = "metrics"))]
        let start = std::time::Instant::now();
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "vcr_hook.perform",
            http.method = %req.method(),
            http.host = %req.url().host_str().unwrap_or_default(),
            http.path = %req.url().path(),
            http.status = field::Empty,
            intercepted = field::Empty,
            latency_ms = field::Empty,
            error_kind = field::Empty,
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let (transfer, info) = match perform_request(&req, self.echo.as_ref()) {
            Ok(done) => done,
            Err(err) => {
                #[cfg(feature = "metrics")]
                crate::transport::metrics::record_outcome(
                    req.method(),
                    None,
                    start.elapsed(),
                    Some(err.kind()),
                );
                #[cfg(feature = "tracing")]
                {
                    span.record("error_kind", field::debug(err.kind()));
                    span.record("latency_ms", start.elapsed().as_millis() as i64);
                }
                return Err(err);
            }
        };

        #[cfg(feature = "tracing")]
        {
            span.record("http.status", info.status.as_u16() as i64);
            span.record("intercepted", info.intercepted);
            span.record("latency_ms", start.elapsed().as_millis() as i64);
        }
        #[cfg(feature = "metrics")]
        crate::transport::metrics::record_outcome(
            req.method(),
            Some(info.intercepted),
            start.elapsed(),
            None,
        );

        self.info = Some(info);
        Ok(transfer)
    }
}

fn perform_request(
    req: &Request,
    echo: Option<&OutputFile>,
) -> Result<(Transfer, TransferInfo), Error> {
    let Dispatched {
        response,
        intercepted,
    } = registry::dispatch(req)?;

    let status = response.status_code().ok_or_else(|| Error::Transport {
        method: req.method().clone(),
        path: req.url().path().into(),
        kind: TransportErrorKind::Other,
        source: format!("invalid status code {}", response.status).into(),
    })?;

    let effective_url = response
        .effective_url()
        .cloned()
        .unwrap_or_else(|| req.url().clone());
    let body_len = response.body.len();
    let headers = response.headers.unwrap_or_default();
    let options = req.call_options();
    let transfer = match (options.destination(), echo) {
        (Destination::Stdout, Some(target)) => {
            let mut writer = target.writer().map_err(|source| Error::Output {
                destination: Destination::Stdout,
                source,
            })?;
            deliver(response.body, options, &mut **writer)?
        }
        _ => deliver(response.body, options, &mut io::stdout().lock())?,
    };

    Ok((
        transfer,
        TransferInfo {
            status,
            headers,
            effective_url,
            body_len,
            intercepted,
        },
    ))
}
