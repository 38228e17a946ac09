use super::{Request, Response, Transport};
use crate::error::{Error, TransportErrorKind};
use http::{HeaderMap, Method};
use std::time::Duration;
use ureq::{Agent, RequestBuilder, ResponseExt};
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[cfg(feature = "rustls")]
fn ensure_rustls_provider() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

#[cfg(not(feature = "rustls"))]
fn ensure_rustls_provider() {}

/// Settings for the real network transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub user_agent: String,
    /// Whole-call timeout, unless the call sets its own.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Ignore proxy environment variables (HTTP_PROXY, HTTPS_PROXY, ...).
    pub no_proxy: bool,
    /// Accept invalid TLS certificates.
    pub insecure: bool,
    /// Redirect limit for calls with `follow_location` set.
    pub max_redirects: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            no_proxy: false,
            insecure: false,
            max_redirects: 10,
        }
    }
}

/// Blocking transport that goes to the network, built on `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    timeout: Duration,
    max_redirects: u32,
}

impl UreqTransport {
    /// Build the agent from `config`. Non-2xx statuses are returned as
    /// responses, not errors.
    #[must_use]
    pub fn new(config: &TransportConfig) -> Self {
        ensure_rustls_provider();

        let mut builder = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .timeout_connect(Some(config.connect_timeout))
            .timeout_recv_body(Some(config.read_timeout))
            .user_agent(config.user_agent.as_str());

        if config.no_proxy {
            builder = builder.proxy(None);
        }

        if config.insecure {
            builder = builder.tls_config(
                ureq::tls::TlsConfig::builder()
                    .disable_verification(true)
                    .build(),
            );
        }

        Self {
            agent: Agent::new_with_config(builder.build()),
            timeout: config.timeout,
            max_redirects: config.max_redirects,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

fn prepare<B>(
    mut req: RequestBuilder<B>,
    headers: &HeaderMap,
    timeout: Duration,
    max_redirects: u32,
) -> RequestBuilder<B> {
    for (name, value) in headers.iter() {
        req = req.header(name, value);
    }
    req.config()
        .timeout_global(Some(timeout))
        .max_redirects(max_redirects)
        .build()
}

impl Transport for UreqTransport {
    fn send(&self, req: &Request) -> Result<Response, Error> {
        let method = req.method().clone();
        let url = req.url().as_str();
        let path = req.url().path().to_string().into_boxed_str();
        let headers = req.header_map();
        let options = req.call_options();
        let timeout = options.timeout.unwrap_or(self.timeout);
        let redirects = if options.follow_location {
            self.max_redirects
        } else {
            0
        };

        let map_err = |err: ureq::Error| {
            let kind = match &err {
                ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
                ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                    TransportErrorKind::Connect
                }
                ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
                    TransportErrorKind::Timeout
                }
                ureq::Error::Io(io)
                    if matches!(
                        io.kind(),
                        std::io::ErrorKind::ConnectionRefused
                            | std::io::ErrorKind::ConnectionReset
                            | std::io::ErrorKind::ConnectionAborted
                            | std::io::ErrorKind::NotConnected
                    ) =>
                {
                    TransportErrorKind::Connect
                }
                _ => TransportErrorKind::Other,
            };

            Error::Transport {
                method: method.clone(),
                path: path.clone(),
                kind,
                source: Box::new(err),
            }
        };

        let without_body = match method {
            Method::GET => Some(self.agent.get(url)),
            Method::HEAD => Some(self.agent.head(url)),
            Method::DELETE => Some(self.agent.delete(url)),
            Method::OPTIONS => Some(self.agent.options(url)),
            Method::CONNECT => Some(self.agent.connect(url)),
            Method::TRACE => Some(self.agent.trace(url)),
            _ => None,
        };

        let mut response = if let Some(builder) = without_body {
            prepare(builder, headers, timeout, redirects)
                .call()
                .map_err(map_err)?
        } else {
            let builder = match method {
                Method::POST => self.agent.post(url),
                Method::PUT => self.agent.put(url),
                Method::PATCH => self.agent.patch(url),
                ref other => {
                    return Err(Error::invalid_config(format!(
                        "unsupported HTTP method for the network transport: {other}"
                    )));
                }
            };
            let builder = prepare(builder, headers, timeout, redirects);
            match req.body_bytes() {
                Some(body) => builder.send(body).map_err(map_err)?,
                None => builder.send_empty().map_err(map_err)?,
            }
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        // Differs from the requested URL after a followed redirect.
        let landed = Url::parse(&response.get_uri().to_string()).ok();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(map_err)?;

        let response = Response::new(status, Some(headers), body);
        Ok(match landed {
            Some(url) => response.with_effective_url(url),
            None => response,
        })
    }
}
