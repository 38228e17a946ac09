use http::{HeaderMap, HeaderValue, StatusCode, header::CONTENT_TYPE, header::HeaderName};
use serde::Serialize;
use std::borrow::Cow;
use url::Url;

/// A response to replay for an intercepted call, or one received from the
/// network.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Option<HeaderMap>,
    pub body: Vec<u8>,
    effective_url: Option<Url>,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: Option<HeaderMap>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            effective_url: None,
        }
    }

    /// `200 OK` with no headers.
    #[must_use]
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, None, body)
    }

    /// Serialize `value` as the body and set `content-type: application/json`.
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(status, None, body)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json")))
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .append(name, value);
        self
    }

    /// The URL the body was finally served from, when it differs from the
    /// requested one (a followed redirect).
    #[must_use]
    pub fn with_effective_url(mut self, url: Url) -> Self {
        self.effective_url = Some(url);
        self
    }

    #[must_use]
    pub fn effective_url(&self) -> Option<&Url> {
        self.effective_url.as_ref()
    }

    /// Status as a typed code, `None` when outside `100..=999`.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status).ok()
    }

    #[must_use]
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
