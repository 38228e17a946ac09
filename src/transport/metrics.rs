use crate::ErrorKind;
use http::Method;
use std::time::Duration;

pub(crate) struct InFlightGuard {
    gauge: metrics::Gauge,
}

impl InFlightGuard {
    pub(crate) fn new() -> Self {
        let gauge = metrics::gauge!("vcr_hook_inflight");
        gauge.increment(1.0);
        Self { gauge }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.decrement(1.0);
    }
}

fn error_kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Handler => "handler",
        ErrorKind::Transport => "transport",
        ErrorKind::Output => "output",
        ErrorKind::InvalidConfig => "invalid_config",
    }
}

fn method_label(method: &Method) -> metrics::SharedString {
    match method {
        &Method::GET => "GET".into(),
        &Method::POST => "POST".into(),
        &Method::PUT => "PUT".into(),
        &Method::DELETE => "DELETE".into(),
        &Method::PATCH => "PATCH".into(),
        &Method::HEAD => "HEAD".into(),
        &Method::OPTIONS => "OPTIONS".into(),
        other => other.to_string().into(),
    }
}

/// Record one finished call. `intercepted` is `None` when the call failed
/// before a transport answered.
pub(crate) fn record_outcome(
    method: &Method,
    intercepted: Option<bool>,
    latency: Duration,
    error_kind: Option<ErrorKind>,
) {
    let method = method_label(method);
    let route = match intercepted {
        Some(true) => "intercepted",
        Some(false) => "network",
        None => "none",
    };

    metrics::counter!(
        "vcr_hook_calls_total",
        "method" => method.clone(),
        "route" => route
    )
    .increment(1);
    metrics::histogram!(
        "vcr_hook_call_duration_seconds",
        "method" => method.clone(),
        "route" => route
    )
    .record(latency);

    if let Some(kind) = error_kind {
        metrics::counter!(
            "vcr_hook_errors_total",
            "method" => method,
            "kind" => error_kind_label(kind)
        )
        .increment(1);
    }
}
