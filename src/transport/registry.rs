//! Process-wide transport entry point.
//!
//! Every [`crate::Handle`] call is dispatched through here. Overrides are
//! installed and uninstalled explicitly and form a stack: the most recent
//! install answers calls, and uninstalling it restores whatever was active
//! before. With no override installed, calls go to the real network
//! transport.

use super::{DynTransport, Request, Response, TransportConfig, UreqTransport};
use crate::Error;
use std::sync::{
    Arc, OnceLock, RwLock,
    atomic::{AtomicU64, Ordering},
};

/// Identifies one installed override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstallToken(u64);

/// Result of a dispatched call.
#[derive(Debug)]
pub struct Dispatched {
    pub response: Response,
    /// `true` when an installed override answered instead of the network.
    pub intercepted: bool,
}

static OVERRIDES: RwLock<Vec<(InstallToken, DynTransport)>> = RwLock::new(Vec::new());
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);
static DEFAULT_CONFIG: OnceLock<TransportConfig> = OnceLock::new();
static DEFAULT_TRANSPORT: OnceLock<DynTransport> = OnceLock::new();

/// Make `transport` answer every call until it is uninstalled.
pub fn install(transport: DynTransport) -> InstallToken {
    let token = InstallToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed));
    let mut overrides = OVERRIDES.write().unwrap_or_else(|e| e.into_inner());
    overrides.push((token, transport));
    token
}

/// Remove the override registered under `token`.
///
/// Returns `false` if it was not installed.
pub fn uninstall(token: InstallToken) -> bool {
    let mut overrides = OVERRIDES.write().unwrap_or_else(|e| e.into_inner());
    match overrides.iter().position(|(t, _)| *t == token) {
        Some(idx) => {
            overrides.remove(idx);
            true
        }
        None => false,
    }
}

#[must_use]
pub fn is_intercepting() -> bool {
    let overrides = OVERRIDES.read().unwrap_or_else(|e| e.into_inner());
    overrides.iter().any(|(_, t)| t.intercepts())
}

/// Configure the real network transport. Only possible before its first use.
pub fn configure_default(config: TransportConfig) -> Result<(), Error> {
    if DEFAULT_TRANSPORT.get().is_some() {
        return Err(Error::invalid_config(
            "default transport already initialized",
        ));
    }
    DEFAULT_CONFIG
        .set(config)
        .map_err(|_| Error::invalid_config("default transport already configured"))
}

/// The real network transport used when nothing is installed.
pub fn default_transport() -> DynTransport {
    DEFAULT_TRANSPORT
        .get_or_init(|| {
            let config = DEFAULT_CONFIG.get_or_init(TransportConfig::default);
            let transport: DynTransport = Arc::new(UreqTransport::new(config));
            transport
        })
        .clone()
}

/// Send `req` through the active override, or the network if none is active.
///
/// The active transport is snapshotted and the lock released before sending,
/// so a call already in flight finishes on the transport it started with.
pub fn dispatch(req: &Request) -> Result<Dispatched, Error> {
    let active = {
        let overrides = OVERRIDES.read().unwrap_or_else(|e| e.into_inner());
        overrides.last().map(|(_, t)| Arc::clone(t))
    };
    let transport = active.unwrap_or_else(default_transport);
    let intercepted = transport.intercepts();
    let response = transport.send(req)?;
    Ok(Dispatched {
        response,
        intercepted,
    })
}

#[cfg(test)]
pub(crate) fn serial_guard() -> std::sync::MutexGuard<'static, ()> {
    static SERIAL: std::sync::Mutex<()> = std::sync::Mutex::new(());
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}
