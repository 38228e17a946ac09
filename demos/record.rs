//! Forward calls to the network while recording every interaction.
//!
//! ```bash
//! cargo run --example record
//! ```
//!
//! Env vars:
//! - `RECORD_URL` (default: `https://example.com/`)

use std::{sync::Arc, time::Duration};
use vcr_hook::{Handle, InterceptionHook, Recorder, TransportConfig, UreqTransport};

fn main() -> anyhow::Result<()> {
    let url = env_or("RECORD_URL", "https://example.com/");

    let upstream = UreqTransport::new(&TransportConfig {
        timeout: Duration::from_secs(20),
        ..TransportConfig::default()
    });
    let recorder = Recorder::new(Arc::new(upstream));
    let hook = InterceptionHook::with_handler(recorder.clone());
    hook.enable();

    let mut handle = Handle::open(&url)?;
    handle.set_return_transfer(true).set_follow_location(true);
    handle.perform()?;
    hook.disable();

    for interaction in recorder.interactions() {
        println!(
            "{} {} -> {} ({} bytes)",
            interaction.request.method(),
            interaction.request.url(),
            interaction.response.status,
            interaction.response.body.len()
        );
    }
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}
