//! Replay canned responses without touching the network.
//!
//! ```bash
//! cargo run --example replay
//! ```
//!
//! Env vars:
//! - `REPLAY_URL` (default: `https://api.example.com/status`)

use serde_json::json;
use vcr_hook::{BoxError, Handle, InterceptionHook, Request, Response};

fn main() -> anyhow::Result<()> {
    let url = env_or("REPLAY_URL", "https://api.example.com/status");

    let hook = InterceptionHook::new(|req: &Request| -> Result<Response, BoxError> {
        let body = json!({ "path": req.url().path(), "method": req.method().as_str() });
        Ok(Response::json(200, &body)?)
    });
    hook.enable();

    // returned
    let mut handle = Handle::open(&url)?;
    handle.set_return_transfer(true);
    let transfer = handle.perform()?;
    println!("returned: {}", transfer.text_lossy().unwrap_or_default());
    if let Some(info) = handle.info() {
        println!("status: {} intercepted: {}", info.status, info.intercepted);
    }

    // echoed to stdout
    handle.set_return_transfer(false);
    handle.perform()?;
    println!();

    handle.close();
    hook.disable();
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}
