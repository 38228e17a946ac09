use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::Result;
use vcr_hook::{
    BoxError, ErrorKind, Handle, InterceptionHook, OutputFile, Request, Response, Transfer,
};

const EXPECTED: &str = "example response body";

// The transport registry is process-wide; hooks from parallel tests would
// answer each other's calls.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

fn replaying_hook() -> InterceptionHook {
    InterceptionHook::new(|_req: &Request| -> Result<Response, BoxError> {
        Ok(Response::new(200, None, EXPECTED))
    })
}

/// Echo target the test can read back.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn fixture(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("vcr-hook-{}-{name}", std::process::id()))
}

#[test]
fn intercepts_call_when_enabled() -> Result<()> {
    let _serial = serial();
    let hook = replaying_hook();
    hook.enable();

    let mut handle = Handle::open("http://google.com/")?;
    handle.set_return_transfer(true);
    let actual = handle.perform()?;
    handle.close();

    hook.disable();
    assert_eq!(actual, Transfer::Body(EXPECTED.as_bytes().to_vec()));
    Ok(())
}

#[test]
fn writes_file_on_file_download() -> Result<()> {
    let _serial = serial();
    let path = fixture("download");
    fs::write(&path, "")?;

    let hook = replaying_hook();
    hook.enable();

    let mut handle = Handle::open("https://google.com/")?;
    handle.set_output_file(OutputFile::create(&path)?);
    let transfer = handle.perform()?;
    handle.close();

    hook.disable();
    assert!(transfer.is_completed());
    assert_eq!(fs::read_to_string(&path)?, EXPECTED);
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn output_file_takes_precedence_over_return_transfer() -> Result<()> {
    let _serial = serial();
    let path = fixture("precedence");

    let hook = replaying_hook();
    hook.enable();

    let mut handle = Handle::open("https://google.com/")?;
    handle
        .set_return_transfer(true)
        .set_output_file(OutputFile::create(&path)?);
    let transfer = handle.perform()?;

    hook.disable();
    assert_eq!(transfer, Transfer::Completed);
    assert_eq!(fs::read_to_string(&path)?, EXPECTED);
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn echo_target_is_untouched_when_body_is_returned() -> Result<()> {
    let _serial = serial();
    let hook = replaying_hook();
    hook.enable();

    let echoed = Captured::default();
    let mut handle = Handle::open("http://google.com/")?;
    handle
        .set_return_transfer(true)
        .set_echo_target(OutputFile::new(echoed.clone()));
    let transfer = handle.perform()?;

    hook.disable();
    assert_eq!(transfer.text_lossy().as_deref(), Some(EXPECTED));
    assert!(echoed.contents().is_empty());
    Ok(())
}

#[test]
fn echoes_response_when_return_transfer_is_false() -> Result<()> {
    let _serial = serial();
    let hook = replaying_hook();
    hook.enable();

    let echoed = Captured::default();
    let mut handle = Handle::open("http://google.com/")?;
    handle
        .set_return_transfer(false)
        .set_echo_target(OutputFile::new(echoed.clone()));
    let transfer = handle.perform()?;

    hook.disable();
    assert_eq!(transfer, Transfer::Completed);
    assert_eq!(echoed.contents(), EXPECTED.as_bytes());
    let info = handle.info().expect("info after successful call");
    assert_eq!(info.body_len, EXPECTED.len());
    assert!(info.intercepted);
    Ok(())
}

#[test]
fn does_not_fail_when_disabled_twice() {
    let _serial = serial();
    let hook = replaying_hook();
    hook.disable();
    hook.disable();
    assert!(!hook.is_enabled());
}

#[test]
fn does_not_fail_when_enabled_twice() {
    let _serial = serial();
    let hook = replaying_hook();
    hook.enable();
    hook.enable();
    assert!(hook.is_enabled());
}

#[test]
fn handler_runs_exactly_once_per_call() -> Result<()> {
    let _serial = serial();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let hook = InterceptionHook::new(move |req: &Request| -> Result<Response, BoxError> {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok(Response::ok(format!("{} {n}", req.url().path())))
    });
    hook.enable();

    let mut handle = Handle::open("http://example.com/one")?;
    handle.set_return_transfer(true);
    let first = handle.perform()?;
    handle.set_url("http://example.com/two")?;
    let second = handle.perform()?;

    hook.disable();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(first.text_lossy().as_deref(), Some("/one 0"));
    assert_eq!(second.text_lossy().as_deref(), Some("/two 1"));
    Ok(())
}

#[test]
fn handler_failure_surfaces_at_call_site() -> Result<()> {
    let _serial = serial();
    let path = fixture("failure");
    fs::write(&path, "untouched")?;

    let hook = InterceptionHook::new(|_req: &Request| -> Result<Response, BoxError> {
        Err("no interaction recorded for this request".into())
    });
    hook.enable();

    let mut handle = Handle::open("https://google.com/search?q=secret")?;
    handle.set_output_file(OutputFile::new(fs::OpenOptions::new().append(true).open(&path)?));
    let err = handle.perform().expect_err("handler failure must propagate");

    hook.disable();
    assert_eq!(err.kind(), ErrorKind::Handler);
    assert!(!err.to_string().contains("secret"));
    assert!(handle.info().is_none());
    assert_eq!(fs::read_to_string(&path)?, "untouched");
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn nested_hook_restores_outer_on_disable() -> Result<()> {
    let _serial = serial();
    let outer = replaying_hook();
    let inner = InterceptionHook::new(|_req: &Request| -> Result<Response, BoxError> {
        Ok(Response::ok("inner"))
    });

    outer.enable();
    inner.enable();

    let mut handle = Handle::open("http://example.com/")?;
    handle.set_return_transfer(true);
    assert_eq!(handle.perform()?.text_lossy().as_deref(), Some("inner"));

    inner.disable();
    assert_eq!(handle.perform()?.text_lossy().as_deref(), Some(EXPECTED));

    outer.disable();
    Ok(())
}
