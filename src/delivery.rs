//! Applying a response body to the surface the caller asked for.

use crate::{Error, transport::CallOptions};
use std::{fmt, io::Write};

/// Where a response body goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Handed back from `perform()`.
    Return,
    Stdout,
    File,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Return => "caller",
            Self::Stdout => "stdout",
            Self::File => "output file",
        })
    }
}

/// What a performed call hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    /// The body, for calls with `return_transfer` set.
    Body(Vec<u8>),
    /// The body was written to stdout or the output file.
    Completed,
}

impl Transfer {
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Body(body) => Some(body),
            Self::Completed => None,
        }
    }

    #[must_use]
    pub fn into_body(self) -> Option<Vec<u8>> {
        match self {
            Self::Body(body) => Some(body),
            Self::Completed => None,
        }
    }

    #[must_use]
    pub fn text_lossy(&self) -> Option<String> {
        self.body()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Apply `body` according to `options`, writing to `stdout` when the call
/// neither returns the body nor names an output file.
///
/// Output file beats return transfer when both are set.
pub fn deliver(
    body: Vec<u8>,
    options: &CallOptions,
    stdout: &mut dyn Write,
) -> Result<Transfer, Error> {
    let destination = options.destination();
    let written = match (destination, options.output_file.as_ref()) {
        (Destination::Return, _) => return Ok(Transfer::Body(body)),
        (Destination::File, Some(file)) => file.write_body(&body),
        _ => stdout.write_all(&body).and_then(|()| stdout.flush()),
    };
    written.map_err(|source| Error::Output {
        destination,
        source,
    })?;
    Ok(Transfer::Completed)
}
