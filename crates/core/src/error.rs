//! Error types for the engine. Plain enums with hand-written `Display`, matching this
//! codebase's convention of explicit, matchable error kinds rather than boxed errors.

use std::fmt;

/// Errors from the reader/writer lock. `ConcurrentModification` indicates a programming
/// error — a writer released a lock it never acquired — and is treated as fatal by callers.
#[derive(Debug)]
pub enum LockError {
    /// A thread released the write lock without holding it.
    ConcurrentModification,
    /// A blocked wait was cancelled; the caller should abandon the current operation.
    Interrupted,
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::ConcurrentModification => {
                write!(f, "concurrent modification: write lock released by non-owner")
            }
            LockError::Interrupted => write!(f, "interrupted while waiting on lock"),
        }
    }
}

impl std::error::Error for LockError {}

/// Errors from the work queue.
#[derive(Debug)]
pub enum QueueError {
    /// A blocked wait (e.g. `finish`) was cancelled.
    Interrupted,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Interrupted => write!(f, "interrupted while waiting on work queue"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Errors from link extraction and URL canonicalization. Malformed references are
/// skipped by callers, not surfaced as a hard failure, per the link extractor's contract.
#[derive(Debug)]
pub enum LinkError {
    MalformedUrl(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::MalformedUrl(u) => write!(f, "malformed url: {u}"),
        }
    }
}

impl std::error::Error for LinkError {}

/// Errors from the HTML fetcher. `fetch` itself never returns these — it reports
/// absence as `None` — but the I/O layer underneath surfaces them for logging.
#[derive(Debug)]
pub enum FetchError {
    Io(std::io::Error),
    Tls(native_tls::Error),
    InvalidUrl(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Io(e) => write!(f, "io error: {e}"),
            FetchError::Tls(e) => write!(f, "tls error: {e}"),
            FetchError::InvalidUrl(u) => write!(f, "invalid url: {u}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e)
    }
}

impl From<native_tls::Error> for FetchError {
    fn from(e: native_tls::Error) -> Self {
        FetchError::Tls(e)
    }
}

impl From<native_tls::HandshakeError<std::net::TcpStream>> for FetchError {
    fn from(e: native_tls::HandshakeError<std::net::TcpStream>) -> Self {
        match e {
            native_tls::HandshakeError::Failure(e) => FetchError::Tls(e),
            native_tls::HandshakeError::WouldBlock(_) => FetchError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "tls handshake would block",
            )),
        }
    }
}

/// Errors from local filesystem traversal (`-path` mode).
#[derive(Debug)]
pub enum FsIndexError {
    Io(std::io::Error),
}

impl fmt::Display for FsIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsIndexError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for FsIndexError {}

impl From<std::io::Error> for FsIndexError {
    fn from(e: std::io::Error) -> Self {
        FsIndexError::Io(e)
    }
}
