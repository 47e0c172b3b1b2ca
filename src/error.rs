//! Error type shared by every status-line primitive.

use std::io;

use thiserror::Error;

/// Errors surfaced by the writer, the iterator adapter and [`init`](crate::init).
#[derive(Debug, Error)]
pub enum Error {
    /// [`print_dict`](crate::print_dict) was handed a mapping without entries.
    #[error("cannot print an empty mapping: no key to align on")]
    EmptyMapping,

    /// An [`Update`](crate::Update) was pulled again after reporting its end.
    #[error("progress iterator pulled after it was exhausted")]
    Exhausted,

    /// The diagnostic subscriber could not be installed.
    #[error("failed to install diagnostic subscriber: {0}")]
    Subscriber(String),

    /// Writing to the output stream failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
