//! # `status_log`
//!
//! Human-readable status lines for long-running command-line work.
//!
//! `status_log` prints to a console stream and rewrites lines in place:
//!
//! * **In-place updates**: inline messages leave the cursor on the line, and every message
//!   starts by clearing it, so the next message replaces the previous one.
//! * **Scoped messages**: a "during" line on entry and an "after" line on exit, on every
//!   exit path including panics.
//! * **Loop progress**: `label i of n (p%) | eta ...` before each element of a sized
//!   iterator.
//! * **Shared counters**: one value incremented from many threads, each increment
//!   printing a throttled status line.
//!
//! ## Modules
//!
//! * [`writer`]: The [`LineWriter`] print primitive, [`Message`] and [`print_dict`].
//! * [`terminal`]: Cursor control sequences (ANSI or none).
//! * [`eta`]: Formatting of estimated time to completion.
//! * [`scope`]: [`ScopedStatus`] during/after brackets.
//! * [`iter`]: The [`Update`] iterator adapter.
//! * [`counter`]: The shared [`Counter`].
//! * [`builder`]: Fluent [`Counter`] construction.
//! * [`config`]: Process-start [`init`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod config;
pub mod counter;
pub mod error;
pub mod eta;
pub mod iter;
pub mod scope;
pub mod terminal;
pub mod writer;

pub use builder::CounterBuilder;
pub use config::{Config, init};
pub use counter::{Counter, Template};
pub use error::{Error, Result};
pub use eta::{Eta, estimate};
pub use iter::{Update, UpdateExt};
pub use scope::{ScopedStatus, StatusGuard};
pub use terminal::{TerminalControl, TerminalMode};
pub use writer::{Capture, LineWriter, Message, default_writer, msg, print_dict, set_default_writer};
