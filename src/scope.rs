//! "During / after" messages bracketing a block of work.
//!
//! A [`ScopedStatus`] prints its *during* text when entered and its *after* text when
//! the scope ends, whether the body returns normally, returns early through `?`, or
//! panics. The exit write is tied to the [`StatusGuard`]'s `Drop`, so it runs on every
//! exit path.
//!
//! ```
//! use status_log::{Capture, LineWriter, ScopedStatus, terminal::Plain};
//!
//! let cap = Capture::new();
//! let writer = LineWriter::new(cap.clone()).with_control(Plain);
//!
//! let sum = ScopedStatus::executing("job.sql")
//!     .with_writer(writer)
//!     .scope(|| 1 + 1)
//!     .unwrap();
//!
//! assert_eq!(sum, 2);
//! assert_eq!(cap.contents(), "executing job.sql\nexecuted job.sql\n");
//! ```

use std::fmt::Display;

use compact_str::{CompactString, format_compact};

use crate::{
    error::Result,
    writer::{LineWriter, Message, default_writer},
};

/// Paired entry/exit messages, plus how to lay them out.
#[derive(Clone, Debug)]
pub struct ScopedStatus {
    during: CompactString,
    after: CompactString,
    inline: bool,
    delete: usize,
    writer: LineWriter,
}

impl ScopedStatus {
    /// Brackets a scope with `during` on entry and `after` on exit.
    #[must_use]
    pub fn new(during: impl Into<CompactString>, after: impl Into<CompactString>) -> Self {
        Self {
            during: during.into(),
            after: after.into(),
            inline: false,
            delete: 0,
            writer: default_writer(),
        }
    }

    /// `"executing {file}"` / `"executed {file}"`, entry message on its own line.
    #[must_use]
    pub fn executing(file: impl Display) -> Self {
        Self::new(
            format_compact!("executing {file}"),
            format_compact!("executed {file}"),
        )
    }

    /// `"computing {file}"` / `"computed {file}"`, entry message inline so the exit
    /// message replaces it.
    #[must_use]
    pub fn computing(file: impl Display) -> Self {
        Self::new(
            format_compact!("computing {file}"),
            format_compact!("computed {file}"),
        )
        .inline(true)
    }

    /// Whether the entry message is written inline.
    #[must_use]
    pub const fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// Number of lines the exit message erases before printing.
    #[must_use]
    pub const fn delete(mut self, delete: usize) -> Self {
        self.delete = delete;
        self
    }

    /// Routes both messages through `writer` instead of the default writer.
    #[must_use]
    pub fn with_writer(mut self, writer: LineWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Writes the entry message and returns the guard that will write the exit message.
    ///
    /// # Errors
    ///
    /// Fails if the entry message cannot be written; no exit message is written then.
    pub fn enter(self) -> Result<StatusGuard> {
        self.writer
            .emit(&Message::new(self.during.clone()).inline(self.inline))?;
        Ok(StatusGuard {
            status: Some(self),
        })
    }

    /// Runs `body` inside the scope.
    ///
    /// The exit message is written even if `body` panics; on normal return a failure
    /// to write it is reported as the error.
    pub fn scope<R>(self, body: impl FnOnce() -> R) -> Result<R> {
        let guard = self.enter()?;
        let out = body();
        guard.finish()?;
        Ok(out)
    }

    /// Like [`scope`](Self::scope) for fallible bodies; the exit message is written
    /// before the body's error is returned.
    pub fn try_scope<R, E>(self, body: impl FnOnce() -> Result<R, E>) -> Result<Result<R, E>> {
        self.scope(body)
    }
}

/// Writes the exit message of a [`ScopedStatus`] when dropped.
#[derive(Debug)]
#[must_use = "the exit message is written as soon as the guard is dropped"]
pub struct StatusGuard {
    status: Option<ScopedStatus>,
}

impl StatusGuard {
    /// Writes the exit message now, surfacing any stream error.
    ///
    /// # Errors
    ///
    /// Propagates the underlying write failure.
    pub fn finish(mut self) -> Result<()> {
        match self.status.take() {
            Some(status) => exit(&status),
            None => Ok(()),
        }
    }
}

impl Drop for StatusGuard {
    fn drop(&mut self) {
        if let Some(status) = self.status.take()
            && let Err(err) = exit(&status)
        {
            tracing::warn!(error = %err, after = %status.after, "failed to write scope exit message");
        }
    }
}

fn exit(status: &ScopedStatus) -> Result<()> {
    status
        .writer
        .emit(&Message::new(status.after.clone()).delete(status.delete))
}
