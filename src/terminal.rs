//! Cursor control for in-place line rewriting.
//!
//! Only two operations are ever needed: clear the current line (returning to
//! column 0) and move the cursor up one line. [`Ansi`] emits the standard escape
//! sequences, [`Plain`] emits nothing so output stays readable when piped to a
//! file or captured in tests.

use std::{
    fmt,
    io::{self, IsTerminal},
    sync::Arc,
};

/// Erase the whole line and move to column 1.
pub const CLEAR: &str = "\x1b[2K\x1b[1G";

/// Move the cursor to the start of the previous line.
pub const UP: &str = "\x1b[F";

/// The two cursor operations a [`LineWriter`](crate::LineWriter) relies on.
pub trait TerminalControl: Send + Sync + fmt::Debug {
    /// Sequence that clears the current line and returns the cursor to column 0.
    fn clear_line(&self) -> &'static str;

    /// Sequence that moves the cursor up one line.
    fn cursor_up(&self) -> &'static str;
}

/// ANSI/VT100 escape sequences.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Ansi;

impl TerminalControl for Ansi {
    fn clear_line(&self) -> &'static str {
        CLEAR
    }

    fn cursor_up(&self) -> &'static str {
        UP
    }
}

/// No-op control for non-terminal sinks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Plain;

impl TerminalControl for Plain {
    fn clear_line(&self) -> &'static str {
        ""
    }

    fn cursor_up(&self) -> &'static str {
        ""
    }
}

/// Selects which [`TerminalControl`] the default writer uses.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminalMode {
    /// ANSI when standard output is a terminal, plain otherwise.
    #[default]
    Auto,
    /// Always emit escape sequences.
    Ansi,
    /// Never emit escape sequences.
    Plain,
}

impl TerminalMode {
    /// Whether this mode resolves to escape sequences for standard output.
    #[must_use]
    pub fn is_ansi(self) -> bool {
        match self {
            Self::Auto => io::stdout().is_terminal(),
            Self::Ansi => true,
            Self::Plain => false,
        }
    }

    pub(crate) fn control(self) -> Arc<dyn TerminalControl> {
        if self.is_ansi() {
            Arc::new(Ansi)
        } else {
            Arc::new(Plain)
        }
    }
}
