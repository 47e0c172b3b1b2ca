//! The single print primitive every other construct routes through.
//!
//! A [`LineWriter`] wraps any [`std::io::Write`] sink and renders [`Message`]s with
//! optional in-place semantics:
//!
//! * **Inline** messages omit the trailing newline, so the next message (which always
//!   starts by clearing the current line) visually replaces them.
//! * **Delete** erases that many previous lines before printing.
//! * **Indent** prefixes the text with four spaces per level.
//!
//! Each message is rendered into one buffer and written under the sink's lock, so
//! concurrent callers sharing a writer never interleave inside a message.

use std::{
    fmt,
    fmt::Display,
    io::{self, Write},
    sync::{Arc, LazyLock},
};

use compact_str::CompactString;
use parking_lot::{Mutex, RwLock};

use crate::{
    config::Config,
    error::{Error, Result},
    terminal::{Ansi, TerminalControl, TerminalMode},
};

/// Width of one indentation level.
const INDENT: &str = "    ";

/// Rendered width of the `[%Y-%m-%d %H:%M:%S] ` prefix.
const TIMESTAMP_WIDTH: usize = 22;

static DEFAULT_WRITER: LazyLock<RwLock<LineWriter>> =
    LazyLock::new(|| RwLock::new(LineWriter::stdout(TerminalMode::Auto)));

/// A text fragment plus the formatting that decides where it lands on screen.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Message {
    text: CompactString,
    inline: bool,
    delete: usize,
    indent: usize,
}

impl Message {
    /// A plain, newline-terminated message.
    #[must_use]
    pub fn new(text: impl Into<CompactString>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Leaves the cursor on the same line so the next message overwrites this one.
    #[must_use]
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// Erases `delete` previous lines before printing.
    #[must_use]
    pub fn delete(mut self, delete: usize) -> Self {
        self.delete = delete;
        self
    }

    /// Indents the text by `indent` levels of four spaces.
    #[must_use]
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// The unformatted text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the message is written without a trailing newline.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        self.inline
    }
}

/// A cloneable handle to an output stream plus the cursor control used on it.
///
/// Cloning is cheap (two `Arc` bumps) and all clones write to the same sink.
#[derive(Clone)]
pub struct LineWriter {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
    control: Arc<dyn TerminalControl>,
    timestamps: bool,
}

impl fmt::Debug for LineWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineWriter")
            .field("control", &self.control)
            .field("timestamps", &self.timestamps)
            .finish_non_exhaustive()
    }
}

impl LineWriter {
    /// Wraps `sink`, emitting ANSI control sequences and no timestamps.
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
            control: Arc::new(Ansi),
            timestamps: false,
        }
    }

    /// A writer on standard output.
    #[must_use]
    pub fn stdout(mode: TerminalMode) -> Self {
        Self::new(io::stdout()).with_control_arc(mode.control())
    }

    /// A standard-output writer set up according to `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::stdout(config.terminal).with_timestamps(config.timestamps)
    }

    /// Replaces the cursor control implementation.
    #[must_use]
    pub fn with_control(self, control: impl TerminalControl + 'static) -> Self {
        self.with_control_arc(Arc::new(control))
    }

    fn with_control_arc(mut self, control: Arc<dyn TerminalControl>) -> Self {
        self.control = control;
        self
    }

    /// Prefixes every line with a local `[YYYY-mm-dd HH:MM:SS]` timestamp.
    #[must_use]
    pub const fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Writes `text` with the given layout.
    ///
    /// Shorthand for [`emit`](Self::emit) with a freshly built [`Message`].
    pub fn write(
        &self,
        text: impl Into<CompactString>,
        inline: bool,
        delete: usize,
        indent: usize,
    ) -> Result<()> {
        self.emit(
            &Message::new(text)
                .inline(inline)
                .delete(delete)
                .indent(indent),
        )
    }

    /// Renders `message` and writes it to the sink, flushing afterwards.
    ///
    /// Layout: `delete` times (clear line, cursor up), then clear line, then the
    /// optional timestamp, indentation, text and, unless inline, a newline.
    pub fn emit(&self, message: &Message) -> Result<()> {
        let rendered = self.render(message);

        let mut sink = self.sink.lock();
        sink.write_all(rendered.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    fn render(&self, message: &Message) -> String {
        let clear = self.control.clear_line();
        let up = self.control.cursor_up();

        let mut out = String::with_capacity(
            message.text.len() + message.delete * (clear.len() + up.len()) + 32,
        );
        for _ in 0..message.delete {
            out.push_str(clear);
            out.push_str(up);
        }
        out.push_str(clear);
        if self.timestamps {
            out.push_str(&format!(
                "{} ",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]")
            ));
        }
        for _ in 0..message.indent {
            out.push_str(INDENT);
        }
        out.push_str(&message.text);
        if !message.inline {
            out.push('\n');
        }
        out
    }

    /// Prints a brace-delimited, column-aligned block of `key : value` lines.
    ///
    /// Keys are right-padded to the longest key. Entries keep the iteration order of
    /// `entries`. The block is emitted as one non-inline message.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyMapping`] when `entries` yields nothing.
    pub fn print_dict<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Display,
    {
        let entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let width = entries
            .iter()
            .map(|(k, _)| k.chars().count())
            .max()
            .ok_or(Error::EmptyMapping)?;

        // Continuation lines start at column 0, so they are padded to line up
        // under the first line's prefix.
        let prefix = if self.timestamps { TIMESTAMP_WIDTH } else { 0 };
        let clear = self.control.clear_line();
        let sep = format!("\n{clear}{}", " ".repeat(prefix + 1));
        let end = format!("\n{clear}{}", " ".repeat(prefix));

        let mut text = String::from("{");
        for (key, value) in &entries {
            text.push_str(&sep);
            text.push_str(&format!("{key:<width$} : {value}"));
        }
        text.push_str(&end);
        text.push('}');

        self.emit(&Message::new(text))
    }
}

/// An in-memory, cloneable [`Write`] sink.
///
/// Useful for headless runs and for asserting on rendered output; all clones share
/// one buffer.
#[derive(Clone, Debug, Default)]
pub struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    /// Creates an empty capture buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Discards the buffered output.
    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Returns a handle to the process-wide default writer.
#[must_use]
pub fn default_writer() -> LineWriter {
    DEFAULT_WRITER.read().clone()
}

/// Replaces the process-wide default writer.
///
/// Components that already captured the previous default keep using it.
pub fn set_default_writer(writer: LineWriter) {
    *DEFAULT_WRITER.write() = writer;
}

/// Writes `text` through the default writer. See [`LineWriter::write`].
pub fn msg(
    text: impl Into<CompactString>,
    inline: bool,
    delete: usize,
    indent: usize,
) -> Result<()> {
    default_writer().write(text, inline, delete, indent)
}

/// Prints an aligned mapping through the default writer. See [`LineWriter::print_dict`].
pub fn print_dict<I, K, V>(entries: I) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    default_writer().print_dict(entries)
}
