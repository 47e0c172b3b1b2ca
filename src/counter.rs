//! A counter shared by many workers that reports every increment.
//!
//! [`Counter`] is a cheap, cloneable handle: every clone points to the same value, so it
//! can be handed to as many threads as needed. The value itself is an [`AtomicU64`],
//! but each increment and its status line happen under one [`Mutex`], so the printed
//! lines appear in the same order as the values they report.
//!
//! # Throttling
//!
//! `verbosity` controls how the status line is laid out:
//!
//! * `0`: every increment rewrites the current line in place.
//! * `n > 0`: every increment still writes, but only multiples of `n` end with a
//!   newline. Everything in between overwrites the same line, leaving one committed line
//!   per `n` updates.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use compact_str::CompactString;
use parking_lot::Mutex;

use crate::{
    builder::CounterBuilder,
    error::Result,
    iter::group_thousands,
    writer::{LineWriter, Message},
};

/// A thread-safe, cloneable counter that prints a formatted line on each increment.
///
/// Cloning a `Counter` is cheap (Arc bump) and points to the same underlying state.
#[derive(Clone)]
pub struct Counter {
    pub(crate) value: Arc<AtomicU64>,

    /// Serializes increment + print, and reads.
    pub(crate) guard: Arc<Mutex<()>>,

    pub(crate) template: Arc<Template>,
    pub(crate) verbosity: u64,
    pub(crate) writer: LineWriter,
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("value", &self.value.load(Ordering::Relaxed))
            .field("template", &self.template.source())
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

impl Counter {
    /// Creates a counter at zero using the default writer.
    ///
    /// `template` is rendered with the new value on each increment; see [`Template`].
    #[must_use]
    pub fn new(template: impl Into<CompactString>, verbosity: u64) -> Self {
        CounterBuilder::new(template).verbosity(verbosity).build()
    }

    /// Adds one and writes the status line for the new value.
    ///
    /// Returns the new value. The value is updated even if the write fails.
    ///
    /// # Errors
    ///
    /// Propagates a failure to write the status line.
    pub fn increment(&self) -> Result<u64> {
        let _lock = self.guard.lock();
        let value = self.value.fetch_add(1, Ordering::AcqRel) + 1;

        let inline = self.verbosity == 0 || value % self.verbosity != 0;
        self.writer
            .emit(&Message::new(self.template.render(value)).inline(inline))?;

        Ok(value)
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> u64 {
        let _lock = self.guard.lock();
        self.value.load(Ordering::Acquire)
    }

    /// The throttle divisor this counter was built with.
    #[must_use]
    pub const fn verbosity(&self) -> u64 {
        self.verbosity
    }

    /// The parsed status-line template.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Returns a shared reference to the underlying atomic value.
    ///
    /// Writes through this handle bypass the counter's lock and print nothing.
    #[must_use]
    pub fn atomic_value(&self) -> Arc<AtomicU64> {
        self.value.clone()
    }
}

/// A status-line template with value placeholders.
///
/// Recognised placeholders:
///
/// * `{}` or `{0}`: the value.
/// * `{:,}` or `{0:,}`: the value with `,` thousands separators.
/// * `{{` and `}}`: literal braces.
///
/// Any other brace text is kept verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Template {
    source: CompactString,
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Literal(CompactString),
    Value,
    Grouped,
}

impl Template {
    /// Parses `source` once so rendering is a plain walk over segments.
    #[must_use]
    pub fn parse(source: impl Into<CompactString>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut literal = CompactString::default();
        let mut rest = source.as_str();

        while let Some(pos) = rest.find(['{', '}']) {
            literal.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                literal.push_str(&tail[..1]);
                rest = &tail[2..];
                continue;
            }

            if tail.starts_with('{')
                && let Some(end) = tail.find('}')
            {
                let placeholder = match &tail[1..end] {
                    "" | "0" => Some(Segment::Value),
                    ":," | "0:," => Some(Segment::Grouped),
                    _ => None,
                };
                if let Some(segment) = placeholder {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    rest = &tail[end + 1..];
                    continue;
                }
            }

            // Stray brace
            literal.push_str(&tail[..1]);
            rest = &tail[1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { source, segments }
    }

    /// The template text as given.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitutes `value` into every placeholder.
    #[must_use]
    pub fn render(&self, value: u64) -> String {
        let mut out = String::with_capacity(self.source.len() + 8);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value => out.push_str(&value.to_string()),
                Segment::Grouped => out.push_str(&group_thousands(value)),
            }
        }
        out
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}
