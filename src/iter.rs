//! Loop progress lines for iterators of known length.
//!
//! This module provides the [`Update`] adapter and the [`UpdateExt`] trait, which adds
//! an `.update(label)` method to anything whose iterator is an
//! [`ExactSizeIterator`]. Before each element is handed out, an inline line such as
//!
//! ```text
//! loading 2 of 4 (50.00%) | eta 00m 03s
//! ```
//!
//! replaces the previous one. Once the source is exhausted the optional final message is
//! printed on its own line.
//!
//! # Length
//!
//! The total must be known up front, so only [`ExactSizeIterator`]s are accepted;
//! streaming or unbounded sources do not type-check.
//!
//! # Example
//!
//! ```
//! use status_log::{Capture, LineWriter, UpdateExt, terminal::Plain};
//!
//! let cap = Capture::new();
//! let writer = LineWriter::new(cap.clone()).with_control(Plain);
//!
//! let mut seen = Vec::new();
//! for item in vec!['a', 'b'].update("letters").final_message("done").with_writer(writer) {
//!     seen.push(item.unwrap());
//! }
//!
//! assert_eq!(seen, ['a', 'b']);
//! assert_eq!(cap.contents(), "letters 1 of 2 (50.00%)letters 2 of 2 (100.00%)done\n");
//! ```

use std::{iter::FusedIterator, time::Duration};

use compact_str::CompactString;
use web_time::Instant;

use crate::{
    error::{Error, Result},
    eta::Eta,
    writer::{LineWriter, Message, default_writer},
};

/// Where an [`Update`] is in its lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Running,
    /// The end was reported once; further pulls are errors.
    Done,
}

/// An iterator adapter printing a progress line before yielding each element.
pub struct Update<I> {
    iter: I,
    label: CompactString,
    final_message: Option<CompactString>,
    eta: bool,
    position: u64,
    total: u64,
    start: Instant,
    phase: Phase,
    writer: LineWriter,
}

impl<I: ExactSizeIterator> Update<I> {
    /// Wraps `iter`, taking its current length as the total.
    ///
    /// Note: This is usually constructed via [`UpdateExt::update`].
    pub fn new(iter: I, label: impl Into<CompactString>) -> Self {
        let total = iter.len() as u64;
        Self {
            iter,
            label: label.into(),
            final_message: None,
            eta: false,
            position: 0,
            total,
            start: Instant::now(),
            phase: Phase::Running,
            writer: default_writer(),
        }
    }
}

impl<I> Update<I> {
    /// Message printed on its own line once every element has been yielded.
    #[must_use]
    pub fn final_message(mut self, message: impl Into<CompactString>) -> Self {
        self.final_message = Some(message.into());
        self
    }

    /// Appends an estimated time to completion to each progress line.
    #[must_use]
    pub fn with_eta(mut self) -> Self {
        self.eta = true;
        self
    }

    /// Sets the instant elapsed time is measured from.
    #[must_use]
    pub fn with_start_time(mut self, start: Instant) -> Self {
        self.start = start;
        self
    }

    /// Routes progress lines through `writer` instead of the default writer.
    #[must_use]
    pub fn with_writer(mut self, writer: LineWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Number of elements yielded so far.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Total number of elements.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Time since construction (or the injected start time).
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The progress line for the current position.
    ///
    /// The ETA is only appended strictly between the first and the last element, where
    /// the average rate is both defined and meaningful.
    #[must_use]
    pub fn status_line(&self) -> String {
        self.line_at(self.position)
    }

    #[allow(clippy::cast_precision_loss)]
    fn line_at(&self, i: u64) -> String {
        let n = self.total;
        let percent = if n == 0 {
            0.0
        } else {
            i as f64 / n as f64 * 100.0
        };

        let mut line = format!(
            "{} {} of {} ({percent:.2}%)",
            self.label,
            group_thousands(i),
            group_thousands(n)
        );

        if self.eta && 1 < i && i < n {
            let elapsed = self.elapsed().as_secs_f64();
            let remaining = elapsed / i as f64 * (n - i) as f64;
            line.push_str(&format!(" | eta {}", Eta::from_secs_f64(remaining)));
        }
        line
    }
}

impl<I: Iterator> Update<I> {
    /// Advances the state machine.
    ///
    /// Returns `Ok(Some(item))` while elements remain, `Ok(None)` exactly once when the
    /// end is reached (after printing the final message), then [`Error::Exhausted`].
    ///
    /// # Errors
    ///
    /// [`Error::Exhausted`] when pulled past the end, [`Error::Io`] if a line cannot be
    /// written.
    pub fn try_next(&mut self) -> Result<Option<I::Item>> {
        if self.phase == Phase::Done {
            return Err(Error::Exhausted);
        }

        if self.position >= self.total {
            self.phase = Phase::Done;
            tracing::debug!(label = %self.label, total = self.total, "progress iteration complete");
            if let Some(message) = self.final_message.as_ref().filter(|m| !m.is_empty()) {
                self.writer.emit(&Message::new(message.clone()))?;
            }
            return Ok(None);
        }

        // Position counts elements actually yielded.
        let line = self.line_at(self.position + 1);
        self.writer.emit(&Message::new(line).inline(true))?;
        self.position += 1;

        match self.iter.next() {
            Some(item) => Ok(Some(item)),
            // Source was shorter than it claimed; end here rather than report a bogus total.
            None => {
                self.phase = Phase::Done;
                Ok(None)
            }
        }
    }
}

impl<I: Iterator> Iterator for Update<I> {
    type Item = Result<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.try_next() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) | Err(Error::Exhausted) => None,
            Err(err) => Some(Err(err)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.phase == Phase::Done {
            return (0, Some(0));
        }
        self.iter.size_hint()
    }
}

impl<I: Iterator> FusedIterator for Update<I> {}

/// Extension trait attaching an [`Update`] to any sized iterable.
pub trait UpdateExt: IntoIterator + Sized
where
    Self::IntoIter: ExactSizeIterator,
{
    /// Wraps the iterator in an [`Update`] labelled `label`.
    fn update(self, label: impl Into<CompactString>) -> Update<Self::IntoIter> {
        Update::new(self.into_iter(), label)
    }
}

impl<T> UpdateExt for T
where
    T: IntoIterator,
    T::IntoIter: ExactSizeIterator,
{
}

/// Renders `n` with `,` between groups of three digits.
pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use web_time::Instant;

    use super::{UpdateExt as _, group_thousands};
    use crate::{
        error::Error,
        terminal::{CLEAR, Plain},
        writer::{Capture, LineWriter},
    };

    fn plain() -> (LineWriter, Capture) {
        let cap = Capture::new();
        (LineWriter::new(cap.clone()).with_control(Plain), cap)
    }

    /// Full Lifecycle
    /// Five inline lines, the final message, then exhaustion on the next pull.
    #[test]
    fn test_lifecycle() {
        let (w, cap) = plain();
        let mut it = (0..5).update("x").final_message("finished").with_writer(w);

        for expected in 0..5 {
            assert_eq!(it.try_next().unwrap(), Some(expected));
        }
        assert_eq!(
            cap.contents(),
            "x 1 of 5 (20.00%)x 2 of 5 (40.00%)x 3 of 5 (60.00%)x 4 of 5 (80.00%)x 5 of 5 (100.00%)"
        );

        assert_eq!(it.try_next().unwrap(), None);
        assert!(cap.contents().ends_with("x 5 of 5 (100.00%)finished\n"));

        assert!(matches!(it.try_next(), Err(Error::Exhausted)));
        assert_eq!(it.position(), 5);
    }

    /// In-Place Rewrite
    /// Each progress line starts by clearing the previous one.
    #[test]
    fn test_lines_overwrite() {
        let cap = Capture::new();
        let w = LineWriter::new(cap.clone());

        let items: Vec<_> = ["a", "b"].update("go").with_writer(w).collect();

        assert_eq!(items.len(), 2);
        assert_eq!(
            cap.contents(),
            format!("{CLEAR}go 1 of 2 (50.00%){CLEAR}go 2 of 2 (100.00%)")
        );
    }

    /// Percentage Field
    /// Two decimals of the completed fraction.
    #[test]
    fn test_percentage_formatting() {
        let (w, _cap) = plain();
        let mut it = vec![1, 2, 3, 4].update("p").with_writer(w);

        it.try_next().unwrap();
        it.try_next().unwrap();

        assert_eq!(it.status_line(), "p 2 of 4 (50.00%)");
    }

    /// ETA Window
    /// No estimate at the first and the last element, one in between.
    #[test]
    fn test_eta_only_between_ends() {
        let (w, cap) = plain();
        let start = Instant::now()
            .checked_sub(Duration::from_secs(10))
            .unwrap();
        let mut it = (0..4)
            .update("e")
            .with_eta()
            .with_start_time(start)
            .with_writer(w);

        it.try_next().unwrap();
        assert!(!it.status_line().contains("eta"));

        it.try_next().unwrap();
        // 10s for 2 items, 2 items left
        assert_eq!(it.status_line(), "e 2 of 4 (50.00%) | eta 00m 10s");

        it.try_next().unwrap();
        it.try_next().unwrap();
        assert!(!it.status_line().contains("eta"));

        assert_eq!(cap.contents().matches("| eta").count(), 2);
    }

    /// ETA Opt-In
    #[test]
    fn test_eta_disabled_by_default() {
        let (w, _cap) = plain();
        let mut it = (0..3).update("n").with_writer(w);
        it.try_next().unwrap();
        it.try_next().unwrap();
        assert_eq!(it.status_line(), "n 2 of 3 (66.67%)");
    }

    /// Empty Source
    #[test]
    fn test_empty_sequence() {
        let (w, cap) = plain();
        let mut it = Vec::<u8>::new()
            .update("none")
            .final_message("nothing to do")
            .with_writer(w);

        assert_eq!(it.try_next().unwrap(), None);
        assert_eq!(cap.contents(), "nothing to do\n");
        assert!(matches!(it.try_next(), Err(Error::Exhausted)));
    }

    /// Iterator Integration
    /// The `Iterator` impl ends cleanly and stays ended.
    #[test]
    fn test_iterator_is_fused() {
        let (w, cap) = plain();
        let mut it = [10, 20].iter().update("f").final_message("end").with_writer(w);

        assert_eq!(it.size_hint(), (2, Some(2)));
        let sum: i32 = it.by_ref().map(|r| *r.unwrap()).sum();
        assert_eq!(sum, 30);
        assert!(it.next().is_none());
        assert!(it.next().is_none());
        assert_eq!(it.size_hint(), (0, Some(0)));
        assert_eq!(cap.contents().matches("end\n").count(), 1);
    }

    /// Failed Write
    /// A write error leaves the position untouched and no element is lost.
    #[test]
    fn test_failed_write_keeps_elements() {
        struct FailOnce {
            failed: bool,
            cap: Capture,
        }
        impl std::io::Write for FailOnce {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.failed {
                    self.failed = true;
                    return Err(std::io::Error::new(std::io::ErrorKind::WouldBlock, "blip"));
                }
                std::io::Write::write(&mut self.cap, buf)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let cap = Capture::new();
        let w = LineWriter::new(FailOnce {
            failed: false,
            cap: cap.clone(),
        })
        .with_control(Plain);
        let mut it = vec![1, 2, 3].update("x").with_writer(w);

        assert!(matches!(it.try_next(), Err(Error::Io(_))));
        assert_eq!(it.position(), 0);

        let rest: Vec<i32> = it.by_ref().map(|r| r.unwrap()).collect();
        assert_eq!(rest, [1, 2, 3]);
        assert_eq!(it.position(), 3);
        assert_eq!(cap.contents(), "x 1 of 3 (33.33%)x 2 of 3 (66.67%)x 3 of 3 (100.00%)");
    }

    /// Empty Final Message
    /// An empty final message prints nothing, not a blank line.
    #[test]
    fn test_empty_final_message_skipped() {
        let (w, cap) = plain();
        let mut it = [7].update("one").final_message("").with_writer(w);

        assert_eq!(it.try_next().unwrap(), Some(7));
        assert_eq!(it.try_next().unwrap(), None);
        assert_eq!(cap.contents(), "one 1 of 1 (100.00%)");
    }

    /// Thousands Separator
    #[test]
    fn test_thousands_separator() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    /// Large Counts
    /// Counts in the progress line carry separators.
    #[test]
    fn test_large_counts_grouped() {
        let (w, _cap) = plain();
        let mut it = (0..12_345).update("big").with_writer(w);
        for _ in 0..1_000 {
            it.try_next().unwrap();
        }
        assert_eq!(it.status_line(), "big 1,000 of 12,345 (8.10%)");
    }
}
