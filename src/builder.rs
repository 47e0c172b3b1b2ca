//! Fluent interface for constructing [`Counter`] instances.
//!
//! [`Counter::new`] covers the common case. The [`CounterBuilder`] adds:
//!
//! * **Shared State:** an existing `Arc<AtomicU64>` can be injected, so several counters
//!   (or a foreign system) accumulate into the *exact same* value while each keeps its
//!   own template and throttle.
//! * **Output Routing:** a specific [`LineWriter`] instead of the process-wide default.

use std::sync::{Arc, atomic::AtomicU64};

use compact_str::CompactString;
use parking_lot::Mutex;

use crate::{
    counter::{Counter, Template},
    writer::{LineWriter, default_writer},
};

/// A builder pattern for constructing [`Counter`] instances.
#[derive(Debug)]
pub struct CounterBuilder {
    template: CompactString,
    verbosity: u64,
    atomic_value: Option<Arc<AtomicU64>>,
    writer: Option<LineWriter>,
}

impl CounterBuilder {
    /// Starts building a counter whose status line is rendered from `template`.
    #[must_use]
    pub fn new(template: impl Into<CompactString>) -> Self {
        Self {
            template: template.into(),
            verbosity: 0,
            atomic_value: None,
            writer: None,
        }
    }

    /// Sets the throttle divisor: `0` rewrites in place on every update, `n` commits a
    /// line on every multiple of `n`.
    #[must_use]
    pub const fn verbosity(mut self, verbosity: u64) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Sets a pre-existing atomic for the value.
    ///
    /// Counting continues from whatever the atomic currently holds.
    #[must_use]
    pub fn with_atomic_value(mut self, atomic_value: Arc<AtomicU64>) -> Self {
        self.atomic_value = Some(atomic_value);
        self
    }

    /// Routes status lines through `writer`.
    #[must_use]
    pub fn with_writer(mut self, writer: LineWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Consumes the builder and returns the constructed [`Counter`].
    #[must_use]
    pub fn build(self) -> Counter {
        tracing::debug!(template = %self.template, verbosity = self.verbosity, "counter created");

        Counter {
            value: self
                .atomic_value
                .unwrap_or_else(|| Arc::new(AtomicU64::new(0))),
            guard: Arc::new(Mutex::new(())),
            template: Arc::new(Template::parse(self.template)),
            verbosity: self.verbosity,
            writer: self.writer.unwrap_or_else(default_writer),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    };

    use super::CounterBuilder;
    use crate::writer::{Capture, LineWriter};

    /// Shared State Injection
    /// Two counters accumulate into the same atomic value.
    #[test]
    fn test_shared_atomic_value() {
        let shared = Arc::new(AtomicU64::new(0));
        let writer = LineWriter::new(Capture::new());

        let downloads = CounterBuilder::new("downloaded {}")
            .with_atomic_value(shared.clone())
            .with_writer(writer.clone())
            .build();
        let uploads = CounterBuilder::new("uploaded {}")
            .with_atomic_value(shared.clone())
            .with_writer(writer)
            .build();

        downloads.increment().unwrap();
        uploads.increment().unwrap();

        assert_eq!(downloads.value(), 2, "both counters see the shared value");
        assert_eq!(shared.load(Ordering::Relaxed), 2);
    }

    /// Injected Start Value
    /// Counting continues from the atomic and throttles on the total.
    #[test]
    fn test_resumes_from_injected_value() {
        let cap = Capture::new();
        let counter = CounterBuilder::new("{}")
            .verbosity(10)
            .with_atomic_value(Arc::new(AtomicU64::new(9)))
            .with_writer(LineWriter::new(cap.clone()))
            .build();

        assert_eq!(counter.increment().unwrap(), 10);
        assert!(cap.contents().ends_with("10\n"));
        assert_eq!(counter.verbosity(), 10);
    }
}
