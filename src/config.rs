//! Process-start configuration.
//!
//! Nothing in this crate touches global state on its own. A host application calls
//! [`init`] once (or again, to reconfigure) to choose how the default writer behaves and,
//! optionally, to install a diagnostic subscriber that shows this crate's own `tracing`
//! events while silencing every other target.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
    error::{Error, Result},
    terminal::TerminalMode,
    writer::{LineWriter, set_default_writer},
};

static SUBSCRIBER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Settings applied by [`init`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Cursor control used on standard output.
    pub terminal: TerminalMode,

    /// Prefix each line with `[YYYY-mm-dd HH:MM:SS]`.
    pub timestamps: bool,

    /// Level for this crate's own diagnostics on stderr; `None` installs nothing.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub diagnostics: Option<LevelFilter>,
}

impl Config {
    /// Sets the terminal mode.
    #[must_use]
    pub const fn with_terminal(mut self, terminal: TerminalMode) -> Self {
        self.terminal = terminal;
        self
    }

    /// Enables or disables timestamp prefixes.
    #[must_use]
    pub const fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Enables crate diagnostics at `level`.
    #[must_use]
    pub const fn with_diagnostics(mut self, level: LevelFilter) -> Self {
        self.diagnostics = Some(level);
        self
    }

    /// Filter directive that keeps this crate at `level` and turns everything else off.
    fn filter(level: LevelFilter) -> EnvFilter {
        EnvFilter::new(format!("off,{}={level}", env!("CARGO_CRATE_NAME")))
    }
}

/// Applies `config` to the process.
///
/// Replaces the default writer used by [`msg`](crate::msg), [`print_dict`](crate::print_dict)
/// and every component built without an explicit writer afterwards. The diagnostic
/// subscriber is installed at most once per process.
///
/// # Errors
///
/// [`Error::Subscriber`] if diagnostics were requested but another global subscriber is
/// already set.
pub fn init(config: &Config) -> Result<()> {
    set_default_writer(LineWriter::from_config(config));

    if let Some(level) = config.diagnostics
        && !SUBSCRIBER_INSTALLED.swap(true, Ordering::AcqRel)
    {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(Config::filter(level))
            .try_init()
            .map_err(|err| {
                SUBSCRIBER_INSTALLED.store(false, Ordering::Release);
                Error::Subscriber(err.to_string())
            })?;
    }

    tracing::debug!(?config, "status output configured");
    Ok(())
}
