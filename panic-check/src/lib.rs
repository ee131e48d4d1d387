//! Assertions for code that is supposed to panic.
//!
//! Every helper runs a closure under [`capture`], keeps whatever payload unwinds out of it, and
//! optionally checks that payload against an [`Expectation`]: a substring, a regular expression,
//! or an exact value.
//!
//! ```
//! let check = panic_check::panics_with_substring(|| panic!("input was nil"), "nil");
//! assert!(check.panicked && check.matches);
//! ```
//!
//! Misconfigured checks (a regex that does not compile, or an exact-value check against a type
//! without equality) panic themselves. They use the same mechanism the library observes, so the
//! failure can be asserted on with these same helpers.

use std::{ffi::OsStr, sync::OnceLock};

mod assert;
mod batch;
mod capture;
mod classify;
mod report;

pub use assert::{
    does_not_panic, does_not_panic_get, panics, panics_get, panics_matching, panics_with_pattern,
    panics_with_substring, panics_with_value, PanicCheck,
};
pub use batch::{
    not_panics_batch, not_panics_get_batch, panics_batch, panics_get_batch, run_batch, NamedCase,
};
pub use capture::{capture, Panic};
pub use classify::{
    describe_payload, payload_text, ConfigError, Expectation, ExpectedValue, Matcher,
};
pub use report::{
    not_contains_error, not_contains_fatal, not_equals_error, not_equals_fatal, not_matches_error,
    not_matches_fatal, ConsoleSink, RecordingSink, ReportSink,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Opts {
    backtrace_style: BacktraceStyle,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BacktraceStyle {
    #[default]
    Disabled,
    Short,
    Full,
}

impl Opts {
    pub fn from_env() -> Self {
        let bt = std::env::var_os("RUST_BACKTRACE");
        Self::default().with_backtrace_style(backtrace_style_from(bt.as_deref()))
    }

    #[must_use]
    pub fn with_backtrace_style(mut self, backtrace_style: BacktraceStyle) -> Self {
        self.backtrace_style = backtrace_style;
        self
    }

    pub fn backtrace_style(&self) -> BacktraceStyle {
        self.backtrace_style
    }
}

fn backtrace_style_from(bt: Option<&OsStr>) -> BacktraceStyle {
    if bt == Some(OsStr::new("full")) {
        BacktraceStyle::Full
    } else if bt == Some(OsStr::new("0")) {
        BacktraceStyle::Disabled
    } else if bt.is_some() {
        BacktraceStyle::Short
    } else {
        BacktraceStyle::Disabled
    }
}

static OPTS: OnceLock<Opts> = OnceLock::new();

/// Sets the process-wide options. Only the first call wins; later calls get their options back.
pub fn configure(opts: Opts) -> Result<(), Opts> {
    OPTS.set(opts)
}

/// The process-wide options, read from the environment unless [`configure`] ran first.
pub fn opts() -> Opts {
    *OPTS.get_or_init(Opts::from_env)
}
