//! Ready-made `on_mismatch` callbacks for [`crate::run_batch`].

use std::{
    cell::{Cell, RefCell},
    fmt::Write,
};

use crate::{capture::Panic, classify::Expectation};

/// Where failed checks are reported, usually a thin wrapper over the test itself.
pub trait ReportSink {
    /// Records a failure and lets the test carry on.
    fn report(&self, message: &str);

    /// Records a failure and ends the test. Implementations panic here.
    fn report_fatal(&self, message: &str) -> !;
}

fn mismatch_message(expected: &str, name: &str, panic: &Panic) -> String {
    let mut message = format!(
        "Incorrect panic value: expected{expected}\ngot\n{}\nin test '{name}'",
        panic.describe()
    );
    if let Some(backtrace) = panic.backtrace() {
        let _ = write!(message, "\n{backtrace:?}");
    }
    message
}

fn not_contains_message(name: &str, want: &Expectation, panic: &Panic) -> String {
    mismatch_message(&format!(" a string containing\n\"{want}\""), name, panic)
}

fn not_matches_message(name: &str, want: &Expectation, panic: &Panic) -> String {
    mismatch_message(&format!(" a string matching\n\"{want}\""), name, panic)
}

fn not_equals_message(name: &str, want: &Expectation, panic: &Panic) -> String {
    mismatch_message(&format!("\n{want}"), name, panic)
}

/// Reports substring mismatches to `sink` without ending the test.
pub fn not_contains_error(sink: &dyn ReportSink) -> impl FnMut(&str, &Expectation, &Panic) + '_ {
    move |name: &str, want: &Expectation, panic: &Panic| {
        sink.report(&not_contains_message(name, want, panic))
    }
}

/// Reports the first substring mismatch to `sink` and ends the test.
pub fn not_contains_fatal(sink: &dyn ReportSink) -> impl FnMut(&str, &Expectation, &Panic) + '_ {
    move |name: &str, want: &Expectation, panic: &Panic| {
        sink.report_fatal(&not_contains_message(name, want, panic))
    }
}

/// Reports regex mismatches to `sink` without ending the test.
pub fn not_matches_error(sink: &dyn ReportSink) -> impl FnMut(&str, &Expectation, &Panic) + '_ {
    move |name: &str, want: &Expectation, panic: &Panic| {
        sink.report(&not_matches_message(name, want, panic))
    }
}

/// Reports the first regex mismatch to `sink` and ends the test.
pub fn not_matches_fatal(sink: &dyn ReportSink) -> impl FnMut(&str, &Expectation, &Panic) + '_ {
    move |name: &str, want: &Expectation, panic: &Panic| {
        sink.report_fatal(&not_matches_message(name, want, panic))
    }
}

/// Reports value mismatches to `sink` without ending the test.
pub fn not_equals_error(sink: &dyn ReportSink) -> impl FnMut(&str, &Expectation, &Panic) + '_ {
    move |name: &str, want: &Expectation, panic: &Panic| {
        sink.report(&not_equals_message(name, want, panic))
    }
}

/// Reports the first value mismatch to `sink` and ends the test.
pub fn not_equals_fatal(sink: &dyn ReportSink) -> impl FnMut(&str, &Expectation, &Panic) + '_ {
    move |name: &str, want: &Expectation, panic: &Panic| {
        sink.report_fatal(&not_equals_message(name, want, panic))
    }
}

/// Prints reports to stderr and fails the test once it goes out of scope.
///
/// ```
/// use panic_check::{not_contains_error, run_batch, ConsoleSink, Expectation, NamedCase, ReportSink};
///
/// let sink = ConsoleSink::new();
/// let cases = [NamedCase::new("nil input", || panic!("input was nil"))
///     .expecting(Expectation::substring("nil"))];
/// run_batch(
///     &cases,
///     None,
///     |name| sink.report(&format!("Expected function to panic in test '{name}'")),
///     not_contains_error(&sink),
/// );
/// ```
#[derive(Debug, Default)]
pub struct ConsoleSink {
    failures: Cell<usize>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> usize {
        self.failures.get()
    }
}

impl ReportSink for ConsoleSink {
    fn report(&self, message: &str) {
        use owo_colors::OwoColorize;

        self.failures.set(self.failures.get() + 1);
        eprintln!("{} {message}", "failed".fg::<owo_colors::colors::BrightRed>());
    }

    fn report_fatal(&self, message: &str) -> ! {
        use owo_colors::OwoColorize;

        eprintln!("{} {message}", "fatal".fg::<owo_colors::colors::Red>());
        panic!("{message}")
    }
}

impl Drop for ConsoleSink {
    fn drop(&mut self) {
        let failures = self.failures.get();
        if failures != 0 && !std::thread::panicking() {
            panic!("{failures} panic check(s) failed");
        }
    }
}

/// Keeps every report, for testing callbacks.
#[derive(Debug, Default)]
pub struct RecordingSink {
    errors: RefCell<Vec<String>>,
    fatals: RefCell<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    pub fn fatals(&self) -> Vec<String> {
        self.fatals.borrow().clone()
    }
}

impl ReportSink for RecordingSink {
    fn report(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn report_fatal(&self, message: &str) -> ! {
        self.fatals.borrow_mut().push(message.to_string());
        panic!("{message}")
    }
}
