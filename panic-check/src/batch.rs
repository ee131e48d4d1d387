use std::fmt;

use crate::{
    capture::{capture, Panic},
    classify::Expectation,
};

/// One row of a panic table.
///
/// `f` is only borrowed while it runs, so the same table can be run any number of times.
pub struct NamedCase<'a> {
    /// Used only in failure messages; it does not have to be unique.
    pub name: String,
    pub f: Box<dyn Fn() + 'a>,
    pub expect: Expectation,
}

impl<'a> NamedCase<'a> {
    /// A case that accepts any panic.
    pub fn new(name: impl Into<String>, f: impl Fn() + 'a) -> Self {
        Self {
            name: name.into(),
            f: Box::new(f),
            expect: Expectation::Any,
        }
    }

    #[must_use]
    pub fn expecting(mut self, expect: Expectation) -> Self {
        self.expect = expect;
        self
    }

    fn run(&self) -> Option<Panic> {
        log::debug!("running panic case '{}'", self.name);
        capture(|| (self.f)())
    }
}

impl fmt::Debug for NamedCase<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedCase")
            .field("name", &self.name)
            .field("expect", &self.expect)
            .finish_non_exhaustive()
    }
}

/// Runs every case and calls `on_no_panic` with the name of each one that does not panic.
///
/// Prefer [`run_batch`], which also checks the panic payloads.
pub fn panics_batch(cases: &[NamedCase<'_>], mut on_no_panic: impl FnMut(&str)) {
    for case in cases {
        if case.run().is_none() {
            log::trace!("'{}' did not panic", case.name);
            on_no_panic(&case.name);
        }
    }
}

/// Like [`panics_batch`], but every panic that does happen is passed to `on_panic`.
pub fn panics_get_batch(
    cases: &[NamedCase<'_>],
    mut on_no_panic: impl FnMut(&str),
    mut on_panic: impl FnMut(&Panic),
) {
    for case in cases {
        match case.run() {
            None => {
                log::trace!("'{}' did not panic", case.name);
                on_no_panic(&case.name);
            }
            Some(panic) => on_panic(&panic),
        }
    }
}

/// Runs every case and calls `on_panic` with the name of each one that panics.
pub fn not_panics_batch(cases: &[NamedCase<'_>], mut on_panic: impl FnMut(&str)) {
    not_panics_get_batch(cases, |name, _| on_panic(name))
}

/// Like [`not_panics_batch`], but `on_panic` also gets the panic.
pub fn not_panics_get_batch(cases: &[NamedCase<'_>], mut on_panic: impl FnMut(&str, &Panic)) {
    for case in cases {
        if let Some(panic) = case.run() {
            log::trace!("'{}' panicked: {}", case.name, panic.describe());
            on_panic(&case.name, &panic);
        }
    }
}

/// Runs every case and checks its panic payload.
///
/// A case that does not panic is passed to `on_no_panic` and its payload is not checked. A case
/// whose payload does not meet its expectation is passed to `on_mismatch` along with the
/// expectation it was checked against. `shared`, when given, replaces every case's own
/// expectation for that check.
///
/// [`crate::not_contains_error`] and its siblings are ready-made `on_mismatch` callbacks.
///
/// # Panics
///
/// On an invalid [`Expectation::Pattern`] or an uncomparable [`Expectation::Value`]. The
/// remaining cases are not run. A shared pattern is compiled before the first case; a case's own
/// pattern just before that case runs.
pub fn run_batch(
    cases: &[NamedCase<'_>],
    shared: Option<&Expectation>,
    mut on_no_panic: impl FnMut(&str),
    mut on_mismatch: impl FnMut(&str, &Expectation, &Panic),
) {
    let shared = shared.map(|expect| (expect, expect.compile_or_abort()));

    for case in cases {
        let own;
        let (expect, matcher) = match &shared {
            Some((expect, matcher)) => (*expect, matcher),
            None => {
                own = case.expect.compile_or_abort();
                (&case.expect, &own)
            }
        };

        match case.run() {
            None => {
                log::trace!("'{}' did not panic", case.name);
                on_no_panic(&case.name);
            }
            Some(panic) => {
                if !matcher.matches(panic.payload()) {
                    log::trace!(
                        "'{}' panicked with {}, expected {expect}",
                        case.name,
                        panic.describe()
                    );
                    on_mismatch(&case.name, expect, &panic);
                }
            }
        }
    }
}
