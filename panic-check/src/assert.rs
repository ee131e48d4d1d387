use crate::{
    capture::{capture, Panic},
    classify::{Expectation, ExpectedValue, Matcher},
};

/// The outcome of a content check on a panic.
#[derive(Debug)]
pub struct PanicCheck {
    pub panicked: bool,
    /// Always `false` when nothing panicked.
    pub matches: bool,
    pub panic: Option<Panic>,
}

impl PanicCheck {
    fn run(f: impl FnOnce(), matcher: &Matcher<'_>) -> Self {
        let panic = capture(f);
        let matches = panic
            .as_ref()
            .is_some_and(|panic| matcher.matches(panic.payload()));
        Self {
            panicked: panic.is_some(),
            matches,
            panic,
        }
    }
}

/// Tests if `f` panics.
///
/// Prefer one of the checks that also looks at the payload, like [`panics_with_substring`].
pub fn panics(f: impl FnOnce()) -> bool {
    capture(f).is_some()
}

/// The opposite of [`panics`].
pub fn does_not_panic(f: impl FnOnce()) -> bool {
    !panics(f)
}

/// Tests if `f` panics, and hands back the panic if it did.
pub fn panics_get(f: impl FnOnce()) -> (bool, Option<Panic>) {
    let panic = capture(f);
    (panic.is_some(), panic)
}

/// The opposite of [`panics_get`]: the flag is `true` if `f` returned normally.
pub fn does_not_panic_get(f: impl FnOnce()) -> (bool, Option<Panic>) {
    let panic = capture(f);
    (panic.is_none(), panic)
}

/// Tests if `f` panics with a payload whose text contains `want`.
///
/// Strings are used as they are and errors through their `Display`; other payloads never
/// match. An empty `want` matches any payload with a text form.
///
/// ```
/// use panic_check::panics_with_substring;
///
/// fn not_nil_task(strs: Option<&[&str]>) {
///     let Some(_strs) = strs else {
///         panic!("Can't do anything - input was nil");
///     };
/// }
///
/// let want = "input was nil";
/// let check = panics_with_substring(|| not_nil_task(None), want);
/// assert!(check.panicked, "expected a nil input to panic");
/// assert!(check.matches, "expected a panic containing {want:?}, got {:?}", check.panic);
/// ```
pub fn panics_with_substring(f: impl FnOnce(), want: &str) -> PanicCheck {
    PanicCheck::run(f, &Matcher::Substring(want))
}

/// Tests if `f` panics with a payload whose text matches the regex `want`.
///
/// The regex is not anchored, and an empty one matches any payload with a text form.
///
/// # Panics
///
/// If `want` is not a valid regex, before `f` runs.
pub fn panics_with_pattern(f: impl FnOnce(), want: &str) -> PanicCheck {
    let expectation = Expectation::pattern(want);
    panics_matching(f, &expectation)
}

/// Tests if `f` panics with a payload equal to `want`.
///
/// # Panics
///
/// If the payload has the type of `want` and it was built with [`ExpectedValue::uncomparable`].
pub fn panics_with_value(f: impl FnOnce(), want: &ExpectedValue) -> PanicCheck {
    PanicCheck::run(f, &Matcher::Value(want))
}

/// Tests if `f` panics with a payload meeting `expectation`.
///
/// # Panics
///
/// On an invalid [`Expectation::Pattern`] or an uncomparable [`Expectation::Value`], the same
/// way [`panics_with_pattern`] and [`panics_with_value`] do.
pub fn panics_matching(f: impl FnOnce(), expectation: &Expectation) -> PanicCheck {
    PanicCheck::run(f, &expectation.compile_or_abort())
}
