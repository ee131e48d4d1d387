use std::{
    any::{type_name, Any},
    borrow::Cow,
    error::Error,
    fmt,
};

use regex::Regex;

/// A misconfigured check. These are programmer errors, not test results.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Regexp could not be compiled: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("comparing uncomparable type {type_name}")]
    Uncomparable { type_name: &'static str },
}

impl ConfigError {
    /// Aborts the running check, the same way the code under test would.
    pub(crate) fn abort(self) -> ! {
        panic!("{self}")
    }
}

/// What a panic payload has to look like.
#[derive(Debug)]
pub enum Expectation {
    /// Any panic will do.
    Any,
    /// The payload text contains this string.
    Substring(String),
    /// The payload text matches this regular expression, unanchored.
    Pattern(String),
    /// The payload equals this value.
    Value(ExpectedValue),
}

impl Expectation {
    pub fn substring(want: impl Into<String>) -> Self {
        Self::Substring(want.into())
    }

    pub fn pattern(want: impl Into<String>) -> Self {
        Self::Pattern(want.into())
    }

    pub fn value<T: Any + Send + PartialEq + fmt::Debug>(want: T) -> Self {
        Self::Value(ExpectedValue::new(want))
    }

    /// Compiles the expectation, which only fails for a [`Expectation::Pattern`] that is not a
    /// valid regex.
    pub fn compile(&self) -> Result<Matcher<'_>, ConfigError> {
        Ok(match self {
            Self::Any => Matcher::Any,
            Self::Substring(want) => Matcher::Substring(want),
            Self::Pattern(want) => {
                Matcher::Pattern(Regex::new(want).map_err(|source| ConfigError::InvalidPattern {
                    pattern: want.clone(),
                    source,
                })?)
            }
            Self::Value(want) => Matcher::Value(want),
        })
    }

    pub(crate) fn compile_or_abort(&self) -> Matcher<'_> {
        self.compile().unwrap_or_else(|err| err.abort())
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any panic"),
            Self::Substring(want) | Self::Pattern(want) => f.write_str(want),
            Self::Value(want) => write!(f, "{want:?}"),
        }
    }
}

/// A compiled [`Expectation`].
#[derive(Debug)]
pub enum Matcher<'e> {
    Any,
    Substring(&'e str),
    Pattern(Regex),
    Value(&'e ExpectedValue),
}

impl Matcher<'_> {
    /// Checks a payload.
    ///
    /// Substring and pattern checks against a payload without a text form are `false`.
    ///
    /// # Panics
    ///
    /// If the payload has the same type as an [`ExpectedValue::uncomparable`].
    pub fn matches(&self, payload: &(dyn Any + Send)) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Substring(want) => {
                payload_text(payload).is_some_and(|text| text.contains(*want))
            }
            Matcher::Pattern(want) => payload_text(payload).is_some_and(|text| want.is_match(&text)),
            Matcher::Value(want) => want.matches(payload),
        }
    }
}

/// A type-erased value for exact payload comparison.
pub struct ExpectedValue {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
    same_type: fn(&(dyn Any + Send)) -> bool,
    eq: Option<fn(&(dyn Any + Send), &(dyn Any + Send)) -> bool>,
    debug: fn(&(dyn Any + Send), &mut fmt::Formatter<'_>) -> fmt::Result,
}

fn same_type<T: Any>(payload: &(dyn Any + Send)) -> bool {
    payload.is::<T>()
}

fn eq<T: Any + PartialEq>(want: &(dyn Any + Send), payload: &(dyn Any + Send)) -> bool {
    match (want.downcast_ref::<T>(), payload.downcast_ref::<T>()) {
        (Some(want), Some(payload)) => want == payload,
        _ => false,
    }
}

fn debug<T: Any + fmt::Debug>(value: &(dyn Any + Send), f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => fmt::Debug::fmt(value, f),
        None => f.write_str(type_name::<T>()),
    }
}

impl ExpectedValue {
    pub fn new<T: Any + Send + PartialEq + fmt::Debug>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
            same_type: same_type::<T>,
            eq: Some(eq::<T>),
            debug: debug::<T>,
        }
    }

    /// A value of a type without equality. Checking a payload of the same type against it
    /// aborts with [`ConfigError::Uncomparable`].
    pub fn uncomparable<T: Any + Send + fmt::Debug>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
            same_type: same_type::<T>,
            eq: None,
            debug: debug::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Compares against a payload. Values of different types are unequal, except that `&str`
    /// and `String` compare by content.
    ///
    /// # Panics
    ///
    /// If the payload has this value's type and that type has no equality.
    pub fn matches(&self, payload: &(dyn Any + Send)) -> bool {
        if let (Some(want), Some(got)) = (plain_text(&*self.value), plain_text(payload)) {
            return want == got;
        }

        if !(self.same_type)(payload) {
            return false;
        }

        match self.eq {
            Some(eq) => eq(&*self.value, payload),
            None => ConfigError::Uncomparable {
                type_name: self.type_name,
            }
            .abort(),
        }
    }
}

impl fmt::Debug for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.debug)(&*self.value, f)
    }
}

fn plain_text(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        Some(*text)
    } else {
        payload.downcast_ref::<String>().map(String::as_str)
    }
}

macro_rules! error_like {
    ($payload:ident => $($ty:ty),* $(,)?) => {
        None::<String>
            .or_else(|| $payload.downcast_ref::<Box<dyn Error + Send + Sync>>().map(|err| err.to_string()))
            .or_else(|| $payload.downcast_ref::<Box<dyn Error + Send>>().map(|err| err.to_string()))
            $(.or_else(|| $payload.downcast_ref::<$ty>().map(|err| err.to_string())))*
    };
}

fn error_text(payload: &(dyn Any + Send)) -> Option<String> {
    error_like!(payload =>
        std::io::Error,
        std::fmt::Error,
        std::num::ParseIntError,
        std::num::ParseFloatError,
        std::str::ParseBoolError,
        std::str::Utf8Error,
        std::string::FromUtf8Error,
        regex::Error,
        ConfigError,
    )
}

/// The payload as text: strings as they are, errors through their `Display`. Any other
/// payload has no text form.
pub fn payload_text(payload: &(dyn Any + Send)) -> Option<Cow<'_, str>> {
    plain_text(payload)
        .map(Cow::Borrowed)
        .or_else(|| error_text(payload).map(Cow::Owned))
}

macro_rules! describe_as_debug {
    ($payload:ident => $($ty:ty),* $(,)?) => {
        $(if let Some(value) = $payload.downcast_ref::<$ty>() {
            return format!("{value:?}");
        })*
    };
}

/// Renders a payload for failure messages.
pub fn describe_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = plain_text(payload) {
        return format!("{text:?}");
    }

    describe_as_debug!(payload =>
        Box<dyn Error + Send + Sync>,
        Box<dyn Error + Send>,
        std::io::Error,
        std::fmt::Error,
        std::num::ParseIntError,
        std::num::ParseFloatError,
        std::str::ParseBoolError,
        std::str::Utf8Error,
        std::string::FromUtf8Error,
        regex::Error,
        ConfigError,
        i8, i16, i32, i64, i128, isize,
        u8, u16, u32, u64, u128, usize,
        f32, f64, bool, char, (),
    );

    "Box<dyn Any>".to_string()
}
