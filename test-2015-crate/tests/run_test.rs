#![allow(non_fmt_panics)]

// In edition 2015 `panic!` with a single non-literal argument panics with that value, so the
// payload kinds here differ from the ones `panic!` produces in later editions.

extern crate panic_check;
extern crate test_2015_crate;

use panic_check::{
    panics_get, panics_with_pattern, panics_with_substring, panics_with_value, run_batch,
    Expectation, ExpectedValue, NamedCase, Panic,
};

fn caught(panic: Option<Panic>) -> Panic {
    panic.expect("closure panics")
}

#[test]
fn panic_noarg_test() {
    let (did_panic, panic) = panics_get(|| panic!());
    assert!(did_panic);
    assert_eq!(caught(panic).text().as_deref(), Some("explicit panic"));
}

#[test]
fn panic_const_test() {
    let check = panics_with_substring(|| panic!("hello world"), "world");
    assert!(check.panicked);
    assert!(check.matches);
    assert!(caught(check.panic).is::<&'static str>());
}

#[test]
fn panic_dyn_test() {
    let x = 0;
    let check = panics_with_pattern(|| panic!("hello world, {}", x), "world, [0-9]$");
    assert!(check.matches);
    assert!(caught(check.panic).is::<String>());
}

#[test]
fn panic_value_test() {
    let check = panics_with_value(|| panic!(27.5), &ExpectedValue::new(27.5_f64));
    assert!(check.panicked);
    assert!(check.matches);

    let check = panics_with_pattern(|| panic!(27.5), "p{3}");
    assert!(check.panicked);
    assert!(!check.matches);
    assert_eq!(caught(check.panic).downcast_ref::<f64>(), Some(&27.5));
}

#[test]
fn panic_owned_string_test() {
    let check = panics_with_value(
        || panic!(String::from("ppp123")),
        &ExpectedValue::new("ppp123"),
    );
    assert!(check.matches);
}

#[test]
fn panic_table_test() {
    let cases = vec![
        NamedCase::new("const", || panic!("ppp123")),
        NamedCase::new("dyn", || panic!("ppp{}", 123)),
        NamedCase::new("value", || panic!(123)),
        NamedCase::new("quiet", || {}),
    ];
    let shared = Expectation::substring("123");

    let mut quiet = Vec::new();
    let mut mismatched = Vec::new();
    run_batch(
        &cases,
        Some(&shared),
        |name| quiet.push(name.to_string()),
        |name, _, panic| mismatched.push((name.to_string(), panic.describe())),
    );

    assert_eq!(quiet, vec!["quiet".to_string()]);
    assert_eq!(mismatched, vec![("value".to_string(), "123".to_string())]);
}

#[test]
fn panic_from_library_test() {
    let check = panics_with_value(|| test_2015_crate::exit_with(3), &ExpectedValue::new(3_u32));
    assert!(check.matches);

    let (did_panic, _) = panics_get(|| test_2015_crate::exit_with(0));
    assert!(!did_panic);

    let check = panics_with_substring(|| test_2015_crate::missing("config"), "missing config");
    assert!(check.matches);
    assert!(caught(check.panic).is::<String>());
}
