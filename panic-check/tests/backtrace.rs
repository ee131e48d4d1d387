//! Runs in its own process so the options can be configured before anything reads them.

use std::sync::Once;

use panic_check::{
    capture, configure, not_contains_error, opts, BacktraceStyle, Expectation, Opts,
    RecordingSink,
};

fn short_backtraces() {
    static CONFIGURE: Once = Once::new();
    CONFIGURE.call_once(|| {
        let short = Opts::default().with_backtrace_style(BacktraceStyle::Short);
        assert_eq!(configure(short), Ok(()));

        let full = Opts::default().with_backtrace_style(BacktraceStyle::Full);
        assert_eq!(configure(full), Err(full));
    });
    assert_eq!(opts().backtrace_style(), BacktraceStyle::Short);
}

#[test]
fn short_style_trims_the_unwind_machinery() {
    short_backtraces();

    let panic = capture(|| panic!("with backtrace")).expect("closure panics");
    let backtrace = panic.backtrace().expect("backtraces are enabled");

    let names: Vec<String> = backtrace
        .frames()
        .iter()
        .flat_map(|frame| frame.symbols())
        .filter_map(|symbol| symbol.name())
        .map(|name| name.to_string())
        .collect();

    assert!(!names.is_empty());
    for name in &names {
        assert!(!name.contains("panic_check_run"), "{names:#?}");
        assert!(!name.contains("rust_begin_unwind"), "{names:#?}");
    }
}

#[test]
fn reports_end_with_the_backtrace() {
    short_backtraces();

    let sink = RecordingSink::new();
    let panic = capture(|| panic!("ppp123")).expect("closure panics");
    not_contains_error(&sink)("bt", &Expectation::substring("zzz"), &panic);

    let errors = sink.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with(
        "Incorrect panic value: expected a string containing\n\"zzz\"\ngot\n\"ppp123\"\nin test 'bt'\n"
    ));

    let backtrace = panic.backtrace().expect("backtraces are enabled");
    assert!(errors[0].ends_with(&format!("\n{backtrace:?}")), "{}", errors[0]);
}
