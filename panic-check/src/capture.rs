use std::{
    any::Any,
    borrow::Cow,
    cell::Cell,
    fmt,
    panic::AssertUnwindSafe,
    sync::Once,
};

use backtrace::Backtrace;
use bstr::ByteSlice;

use crate::{classify, BacktraceStyle};

/// A panic caught by [`capture`].
pub struct Panic {
    payload: Box<dyn Any + Send>,
    report: Option<HookReport>,
}

struct HookReport {
    message: String,
    location: Option<String>,
    backtrace: Option<Backtrace>,
}

impl Panic {
    pub fn payload(&self) -> &(dyn Any + Send) {
        &*self.payload
    }

    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }

    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// The payload as text, if it is a string or an error. See [`crate::payload_text`].
    pub fn text(&self) -> Option<Cow<'_, str>> {
        classify::payload_text(self.payload())
    }

    /// The payload rendered for diagnostics.
    pub fn describe(&self) -> String {
        classify::describe_payload(self.payload())
    }

    /// The panic hook's report, `panicked at file:line:col:` followed by the message.
    ///
    /// This is the last report the hook recorded on this thread inside the capture. It is `None`
    /// when no panic inside the capture went through the hook, as with
    /// [`std::panic::resume_unwind`]. A panic that was caught and swallowed inside the closure
    /// still leaves its report behind for a later `resume_unwind`.
    pub fn message(&self) -> Option<&str> {
        self.report.as_ref().map(|report| report.message.as_str())
    }

    /// Where the panic in [`Panic::message`] happened.
    pub fn location(&self) -> Option<&str> {
        self.report.as_ref()?.location.as_deref()
    }

    /// Only captured when backtraces are enabled, see [`crate::Opts`].
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.report.as_ref()?.backtrace.as_ref()
    }

    /// Continues unwinding with the original payload.
    pub fn resume(self) -> ! {
        std::panic::resume_unwind(self.payload)
    }
}

impl fmt::Debug for Panic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panic")
            .field("payload", &format_args!("{}", self.describe()))
            .field("location", &self.location())
            .finish_non_exhaustive()
    }
}

thread_local! {
    static CAPTURE_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PANIC_INFO: Cell<Option<HookReport>> = const { Cell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            if CAPTURE_DEPTH.with(Cell::get) == 0 {
                return previous(panic_info);
            }

            let message = format!("{panic_info}");
            log::trace!("captured {message}");

            let backtrace = match crate::opts().backtrace_style() {
                BacktraceStyle::Disabled => None,
                BacktraceStyle::Short | BacktraceStyle::Full => Some(Backtrace::new()),
            };

            PANIC_INFO.with(move |cell| {
                cell.set(Some(HookReport {
                    message,
                    location: panic_info.location().map(ToString::to_string),
                    backtrace,
                }))
            });
        }));
    });
}

/// Holds the enclosing capture's report while a nested capture runs, so a capture started from a
/// `Drop` during unwinding leaves the report of the panic being unwound in place.
struct CaptureScope {
    outer: Option<HookReport>,
}

impl CaptureScope {
    fn enter() -> Self {
        CAPTURE_DEPTH.with(|depth| depth.set(depth.get() + 1));
        CaptureScope {
            outer: PANIC_INFO.with(Cell::take),
        }
    }

    /// The report recorded inside this scope.
    fn exit(mut self) -> Option<HookReport> {
        let outer = self.outer.take();
        PANIC_INFO.with(|cell| cell.replace(outer))
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        if let Some(outer) = self.outer.take() {
            PANIC_INFO.with(|cell| cell.set(Some(outer)));
        }
        CAPTURE_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Runs `f` and catches any panic that unwinds out of it.
///
/// Returns `None` if `f` returned normally. Panics inside `f` are not printed by the default
/// hook; they are recorded on the returned [`Panic`] instead. Panics on other threads, and
/// panics on this thread outside of `capture`, go to whatever hook was installed before.
///
/// The hook cannot be installed while the thread is unwinding. If the first `capture` in the
/// process runs from a `Drop` during a panic, it still catches, but its [`Panic`] has no report
/// and the hook is installed by the next `capture` outside of unwinding.
pub fn capture<F: FnOnce()>(f: F) -> Option<Panic> {
    if !std::thread::panicking() {
        install_hook();
    }

    #[inline(never)]
    fn panic_check_run<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
        std::panic::catch_unwind(AssertUnwindSafe(f))
    }

    let scope = CaptureScope::enter();
    let result = panic_check_run(f);
    let report = scope.exit();

    match result {
        Ok(()) => None,
        Err(payload) => {
            let report = report.map(|mut report| {
                if let BacktraceStyle::Short = crate::opts().backtrace_style() {
                    report.backtrace = report.backtrace.map(trim_backtrace);
                }
                report
            });

            Some(Panic { payload, report })
        }
    }
}

/// Keeps the frames between the unwind entry point and `panic_check_run`.
fn trim_backtrace(backtrace: Backtrace) -> Backtrace {
    let mut found_start = false;
    let mut frames = Vec::new();
    for frame in backtrace.frames() {
        if !found_start {
            let [sym] = frame.symbols() else {
                continue
            };

            let Some(name) = sym.name() else {
                continue
            };

            if name.as_bytes().contains_str("rust_begin_unwind") {
                found_start = true;
            }
        } else {
            frames.push(frame.clone());

            let [sym] = frame.symbols() else {
                continue
            };

            let Some(name) = sym.name() else {
                continue
            };

            if name.as_bytes().contains_str("panic_check_run") {
                break;
            }
        }
    }

    frames.pop();

    if found_start {
        Backtrace::from(frames)
    } else {
        backtrace
    }
}
