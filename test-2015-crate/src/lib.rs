#![allow(non_fmt_panics)]

//! Code that panics the edition-2015 way, with whatever value is handed to `panic!`.

/// Panics with the exit code itself as the payload.
pub fn exit_with(code: u32) {
    if code != 0 {
        panic!(code);
    }
}

/// Panics with an owned `String` payload built from `name`.
pub fn missing(name: &str) {
    panic!(format!("missing {}", name));
}
