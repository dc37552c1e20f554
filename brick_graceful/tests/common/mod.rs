#![allow(dead_code)]

pub mod vehicle;

/// Delivers the given signal to this very process.
#[cfg(unix)]
pub fn raise(signal: libc::c_int) {
    let result = unsafe { libc::raise(signal) };

    assert_eq!(result, 0, "it should be possible to raise signal {}", signal);
}
