//  LOG.rs
//    by Lut99
//
//  Created:
//    14 Mar 2025, 10:11:34
//  Last edited:
//    22 Apr 2025, 09:48:17
//  Auto updated?
//    Yes
//
//  Description:
//!   Thin wrappers around the [`log`](https://github.com/rust-lang/log)-crate's
//!   macros that resolve to no-ops unless the `log`-feature is enabled.
//!
//!   This keeps the simulator free of a hard logging dependency while still
//!   letting the grounding and transition paths narrate what they do.
//


/***** LIBRARY *****/
/// Forwards to [`log::warn!`] when the `log`-feature is enabled.
#[cfg(feature = "log")]
#[allow(unused)]
macro_rules! warning {
    ($($t:tt)*) => {
        ::log::warn!($($t)*)
    };
}
/// Forwards to [`log::warn!`] when the `log`-feature is enabled.
///
/// The feature is disabled, so this expands to nothing.
#[cfg(not(feature = "log"))]
#[allow(unused)]
macro_rules! warning {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use warning as warn;

/// Forwards to [`log::debug!`] when the `log`-feature is enabled.
#[cfg(feature = "log")]
#[allow(unused)]
macro_rules! debug {
    ($($t:tt)*) => {
        ::log::debug!($($t)*)
    };
}
/// Forwards to [`log::debug!`] when the `log`-feature is enabled.
///
/// The feature is disabled, so this expands to nothing.
#[cfg(not(feature = "log"))]
#[allow(unused)]
macro_rules! debug {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use debug;

/// Forwards to [`log::trace!`] when the `log`-feature is enabled.
#[cfg(feature = "log")]
#[allow(unused)]
macro_rules! trace {
    ($($t:tt)*) => {
        ::log::trace!($($t)*)
    };
}
/// Forwards to [`log::trace!`] when the `log`-feature is enabled.
///
/// The feature is disabled, so this expands to nothing.
#[cfg(not(feature = "log"))]
#[allow(unused)]
macro_rules! trace {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use trace;
