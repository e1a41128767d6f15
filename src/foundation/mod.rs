//! Shared primitives: time/frame units, errors, and small integer math helpers.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
