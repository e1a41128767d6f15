//! Timeline layout: one segment per line, driven by measured speech durations.

pub(crate) mod builder;
pub(crate) mod srt;
