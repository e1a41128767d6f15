//! Asset loading and per-line asset resolution.

pub(crate) mod decode;
pub(crate) mod fonts;
pub(crate) mod media;
pub(crate) mod resolver;
