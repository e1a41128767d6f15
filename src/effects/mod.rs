//! Pixel-level compositing and segment transitions.

pub(crate) mod composite;
pub(crate) mod transitions;
