//! Dialogue script model and the persisted project manifest.

pub(crate) mod model;
pub(crate) mod project;
