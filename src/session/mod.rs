//! Engine entry points: plan, preview and render a project.

pub(crate) mod engine;
