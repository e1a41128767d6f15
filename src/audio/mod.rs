//! Voice sequencing, background music selection and the final mix.

pub(crate) mod mix;
pub(crate) mod music;
