//! Visual track: backgrounds, transitions and subtitle overlays.

pub(crate) mod compositor;
pub(crate) mod frame;
pub(crate) mod subtitle;
pub(crate) mod wrap;
