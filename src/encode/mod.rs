//! Video encoding sinks and the final audio/video mux.

pub(crate) mod ffmpeg;
pub(crate) mod mux;
pub(crate) mod sink;

pub use self::ffmpeg::ensure_parent_dir;
