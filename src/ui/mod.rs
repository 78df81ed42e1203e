//! Presentation layer: full-screen karaoke UI and a stdout pipe mode.

pub mod modern;
pub mod modern_helpers;
pub mod pipe;
pub mod styles;
