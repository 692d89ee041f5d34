/// Audio decoding into sample sources.
pub mod decode;
/// Windowed, zero-padded sample access.
pub mod source;
