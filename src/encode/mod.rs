/// ffmpeg-backed MP4 sink.
pub mod ffmpeg;
/// Frame sink contract and in-memory sink.
pub mod sink;
