/// JSON session configuration.
pub mod config;
/// Frame loop driving triggers, compositor, and sink.
pub mod pipeline;
