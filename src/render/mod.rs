/// Frame type, compositor contract, and render settings.
pub mod backend;
/// CPU compositor.
pub mod cpu;
