//! Wavelock renders stabilized oscilloscope videos from audio channels.
//!
//! Each channel gets its own pane. Every frame, a per-channel trigger locks the displayed
//! window onto a consistent phase of the waveform so periodic material stands still instead of
//! scrolling. The public API is session-oriented:
//!
//! - Describe the session with a [`SessionConfig`] (usually loaded from JSON)
//! - Create a [`RenderSession`], which decodes audio and plans the pane layout
//! - Render single frames or stream the whole session into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Audio decoding and windowed sample access.
pub mod audio;
/// Encoding sinks.
pub mod encode;
/// Pane layout planning.
pub mod layout;
/// Frame compositing.
pub mod render;
/// Session configuration and the frame loop.
pub mod session;
pub mod trigger;

pub use crate::foundation::core::{Bgra8, Canvas, Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{WavelockError, WavelockResult};

pub use crate::audio::decode::open_audio;
pub use crate::audio::source::SampleSource;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::layout::planner::{LayoutConfig, Orientation, PaneRect, plan};
pub use crate::render::backend::{
    ChannelStyle, CompositorKind, FrameBgra, FrameCompositor, RenderConfig, create_compositor,
};
pub use crate::render::cpu::CpuCompositor;
pub use crate::session::config::{ChannelConfig, RenderOpts, SessionConfig, discover_wav_paths};
pub use crate::session::pipeline::{CancelToken, RenderSession, RenderStats, RenderThreading};
pub use crate::trigger::{
    CorrelationTrigger, EdgeDirection, NullTrigger, Trigger, TriggerConfig, TriggerKind,
    WindowAnchor, create_trigger,
};
