use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::audio::decode::open_audio;
use crate::audio::source::SampleSource;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{WavelockError, WavelockResult};
use crate::layout::planner::{PaneRect, plan};
use crate::render::backend::{
    ChannelStyle, CompositorKind, FrameBgra, FrameCompositor, RenderConfig, create_compositor,
};
use crate::session::config::SessionConfig;
use crate::trigger::{Trigger, WindowAnchor, create_trigger};

/// Threading controls for per-frame channel work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderThreading {
    /// Run trigger search and window reads for all channels in parallel.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

/// Aggregated rendering counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the session.
    pub frames_total: u64,
    /// Frames handed to the sink.
    pub frames_rendered: u64,
}

/// Shared flag that aborts a render between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The current frame finishes; no further frames are rendered.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Return `true` once [`CancelToken::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything one pane owns for the lifetime of a session.
struct Channel {
    source: SampleSource,
    trigger: Box<dyn Trigger>,
    amplification: f32,
    anchor: WindowAnchor,
    render_len: usize,
    render_stride: usize,
}

impl Channel {
    fn nominal_index(&self, time_secs: f64) -> i64 {
        (time_secs * f64::from(self.source.sample_rate())).round() as i64
    }

    fn window_at(&mut self, time_secs: f64) -> Vec<f32> {
        let nominal = self.nominal_index(time_secs);
        let trigger = self.trigger.get_trigger(&self.source, nominal);
        let start =
            trigger + self.anchor.start_offset(self.render_len) * self.render_stride as i64;
        let mut window = self
            .source
            .read_window_strided(start, self.render_len, self.render_stride);
        if self.amplification != 1.0 {
            for s in &mut window {
                *s *= self.amplification;
            }
        }
        window
    }
}

/// One configured render session.
///
/// Owns every channel's [`SampleSource`] and trigger state plus the compositor. Frames are
/// rendered one at a time in increasing order; channel work within a frame may run on a
/// `rayon` pool.
pub struct RenderSession {
    channels: Vec<Channel>,
    styles: Vec<ChannelStyle>,
    layout: Vec<PaneRect>,
    render: RenderConfig,
    fps: Fps,
    begin_time: f64,
    frames: FrameRange,
    master_audio: Option<std::path::PathBuf>,
    compositor: Box<dyn FrameCompositor>,
    pool: Option<rayon::ThreadPool>,
}

impl RenderSession {
    /// Validate `cfg` and decode every channel's audio file.
    #[tracing::instrument(skip_all, fields(channels = cfg.channels.len()))]
    pub fn new(cfg: &SessionConfig) -> WavelockResult<Self> {
        cfg.validate()?;
        let sources = cfg
            .channels
            .iter()
            .map(|ch| open_audio(&ch.wav_path))
            .collect::<WavelockResult<Vec<_>>>()?;
        Self::from_sources(cfg, sources)
    }

    /// Validate `cfg` and build a session over pre-decoded sources, one per channel.
    pub fn from_sources(cfg: &SessionConfig, sources: Vec<SampleSource>) -> WavelockResult<Self> {
        cfg.validate()?;
        if sources.len() != cfg.channels.len() {
            return Err(WavelockError::config(
                "channels",
                format!(
                    "{} channels configured but {} sources supplied",
                    cfg.channels.len(),
                    sources.len()
                ),
            ));
        }

        let render = cfg.render.resolve()?;
        let styles = cfg.channel_styles()?;
        let fps = cfg.frame_rate()?;
        let pane_count = u32::try_from(sources.len())
            .map_err(|_| WavelockError::config("channels", "too many channels"))?;
        let layout = plan(
            pane_count,
            render.canvas.width,
            render.canvas.height,
            cfg.layout.orientation,
            cfg.layout.grid_spec()?,
        )?;

        let longest = sources
            .iter()
            .map(SampleSource::duration_secs)
            .fold(0.0, f64::max);
        let end_time = cfg.end_time.unwrap_or(longest);
        if end_time <= cfg.begin_time {
            return Err(WavelockError::config(
                "begin_time",
                format!("starts at {}s but audio ends at {end_time}s", cfg.begin_time),
            ));
        }
        let frames = FrameRange::new(
            FrameIndex(0),
            FrameIndex(fps.secs_to_frames_ceil(end_time - cfg.begin_time)),
        )?;

        let mut channels = Vec::with_capacity(sources.len());
        for (i, source) in sources.into_iter().enumerate() {
            let trigger_cfg = cfg.channel_trigger(i);
            let sr = f64::from(source.sample_rate());
            let trigger_stride = cfg.trigger_subsampling as usize;
            let render_stride = cfg.render_subsampling as usize;
            let trigger_len = ms_to_slots(cfg.trigger_ms, sr, trigger_stride);
            let render_len = ms_to_slots(cfg.render_ms, sr, render_stride);
            if render_len == 0 {
                return Err(WavelockError::config(
                    "render_ms",
                    "render window must contain at least one sample",
                ));
            }
            let trigger = create_trigger(&trigger_cfg, trigger_len, trigger_stride)?;
            tracing::debug!(
                channel = i,
                sample_rate = source.sample_rate(),
                trigger_len,
                render_len,
                "channel ready"
            );
            channels.push(Channel {
                source,
                trigger,
                amplification: cfg.channel_amplification(i),
                anchor: trigger_cfg.anchor,
                render_len,
                render_stride,
            });
        }

        Ok(Self {
            channels,
            styles,
            layout,
            render,
            fps,
            begin_time: cfg.begin_time,
            frames,
            master_audio: cfg.master_audio.clone(),
            compositor: create_compositor(CompositorKind::Cpu),
            pool: None,
        })
    }

    /// Enable or disable parallel channel work.
    pub fn with_threading(mut self, threading: RenderThreading) -> WavelockResult<Self> {
        self.pool = if threading.parallel {
            Some(build_thread_pool(threading.threads)?)
        } else {
            None
        };
        Ok(self)
    }

    /// Replace the compositor.
    pub fn with_compositor(mut self, compositor: Box<dyn FrameCompositor>) -> Self {
        self.compositor = compositor;
        self
    }

    /// Frames covered by this session.
    pub fn frames(&self) -> FrameRange {
        self.frames
    }

    /// Pane rectangles, one per channel.
    pub fn layout(&self) -> &[PaneRect] {
        &self.layout
    }

    /// Resolved render settings.
    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    /// Audio time of frame `idx`, in seconds.
    pub fn frame_time(&self, idx: FrameIndex) -> f64 {
        self.begin_time + self.fps.frames_to_secs(idx.0)
    }

    /// Render frame `idx`, advancing every channel's trigger state.
    pub fn render_frame(&mut self, idx: FrameIndex) -> WavelockResult<FrameBgra> {
        let t = self.frame_time(idx);
        let windows: Vec<Vec<f32>> = match self.pool.as_ref() {
            Some(pool) => {
                let channels = &mut self.channels;
                pool.install(|| channels.par_iter_mut().map(|ch| ch.window_at(t)).collect())
            }
            None => self.channels.iter_mut().map(|ch| ch.window_at(t)).collect(),
        };
        self.compositor
            .render(&windows, &self.styles, &self.layout, &self.render)
    }

    /// Render every frame into `sink`, consuming the session.
    ///
    /// Channel state is released before any error is returned. On failure or cancellation the
    /// sink is aborted instead of ended.
    #[tracing::instrument(skip_all, fields(frames = self.frames.len_frames()))]
    pub fn render_to_sink(
        mut self,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> WavelockResult<RenderStats> {
        let result = self.run(sink, cancel);
        drop(self);
        match result {
            Ok(stats) => {
                sink.end()?;
                tracing::info!(frames = stats.frames_rendered, "render finished");
                Ok(stats)
            }
            Err(e) => {
                sink.abort();
                Err(e)
            }
        }
    }

    fn run(&mut self, sink: &mut dyn FrameSink, cancel: &CancelToken) -> WavelockResult<RenderStats> {
        let audio = self.master_audio.clone().map(|path| AudioInputConfig {
            path,
            start_secs: self.begin_time,
        });
        sink.begin(SinkConfig {
            width: self.render.canvas.width,
            height: self.render.canvas.height,
            fps: self.fps,
            audio,
        })?;

        let mut stats = RenderStats {
            frames_total: self.frames.len_frames(),
            frames_rendered: 0,
        };
        tracing::info!(
            frames = stats.frames_total,
            channels = self.channels.len(),
            width = self.render.canvas.width,
            height = self.render.canvas.height,
            "render started"
        );

        for f in self.frames.start.0..self.frames.end.0 {
            if cancel.is_cancelled() {
                tracing::warn!(rendered = stats.frames_rendered, "render cancelled");
                return Err(WavelockError::Cancelled);
            }
            let idx = FrameIndex(f);
            let frame = self.render_frame(idx)?;
            if let Err(e) = sink.push_frame(idx, &frame) {
                tracing::warn!(frame = f, error = %e, "sink rejected frame");
                return Err(e);
            }
            stats.frames_rendered += 1;
        }
        Ok(stats)
    }
}

fn ms_to_slots(ms: f64, sample_rate: f64, stride: usize) -> usize {
    (ms / 1000.0 * sample_rate / stride as f64).round() as usize
}

fn build_thread_pool(threads: Option<usize>) -> WavelockResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(WavelockError::config("threads", "must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| WavelockError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;
