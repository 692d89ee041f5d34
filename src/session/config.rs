use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::color::{parse_color_field, parse_optional_color_field};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{WavelockError, WavelockResult};
use crate::layout::planner::LayoutConfig;
use crate::render::backend::{ChannelStyle, RenderConfig};
use crate::trigger::TriggerConfig;

/// JSON-facing description of one render session.
///
/// This is the human-edited boundary object. Every field is checked by
/// [`SessionConfig::validate`] before a [`crate::RenderSession`] is built from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Audio track muxed into encoded output.
    pub master_audio: Option<PathBuf>,
    /// Output frame rate.
    pub fps: u32,
    /// Session start, in seconds into the audio.
    pub begin_time: f64,
    /// Session end in seconds; `None` uses the longest channel.
    pub end_time: Option<f64>,
    /// Trigger window duration in milliseconds.
    pub trigger_ms: f64,
    /// Render window duration in milliseconds.
    pub render_ms: f64,
    /// Read every n-th sample for trigger windows.
    pub trigger_subsampling: u32,
    /// Read every n-th sample for render windows.
    pub render_subsampling: u32,
    /// Gain applied to rendered windows.
    pub amplification: f32,
    /// Trigger tuning shared by all channels.
    pub trigger: TriggerConfig,
    /// One entry per rendered pane, in pane order.
    pub channels: Vec<ChannelConfig>,
    /// Canvas and colors.
    pub render: RenderOpts,
    /// Pane grid.
    pub layout: LayoutConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            master_audio: None,
            fps: 60,
            begin_time: 0.0,
            end_time: None,
            trigger_ms: 40.0,
            render_ms: 40.0,
            trigger_subsampling: 1,
            render_subsampling: 1,
            amplification: 1.0,
            trigger: TriggerConfig::default(),
            channels: Vec::new(),
            render: RenderOpts::default(),
            layout: LayoutConfig::default(),
        }
    }
}

/// One channel of a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Audio file for this channel.
    pub wav_path: PathBuf,
    /// `#rrggbb` line color override.
    pub line_color: Option<String>,
    /// Gain override.
    pub amplification: Option<f32>,
    /// Trigger tuning override.
    pub trigger: Option<TriggerConfig>,
}

impl ChannelConfig {
    /// Channel with default styling reading from `wav_path`.
    pub fn new(wav_path: impl Into<PathBuf>) -> Self {
        Self {
            wav_path: wav_path.into(),
            ..Self::default()
        }
    }
}

/// Canvas and color settings as written in the config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// `#rrggbb` background.
    pub bg_color: String,
    /// `#rrggbb` line color for channels without an override.
    pub init_line_color: String,
    /// `#rrggbb` grid color; absent disables the grid.
    pub grid_color: Option<String>,
    /// Smooth line edges.
    pub antialiasing: bool,
    /// Line width in pixels.
    pub line_width: f32,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            bg_color: "#000000".to_owned(),
            init_line_color: "#ffffff".to_owned(),
            grid_color: None,
            antialiasing: true,
            line_width: 1.5,
        }
    }
}

impl RenderOpts {
    /// Normalize into the fixed-width [`RenderConfig`].
    pub fn resolve(&self) -> WavelockResult<RenderConfig> {
        let canvas = Canvas::new(self.width, self.height)?;
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(WavelockError::config(
                "render.line_width",
                format!("must be > 0, got {}", self.line_width),
            ));
        }
        Ok(RenderConfig {
            canvas,
            bg_color: parse_color_field("render.bg_color", &self.bg_color)?,
            init_line_color: parse_color_field("render.init_line_color", &self.init_line_color)?,
            grid_color: parse_optional_color_field(
                "render.grid_color",
                self.grid_color.as_deref(),
            )?,
            antialiasing: self.antialiasing,
            line_width: self.line_width,
        })
    }
}

impl SessionConfig {
    /// Default session over `paths`, one channel per path in the given order.
    pub fn from_channel_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            channels: paths.into_iter().map(ChannelConfig::new).collect(),
            ..Self::default()
        }
    }

    /// Parse a session from JSON text.
    pub fn from_json_str(s: &str) -> WavelockResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| WavelockError::serde(format!("parse session JSON: {e}")))
    }

    /// Serialize the session as pretty-printed JSON.
    pub fn to_json_string(&self) -> WavelockResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| WavelockError::serde(format!("serialize session JSON: {e}")))
    }

    /// Load a session from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> WavelockResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WavelockError::serde(format!("open session JSON '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            WavelockError::serde(format!("parse session JSON '{}': {e}", path.display()))
        })
    }

    /// Write the session to `path` as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> WavelockResult<()> {
        let path = path.as_ref();
        crate::encode::ffmpeg::ensure_parent_dir(path)?;
        let f = File::create(path).map_err(|e| {
            WavelockError::serde(format!("create session JSON '{}': {e}", path.display()))
        })?;
        serde_json::to_writer_pretty(BufWriter::new(f), self).map_err(|e| {
            WavelockError::serde(format!("write session JSON '{}': {e}", path.display()))
        })
    }

    /// Validated frame rate.
    pub fn frame_rate(&self) -> WavelockResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Per-channel styles, in channel order.
    pub fn channel_styles(&self) -> WavelockResult<Vec<ChannelStyle>> {
        self.channels
            .iter()
            .enumerate()
            .map(|(i, ch)| {
                Ok(ChannelStyle {
                    line_color: parse_optional_color_field(
                        &format!("channels[{i}].line_color"),
                        ch.line_color.as_deref(),
                    )?,
                })
            })
            .collect()
    }

    /// Effective trigger tuning for channel `i`.
    pub fn channel_trigger(&self, i: usize) -> TriggerConfig {
        self.channels
            .get(i)
            .and_then(|ch| ch.trigger)
            .unwrap_or(self.trigger)
    }

    /// Effective gain for channel `i`.
    pub fn channel_amplification(&self, i: usize) -> f32 {
        self.channels
            .get(i)
            .and_then(|ch| ch.amplification)
            .unwrap_or(self.amplification)
    }

    /// Run every configuration check, reporting the first offending field.
    pub fn validate(&self) -> WavelockResult<()> {
        self.frame_rate()?;
        positive_ms("trigger_ms", self.trigger_ms)?;
        positive_ms("render_ms", self.render_ms)?;
        if self.trigger_subsampling == 0 {
            return Err(WavelockError::config("trigger_subsampling", "must be >= 1"));
        }
        if self.render_subsampling == 0 {
            return Err(WavelockError::config("render_subsampling", "must be >= 1"));
        }
        if !self.begin_time.is_finite() || self.begin_time < 0.0 {
            return Err(WavelockError::config("begin_time", "must be finite and >= 0"));
        }
        if let Some(end) = self.end_time
            && (!end.is_finite() || end <= self.begin_time)
        {
            return Err(WavelockError::config(
                "end_time",
                format!("must be greater than begin_time ({})", self.begin_time),
            ));
        }
        finite_gain("amplification", self.amplification)?;
        self.trigger.validate("trigger")?;

        if self.channels.is_empty() {
            return Err(WavelockError::config(
                "channels",
                "at least one channel is required",
            ));
        }
        for (i, ch) in self.channels.iter().enumerate() {
            if ch.wav_path.as_os_str().is_empty() {
                return Err(WavelockError::config(
                    format!("channels[{i}].wav_path"),
                    "must not be empty",
                ));
            }
            if let Some(gain) = ch.amplification {
                finite_gain(&format!("channels[{i}].amplification"), gain)?;
            }
            if let Some(trigger) = ch.trigger {
                trigger.validate(&format!("channels[{i}].trigger"))?;
            }
        }
        self.channel_styles()?;
        self.render.resolve()?;
        self.layout.grid_spec()?;
        Ok(())
    }
}

fn positive_ms(field: &str, ms: f64) -> WavelockResult<()> {
    if !ms.is_finite() || ms <= 0.0 {
        return Err(WavelockError::config(field, format!("must be > 0, got {ms}")));
    }
    Ok(())
}

fn finite_gain(field: &str, gain: f32) -> WavelockResult<()> {
    if !gain.is_finite() {
        return Err(WavelockError::config(field, "must be finite"));
    }
    Ok(())
}

/// List `*.wav` files directly inside `dir`, sorted by path.
pub fn discover_wav_paths(dir: impl AsRef<Path>) -> WavelockResult<Vec<PathBuf>> {
    use anyhow::Context as _;

    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory '{}'", dir.display()))?;
    let mut out = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list directory '{}'", dir.display()))?
            .path();
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if is_wav && path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
