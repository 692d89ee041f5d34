use crate::foundation::core::{Bgra8, Canvas};
use crate::foundation::error::{WavelockError, WavelockResult};
use crate::layout::planner::PaneRect;

/// A rendered frame as BGRA8 pixels.
///
/// Rows are tightly packed top to bottom; every pixel is opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBgra {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// BGRA8 bytes, row-major, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl FrameBgra {
    /// Frame filled with a single color.
    pub fn filled(canvas: Canvas, color: Bgra8) -> Self {
        let px = color.to_bytes();
        let mut data = Vec::with_capacity(canvas.bgra_len());
        for _ in 0..(canvas.width as usize * canvas.height as usize) {
            data.extend_from_slice(&px);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    /// BGRA bytes of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Iterate pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Convert to straight RGBA8 bytes (for image export).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for p in self.data.chunks_exact(4) {
            out.extend_from_slice(&[p[2], p[1], p[0], p[3]]);
        }
        out
    }
}

/// Resolved, immutable render settings for one session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// Output dimensions.
    pub canvas: Canvas,
    /// Canvas background.
    pub bg_color: Bgra8,
    /// Line color for channels without an override.
    pub init_line_color: Bgra8,
    /// Grid color; `None` disables gridlines.
    pub grid_color: Option<Bgra8>,
    /// Smooth lines with blended edge pixels.
    pub antialiasing: bool,
    /// Waveform line width in pixels.
    pub line_width: f32,
}

/// Per-channel drawing style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelStyle {
    /// Line color override.
    pub line_color: Option<Bgra8>,
}

impl ChannelStyle {
    /// Effective line color under `cfg`.
    pub fn line_color_or(&self, cfg: &RenderConfig) -> Bgra8 {
        self.line_color.unwrap_or(cfg.init_line_color)
    }
}

/// Renderer contract: N aligned sample windows in, one BGRA frame out.
///
/// Implementations must be deterministic for identical inputs and must not depend on previously
/// rendered frames.
pub trait FrameCompositor {
    /// Composite one frame.
    fn render(
        &mut self,
        windows: &[Vec<f32>],
        styles: &[ChannelStyle],
        layout: &[PaneRect],
        config: &RenderConfig,
    ) -> WavelockResult<FrameBgra>;
}

/// Available compositor implementations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositorKind {
    /// CPU rasterizer (`vello_cpu` for antialiased output).
    #[default]
    Cpu,
}

/// Create a compositor implementation.
pub fn create_compositor(kind: CompositorKind) -> Box<dyn FrameCompositor> {
    match kind {
        CompositorKind::Cpu => Box::new(crate::render::cpu::CpuCompositor::new()),
    }
}

/// Check that windows, styles, and panes agree and that panes fit on the canvas.
pub(crate) fn validate_inputs(
    windows: &[Vec<f32>],
    styles: &[ChannelStyle],
    layout: &[PaneRect],
    config: &RenderConfig,
) -> WavelockResult<()> {
    if windows.len() != layout.len() {
        return Err(WavelockError::config(
            "layout",
            format!(
                "{} windows but {} panes",
                windows.len(),
                layout.len()
            ),
        ));
    }
    if styles.len() != windows.len() {
        return Err(WavelockError::config(
            "channels",
            format!(
                "{} styles but {} windows",
                styles.len(),
                windows.len()
            ),
        ));
    }
    if config.canvas.width == 0 || config.canvas.height == 0 {
        return Err(WavelockError::config("render", "canvas must be non-empty"));
    }
    if !config.line_width.is_finite() || config.line_width <= 0.0 {
        return Err(WavelockError::config("render.line_width", "must be > 0"));
    }
    for (i, pane) in layout.iter().enumerate() {
        if pane.x + pane.width > config.canvas.width || pane.y + pane.height > config.canvas.height
        {
            return Err(WavelockError::config(
                format!("layout[{i}]"),
                "pane extends beyond the canvas",
            ));
        }
    }
    Ok(())
}

/// Horizontal and vertical grid strokes for `pane`, as 1px-wide rectangles.
///
/// Includes the pane's center crosshair and separators on edges shared with other panes.
pub(crate) fn grid_rects(pane: PaneRect) -> Vec<PaneRect> {
    let mut out = Vec::with_capacity(4);
    if pane.width == 0 || pane.height == 0 {
        return out;
    }
    out.push(PaneRect {
        x: pane.x,
        y: pane.y + pane.height / 2,
        width: pane.width,
        height: 1,
    });
    out.push(PaneRect {
        x: pane.x + pane.width / 2,
        y: pane.y,
        width: 1,
        height: pane.height,
    });
    if pane.x > 0 {
        out.push(PaneRect {
            x: pane.x,
            y: pane.y,
            width: 1,
            height: pane.height,
        });
    }
    if pane.y > 0 {
        out.push(PaneRect {
            x: pane.x,
            y: pane.y,
            width: pane.width,
            height: 1,
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
