use crate::foundation::core::Bgra8;
use crate::foundation::error::{WavelockError, WavelockResult};
use crate::layout::planner::PaneRect;
use crate::render::backend::{
    ChannelStyle, FrameBgra, FrameCompositor, RenderConfig, grid_rects, validate_inputs,
};

/// CPU compositor.
///
/// With antialiasing enabled, waveforms are stroked through `vello_cpu`. With antialiasing
/// disabled, lines are rasterized directly with hard pixel edges so the output contains only
/// the configured colors.
///
/// Both paths fill the background first, then gridlines, then waveforms. Background and grid
/// fills are pixel-aligned and opaque, so those pixels are always bit-exact.
pub struct CpuCompositor {
    ctx: Option<vello_cpu::RenderContext>,
}

impl Default for CpuCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuCompositor {
    /// Create a compositor. The raster context is allocated lazily on the first antialiased
    /// frame and reused while the canvas size stays the same.
    pub fn new() -> Self {
        Self { ctx: None }
    }

    fn render_aliased(
        &mut self,
        windows: &[Vec<f32>],
        styles: &[ChannelStyle],
        layout: &[PaneRect],
        cfg: &RenderConfig,
    ) -> FrameBgra {
        let mut frame = FrameBgra::filled(cfg.canvas, cfg.bg_color);

        if let Some(grid) = cfg.grid_color {
            for pane in layout {
                for r in grid_rects(*pane) {
                    fill_rect(&mut frame, r, grid);
                }
            }
        }

        let thickness = (cfg.line_width.round() as i64).max(1);
        for ((window, style), pane) in windows.iter().zip(styles).zip(layout) {
            let color = style.line_color_or(cfg);
            let points = pixel_points(window, *pane);
            for seg in points.windows(2) {
                draw_line(&mut frame, *pane, seg[0], seg[1], thickness, color);
            }
            if let [only] = points.as_slice() {
                draw_line(&mut frame, *pane, *only, *only, thickness, color);
            }
        }
        frame
    }

    fn render_antialiased(
        &mut self,
        windows: &[Vec<f32>],
        styles: &[ChannelStyle],
        layout: &[PaneRect],
        cfg: &RenderConfig,
    ) -> WavelockResult<FrameBgra> {
        let width = u16::try_from(cfg.canvas.width).map_err(|_| {
            WavelockError::config("render.width", "antialiased output is limited to 65535px")
        })?;
        let height = u16::try_from(cfg.canvas.height).map_err(|_| {
            WavelockError::config("render.height", "antialiased output is limited to 65535px")
        })?;

        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.set_paint(paint(cfg.bg_color));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        if let Some(grid) = cfg.grid_color {
            ctx.set_paint(paint(grid));
            for pane in layout {
                for r in grid_rects(*pane) {
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        f64::from(r.x),
                        f64::from(r.y),
                        f64::from(r.x + r.width),
                        f64::from(r.y + r.height),
                    ));
                }
            }
        }

        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(cfg.line_width)));
        for ((window, style), pane) in windows.iter().zip(styles).zip(layout) {
            let Some(path) = waveform_path(window, *pane, f64::from(cfg.line_width)) else {
                continue;
            };
            ctx.set_paint(paint(style.line_color_or(cfg)));
            ctx.stroke_path(&path);
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        // Every pixel is covered by the opaque background, so premultiplied == straight.
        let src = pixmap.data_as_u8_slice();
        let mut data = Vec::with_capacity(cfg.canvas.bgra_len());
        for p in src.chunks_exact(4) {
            data.extend_from_slice(&[p[2], p[1], p[0], 255]);
        }
        if data.len() != cfg.canvas.bgra_len() {
            return Err(WavelockError::render(format!(
                "raster output has {} bytes, expected {}",
                data.len(),
                cfg.canvas.bgra_len()
            )));
        }

        Ok(FrameBgra {
            width: cfg.canvas.width,
            height: cfg.canvas.height,
            data,
        })
    }
}

impl FrameCompositor for CpuCompositor {
    fn render(
        &mut self,
        windows: &[Vec<f32>],
        styles: &[ChannelStyle],
        layout: &[PaneRect],
        config: &RenderConfig,
    ) -> WavelockResult<FrameBgra> {
        validate_inputs(windows, styles, layout, config)?;
        if config.antialiasing {
            self.render_antialiased(windows, styles, layout, config)
        } else {
            Ok(self.render_aliased(windows, styles, layout, config))
        }
    }
}

fn paint(c: Bgra8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn amplitude(a: f32) -> f64 {
    if a.is_finite() {
        f64::from(a.clamp(-1.0, 1.0))
    } else {
        0.0
    }
}

/// Integer pixel positions of each sample; `+1.0` maps to the pane's top row.
fn pixel_points(window: &[f32], pane: PaneRect) -> Vec<(i64, i64)> {
    if window.is_empty() || pane.width == 0 || pane.height == 0 {
        return Vec::new();
    }
    let x0 = f64::from(pane.x);
    let span_x = f64::from(pane.width - 1);
    let half_h = f64::from(pane.height - 1) / 2.0;
    let y_of = |a: f32| (f64::from(pane.y) + half_h * (1.0 - amplitude(a))).round() as i64;

    if let [only] = window {
        let y = y_of(*only);
        return vec![(pane.x as i64, y), ((x0 + span_x) as i64, y)];
    }

    let step = span_x / (window.len() - 1) as f64;
    let mut out: Vec<(i64, i64)> = Vec::with_capacity(window.len().min(pane.width as usize * 4));
    for (i, &a) in window.iter().enumerate() {
        let p = ((x0 + i as f64 * step).round() as i64, y_of(a));
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    out
}

/// Stroke path through pane-space sample positions, inset by half the line width plus half a
/// pixel so antialiased edges stay inside their pane.
fn waveform_path(
    window: &[f32],
    pane: PaneRect,
    line_width: f64,
) -> Option<vello_cpu::kurbo::BezPath> {
    if window.is_empty() || pane.width == 0 || pane.height == 0 {
        return None;
    }
    let w = f64::from(pane.width);
    let h = f64::from(pane.height);
    let inset = line_width / 2.0 + 0.5;
    let inset_x = inset.min(w / 2.0);
    let inset_y = inset.min(h / 2.0);
    let x0 = f64::from(pane.x) + inset_x;
    let span_x = w - 2.0 * inset_x;
    let center = f64::from(pane.y) + h / 2.0;
    let half = h / 2.0 - inset_y;
    let y_of = |a: f32| center - amplitude(a) * half;

    let mut path = vello_cpu::kurbo::BezPath::new();
    if let [only] = window {
        path.move_to((x0, y_of(*only)));
        path.line_to((x0 + span_x, y_of(*only)));
        return Some(path);
    }

    let step = span_x / (window.len() - 1) as f64;
    for (i, &a) in window.iter().enumerate() {
        let p = (x0 + i as f64 * step, y_of(a));
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    Some(path)
}

fn put_pixel(frame: &mut FrameBgra, x: u32, y: u32, color: Bgra8) {
    let i = (y as usize * frame.width as usize + x as usize) * 4;
    frame.data[i..i + 4].copy_from_slice(&color.to_bytes());
}

fn fill_rect(frame: &mut FrameBgra, r: PaneRect, color: Bgra8) {
    let x1 = (r.x + r.width).min(frame.width);
    let y1 = (r.y + r.height).min(frame.height);
    for y in r.y..y1 {
        for x in r.x..x1 {
            put_pixel(frame, x, y, color);
        }
    }
}

/// Bresenham line with a square `thickness` pen, clipped to `clip`.
fn draw_line(
    frame: &mut FrameBgra,
    clip: PaneRect,
    from: (i64, i64),
    to: (i64, i64),
    thickness: i64,
    color: Bgra8,
) {
    let lo = -((thickness - 1) / 2);
    let hi = lo + thickness - 1;
    let mut stamp = |x: i64, y: i64| {
        for py in (y + lo)..=(y + hi) {
            for px in (x + lo)..=(x + hi) {
                if px < 0 || py < 0 || px > u32::MAX as i64 || py > u32::MAX as i64 {
                    continue;
                }
                let (px, py) = (px as u32, py as u32);
                if clip.contains(px, py) {
                    put_pixel(frame, px, py, color);
                }
            }
        }
    };

    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        stamp(x, y);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
