use serde::{Deserialize, Serialize};

use crate::foundation::error::{WavelockError, WavelockResult};

/// Grid fill direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Panes flow left to right, then wrap to the next row. Auto grids favor columns.
    #[default]
    Horizontal,
    /// Panes flow top to bottom, then wrap to the next column. Auto grids favor rows.
    Vertical,
}

/// Pane layout configuration.
///
/// At most one of `nrows`/`ncols` may be set; the other dimension is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fill direction and auto-grid preference.
    pub orientation: Orientation,
    /// Explicit row count.
    pub nrows: Option<u32>,
    /// Explicit column count.
    pub ncols: Option<u32>,
}

impl LayoutConfig {
    /// Resolve the explicit grid dimension, if any.
    pub fn grid_spec(&self) -> WavelockResult<Option<GridSpec>> {
        match (self.nrows, self.ncols) {
            (Some(_), Some(_)) => Err(WavelockError::config(
                "layout",
                "set at most one of `nrows` and `ncols`",
            )),
            (Some(0), None) => Err(WavelockError::config("layout.nrows", "must be >= 1")),
            (None, Some(0)) => Err(WavelockError::config("layout.ncols", "must be >= 1")),
            (Some(r), None) => Ok(Some(GridSpec::Rows(r))),
            (None, Some(c)) => Ok(Some(GridSpec::Cols(c))),
            (None, None) => Ok(None),
        }
    }
}

/// One explicitly requested grid dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridSpec {
    /// Fixed number of rows.
    Rows(u32),
    /// Fixed number of columns.
    Cols(u32),
}

/// Axis-aligned pane rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PaneRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PaneRect {
    /// Area in pixels.
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Return `true` when pixel `(px, py)` lies inside the rectangle.
    pub fn contains(self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Overlapping area with `other` in pixels.
    pub fn overlap_area(self, other: PaneRect) -> u64 {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        u64::from(x1.saturating_sub(x0)) * u64::from(y1.saturating_sub(y0))
    }
}

/// Resolved grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    /// Row count.
    pub rows: u32,
    /// Column count.
    pub cols: u32,
}

impl Grid {
    /// Cell rectangle at `(row, col)`; cell edges are `floor(i * extent / count)` so cells tile
    /// the canvas exactly.
    pub fn cell(self, row: u32, col: u32, canvas_width: u32, canvas_height: u32) -> PaneRect {
        let edge = |i: u32, extent: u32, count: u32| -> u32 {
            (u64::from(i) * u64::from(extent) / u64::from(count)) as u32
        };
        let x0 = edge(col, canvas_width, self.cols);
        let x1 = edge(col + 1, canvas_width, self.cols);
        let y0 = edge(row, canvas_height, self.rows);
        let y1 = edge(row + 1, canvas_height, self.rows);
        PaneRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Total cell count.
    pub fn capacity(self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }

    /// `(row, col)` of the `index`-th pane for the given fill direction.
    pub fn position(self, index: u32, orientation: Orientation) -> (u32, u32) {
        match orientation {
            Orientation::Horizontal => (index / self.cols, index % self.cols),
            Orientation::Vertical => (index % self.rows, index / self.rows),
        }
    }
}

/// Choose grid dimensions for `pane_count` panes.
///
/// Without an explicit dimension the major axis is `ceil(sqrt(n))` and the minor axis is the
/// smallest count that fits every pane, so grids stay near-square with minimal empty cells.
pub fn grid_dims(
    pane_count: u32,
    orientation: Orientation,
    explicit: Option<GridSpec>,
) -> WavelockResult<Grid> {
    if pane_count == 0 {
        return Err(WavelockError::config("channels", "at least one channel is required"));
    }

    let grid = match explicit {
        Some(GridSpec::Rows(0)) => {
            return Err(WavelockError::config("layout.nrows", "must be >= 1"));
        }
        Some(GridSpec::Cols(0)) => {
            return Err(WavelockError::config("layout.ncols", "must be >= 1"));
        }
        Some(GridSpec::Rows(rows)) => Grid {
            rows,
            cols: pane_count.div_ceil(rows),
        },
        Some(GridSpec::Cols(cols)) => Grid {
            rows: pane_count.div_ceil(cols),
            cols,
        },
        None => {
            let major = ceil_sqrt(pane_count);
            let minor = pane_count.div_ceil(major);
            match orientation {
                Orientation::Horizontal => Grid {
                    rows: minor,
                    cols: major,
                },
                Orientation::Vertical => Grid {
                    rows: major,
                    cols: minor,
                },
            }
        }
    };
    Ok(grid)
}

/// Map `pane_count` panes onto the canvas.
///
/// Returns one rectangle per pane in pane order. Cells beyond `pane_count` are left uncovered
/// and show the canvas background.
pub fn plan(
    pane_count: u32,
    canvas_width: u32,
    canvas_height: u32,
    orientation: Orientation,
    explicit: Option<GridSpec>,
) -> WavelockResult<Vec<PaneRect>> {
    if canvas_width == 0 {
        return Err(WavelockError::config("render.width", "must be > 0"));
    }
    if canvas_height == 0 {
        return Err(WavelockError::config("render.height", "must be > 0"));
    }

    let grid = grid_dims(pane_count, orientation, explicit)?;
    if grid.cols > canvas_width {
        return Err(WavelockError::config(
            "layout",
            format!("{} columns do not fit in {canvas_width}px", grid.cols),
        ));
    }
    if grid.rows > canvas_height {
        return Err(WavelockError::config(
            "layout",
            format!("{} rows do not fit in {canvas_height}px", grid.rows),
        ));
    }

    Ok((0..pane_count)
        .map(|i| {
            let (row, col) = grid.position(i, orientation);
            grid.cell(row, col, canvas_width, canvas_height)
        })
        .collect())
}

fn ceil_sqrt(n: u32) -> u32 {
    let mut r = (f64::from(n)).sqrt() as u32;
    while r * r < n {
        r += 1;
    }
    while r > 1 && (r - 1) * (r - 1) >= n {
        r -= 1;
    }
    r.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/planner.rs"]
mod tests;
