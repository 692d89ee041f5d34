use super::*;

const W: u32 = 640;
const H: u32 = 360;

fn assert_tiles(panes: &[PaneRect], grid: Grid, orientation: Orientation) {
    for (i, a) in panes.iter().enumerate() {
        assert!(a.width > 0 && a.height > 0);
        assert!(a.x + a.width <= W && a.y + a.height <= H);
        for b in &panes[i + 1..] {
            assert_eq!(a.overlap_area(*b), 0, "{a:?} overlaps {b:?}");
        }
    }

    let used: u64 = panes.iter().map(|p| p.area()).sum();
    let uncovered: u64 = (panes.len() as u32..grid.capacity() as u32)
        .map(|i| {
            let (r, c) = grid.position(i, orientation);
            grid.cell(r, c, W, H).area()
        })
        .sum();
    assert_eq!(used + uncovered, u64::from(W) * u64::from(H));
}

#[test]
fn auto_grids_cover_canvas_without_overlap() {
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        for n in 1..=17 {
            let grid = grid_dims(n, orientation, None).unwrap();
            assert!(grid.capacity() >= u64::from(n));
            let panes = plan(n, W, H, orientation, None).unwrap();
            assert_eq!(panes.len(), n as usize);
            assert_tiles(&panes, grid, orientation);
        }
    }
}

#[test]
fn auto_grid_shape_follows_orientation() {
    assert_eq!(
        grid_dims(1, Orientation::Horizontal, None).unwrap(),
        Grid { rows: 1, cols: 1 }
    );
    assert_eq!(
        grid_dims(2, Orientation::Horizontal, None).unwrap(),
        Grid { rows: 1, cols: 2 }
    );
    assert_eq!(
        grid_dims(2, Orientation::Vertical, None).unwrap(),
        Grid { rows: 2, cols: 1 }
    );
    assert_eq!(
        grid_dims(5, Orientation::Horizontal, None).unwrap(),
        Grid { rows: 2, cols: 3 }
    );
    assert_eq!(
        grid_dims(9, Orientation::Vertical, None).unwrap(),
        Grid { rows: 3, cols: 3 }
    );
}

#[test]
fn explicit_dimension_derives_the_other() {
    assert_eq!(
        grid_dims(5, Orientation::Horizontal, Some(GridSpec::Cols(2))).unwrap(),
        Grid { rows: 3, cols: 2 }
    );
    assert_eq!(
        grid_dims(5, Orientation::Horizontal, Some(GridSpec::Rows(1))).unwrap(),
        Grid { rows: 1, cols: 5 }
    );
    for n in 1..=9 {
        for spec in [GridSpec::Rows(2), GridSpec::Cols(3), GridSpec::Rows(7)] {
            for orientation in [Orientation::Horizontal, Orientation::Vertical] {
                let grid = grid_dims(n, orientation, Some(spec)).unwrap();
                let panes = plan(n, W, H, orientation, Some(spec)).unwrap();
                assert_tiles(&panes, grid, orientation);
            }
        }
    }
}

#[test]
fn fill_order_is_row_or_column_major() {
    let h = plan(3, 300, 200, Orientation::Horizontal, None).unwrap();
    // 2x2 grid: panes 0 and 1 share the top row.
    assert_eq!((h[0].x, h[0].y), (0, 0));
    assert_eq!((h[1].x, h[1].y), (150, 0));
    assert_eq!((h[2].x, h[2].y), (0, 100));

    let v = plan(3, 300, 200, Orientation::Vertical, None).unwrap();
    assert_eq!((v[1].x, v[1].y), (0, 100));
    assert_eq!((v[2].x, v[2].y), (150, 0));
}

#[test]
fn uneven_extents_tile_exactly() {
    let panes = plan(3, 100, 10, Orientation::Horizontal, Some(GridSpec::Rows(1))).unwrap();
    let widths: Vec<u32> = panes.iter().map(|p| p.width).collect();
    assert_eq!(widths, vec![33, 33, 34]);
    assert_eq!(panes[2].x + panes[2].width, 100);
}

#[test]
fn invalid_layouts_are_config_errors() {
    assert!(plan(0, W, H, Orientation::Horizontal, None).is_err());
    assert_eq!(
        plan(1, 0, H, Orientation::Horizontal, None)
            .unwrap_err()
            .config_field(),
        Some("render.width")
    );
    assert_eq!(
        grid_dims(2, Orientation::Horizontal, Some(GridSpec::Cols(0)))
            .unwrap_err()
            .config_field(),
        Some("layout.ncols")
    );
    assert!(plan(5, 4, H, Orientation::Horizontal, Some(GridSpec::Rows(1))).is_err());

    let both = LayoutConfig {
        nrows: Some(1),
        ncols: Some(2),
        ..LayoutConfig::default()
    };
    assert_eq!(both.grid_spec().unwrap_err().config_field(), Some("layout"));
    assert_eq!(
        LayoutConfig {
            ncols: Some(3),
            ..LayoutConfig::default()
        }
        .grid_spec()
        .unwrap(),
        Some(GridSpec::Cols(3))
    );
}

#[test]
fn pane_rect_geometry() {
    let r = PaneRect {
        x: 10,
        y: 5,
        width: 4,
        height: 2,
    };
    assert_eq!(r.area(), 8);
    assert!(r.contains(10, 5));
    assert!(r.contains(13, 6));
    assert!(!r.contains(14, 6));
    assert!(!r.contains(9, 5));
}
