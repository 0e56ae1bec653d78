use std::ops::Range;

use bevy::prelude::Resource;

use super::tools::Toolbox;
use crate::grid::{Cell, CellCoord, GridModel, column_pitch, row_pitch};
use crate::math::{Camera, Vector2, Xform2};

/// Size of the drawing surface in physical pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Width in physical pixels.
    pub width: f64,
    /// Height in physical pixels.
    pub height: f64,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Half-open column/row index ranges of cells that may be visible.
///
/// When the view lies entirely off the grid a range can have `end <= start`,
/// which iterates zero cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CullingRange {
    /// Column indices to draw.
    pub columns: Range<i32>,
    /// Row indices to draw.
    pub rows: Range<i32>,
}

impl CullingRange {
    /// Number of cells covered; zero for inverted ranges.
    pub fn len(&self) -> usize {
        self.columns.len() * self.rows.len()
    }

    /// `true` when nothing needs drawing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinates in draw order: column-major.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.columns
            .clone()
            .flat_map(|x| self.rows.clone().map(move |y| CellCoord::new(x, y)))
    }
}

/// Everything the controller mutates and the renderer reads.
///
/// The highlighted cell is stored as a coordinate and resolved against the
/// grid on demand, so a resize can never leave it dangling.
#[derive(Resource)]
pub struct EditorState {
    /// The map being edited.
    pub grid: GridModel,
    /// View onto the world.
    pub camera: Camera,
    /// Surface size; supplied by the host every frame.
    pub viewport: Viewport,
    /// World units per cell radius.
    pub scale: f64,
    /// Last pointer position in world space.
    pub cursor_world_pos: Vector2,
    /// Cell under the pointer, if any.
    pub highlighted: Option<CellCoord>,
    /// Tool parameters and selection.
    pub toolbox: Toolbox,
}

impl EditorState {
    /// Fresh session over `grid` with a camera at the world origin.
    pub fn new(grid: GridModel, scale: f64) -> Self {
        Self {
            grid,
            camera: Camera::default(),
            viewport: Viewport::default(),
            scale,
            cursor_world_pos: Vector2::ZERO,
            highlighted: None,
            toolbox: Toolbox::default(),
        }
    }

    /// Camera → canvas: centres the camera origin in the viewport and applies the DPI scale.
    pub fn canvas_xform(&self) -> Xform2 {
        let offset = Vector2::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
        Xform2::new(offset, self.viewport.device_pixel_ratio, 0.0)
    }

    /// World → canvas through the current camera. Recomputed on every call.
    pub fn world_to_canvas(&self) -> Xform2 {
        self.canvas_xform().compose(&self.camera.xform())
    }

    /// Canvas → world; inverse of [`Self::world_to_canvas`].
    pub fn canvas_to_world(&self) -> Xform2 {
        self.world_to_canvas().inv()
    }

    /// World-space corners (upper-left, lower-right) of the viewport.
    ///
    /// Assumes an unrotated camera.
    pub fn camera_aabb(&self) -> (Vector2, Vector2) {
        let xform = self.canvas_to_world();
        let ul = xform.apply(Vector2::ZERO);
        let lr = xform.apply(Vector2::new(self.viewport.width, self.viewport.height));
        (ul, lr)
    }

    /// Cell index ranges overlapping the viewport, padded for the staggered columns
    /// and clamped to the grid.
    pub fn culling_range(&self) -> CullingRange {
        let (ul, lr) = self.camera_aabb();
        let dx = column_pitch(self.scale);
        let dy = row_pitch(self.scale);

        // Margins and clamps stay in f64; the view can span more than i32 cells.
        let min_i = ((ul.x / dx).floor() - 1.0).max(0.0);
        let min_j = ((ul.y / dy).floor() - 2.0).max(0.0);
        let end_i = ((lr.x / dx).ceil() + 2.0).min(f64::from(self.grid.width()));
        let end_j = ((lr.y / dy).ceil() + 3.0).min(f64::from(self.grid.height()));

        CullingRange {
            columns: min_i as i32..end_i as i32,
            rows: min_j as i32..end_j as i32,
        }
    }

    /// Moves the cursor to a canvas-space point and re-resolves the highlighted cell.
    pub fn update_cursor(&mut self, canvas_pos: Vector2) {
        self.cursor_world_pos = self.canvas_to_world().apply(canvas_pos);
        self.highlighted = self
            .grid
            .cell_at_position(self.cursor_world_pos, self.scale)
            .map(Cell::coord);
    }

    /// The highlighted cell, if it is (still) inside the grid.
    pub fn highlighted_cell(&self) -> Option<&Cell> {
        self.highlighted.and_then(|coord| self.grid.cell(coord))
    }

    /// Applies the selected tool at the highlighted cell; returns how many cells changed colour.
    pub fn apply_tool(&mut self) -> usize {
        let Self {
            grid,
            toolbox,
            highlighted,
            ..
        } = self;
        match highlighted {
            Some(coord) => toolbox.current().apply(grid, *coord),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{InputController, InputTuning, PointerEvent, ViewportListeners};
    use crate::grid::cell_center;

    fn state(w: i32, h: i32) -> EditorState {
        let mut s = EditorState::new(GridModel::new(w, h), 10.0);
        s.viewport = Viewport {
            width: 800.0,
            height: 600.0,
            device_pixel_ratio: 1.0,
        };
        s
    }

    // ── transforms ──────────────────────────────────────────────────

    #[test]
    fn world_origin_sits_at_viewport_center() {
        let s = state(4, 4);
        let p = s.world_to_canvas().apply(Vector2::ZERO);
        assert!((p - Vector2::new(400.0, 300.0)).length() < 1e-9);
    }

    #[test]
    fn device_pixel_ratio_scales_canvas() {
        let mut s = state(4, 4);
        s.viewport.device_pixel_ratio = 2.0;
        let p = s.world_to_canvas().apply(Vector2::new(10.0, 5.0));
        assert!((p - Vector2::new(420.0, 310.0)).length() < 1e-9);
    }

    #[test]
    fn canvas_to_world_inverts() {
        let mut s = state(4, 4);
        s.camera.position = Vector2::new(33.0, -7.0);
        s.camera.zoom = 2.5;
        s.viewport.device_pixel_ratio = 1.5;
        let p = Vector2::new(123.0, 456.0);
        let back = s.world_to_canvas().apply(s.canvas_to_world().apply(p));
        assert!((back - p).length() < 1e-9);
    }

    #[test]
    fn transforms_follow_camera_changes() {
        let mut s = state(4, 4);
        let before = s.world_to_canvas();
        s.camera.position.x += 10.0;
        assert_ne!(before, s.world_to_canvas());
        s.viewport.width = 1000.0;
        let after_resize = s.world_to_canvas().apply(Vector2::new(10.0, 0.0));
        assert!((after_resize - Vector2::new(500.0, 300.0)).length() < 1e-9);
    }

    // ── culling ─────────────────────────────────────────────────────

    #[test]
    fn aabb_spans_viewport_in_world_units() {
        let mut s = state(4, 4);
        s.camera.zoom = 2.0;
        let (ul, lr) = s.camera_aabb();
        assert!((ul - Vector2::new(-800.0, -600.0)).length() < 1e-9);
        assert!((lr - Vector2::new(800.0, 600.0)).length() < 1e-9);
    }

    #[test]
    fn whole_small_grid_is_visible() {
        let s = state(5, 5);
        let range = s.culling_range();
        assert_eq!(range.columns, 0..5);
        assert_eq!(range.rows, 0..5);
        assert_eq!(range.len(), 25);
    }

    #[test]
    fn zoomed_in_view_limits_range() {
        let mut s = state(200, 200);
        s.camera.position = Vector2::new(1500.0, 1700.0);
        s.camera.zoom = 0.25;
        let range = s.culling_range();
        assert!(range.len() < 200 * 200 / 10, "{range:?}");
        // Every cell whose centre is on screen must be inside the range.
        let xf = s.world_to_canvas();
        for x in 0..200 {
            for y in 0..200 {
                let coord = CellCoord::new(x, y);
                let p = xf.apply(cell_center(coord, s.scale));
                if (0.0..=800.0).contains(&p.x) && (0.0..=600.0).contains(&p.y) {
                    assert!(range.columns.contains(&x) && range.rows.contains(&y), "{coord:?}");
                }
            }
        }
    }

    #[test]
    fn view_off_grid_yields_empty_range() {
        let mut s = state(10, 10);
        s.camera.position = Vector2::new(-10_000.0, -10_000.0);
        let range = s.culling_range();
        assert!(range.is_empty());
        assert_eq!(range.coords().count(), 0);

        s.camera.position = Vector2::new(10_000.0, 10_000.0);
        assert!(s.culling_range().is_empty());
    }

    #[test]
    fn far_zoomed_out_view_covers_whole_grid() {
        let mut s = state(100, 100);
        let mut source = ViewportListeners::default();
        let mut controller = InputController::new(InputTuning {
            min_zoom: 0.0,
            max_zoom: f64::INFINITY,
            ..Default::default()
        });
        controller.attach(&mut source);
        for _ in 0..400 {
            controller.handle(&mut s, PointerEvent::Wheel { delta_y: 1.0 });
        }
        assert!(s.camera.zoom > 1e9);
        let range = s.culling_range();
        assert_eq!(range.columns, 0..100);
        assert_eq!(range.rows, 0..100);
    }

    #[test]
    fn far_panned_view_is_empty() {
        let mut s = state(10, 10);
        s.camera.position = Vector2::new(-1e300, 1e300);
        assert!(s.culling_range().is_empty());
        s.camera.position = Vector2::new(1e300, -1e300);
        assert!(s.culling_range().is_empty());
    }

    #[test]
    fn coords_iterate_column_major() {
        let range = CullingRange {
            columns: 1..3,
            rows: 0..2,
        };
        let coords: Vec<_> = range.coords().collect();
        assert_eq!(
            coords,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
                CellCoord::new(2, 0),
                CellCoord::new(2, 1),
            ]
        );
    }

    // ── cursor ──────────────────────────────────────────────────────

    #[test]
    fn cursor_highlights_cell_under_pointer() {
        let mut s = state(10, 10);
        let coord = CellCoord::new(3, 4);
        let canvas = s.world_to_canvas().apply(cell_center(coord, s.scale));
        s.update_cursor(canvas);
        assert_eq!(s.highlighted, Some(coord));
        assert_eq!(s.highlighted_cell().map(Cell::coord), Some(coord));
    }

    #[test]
    fn cursor_off_grid_clears_highlight() {
        let mut s = state(10, 10);
        s.highlighted = Some(CellCoord::new(1, 1));
        s.update_cursor(Vector2::new(0.0, 0.0));
        assert_eq!(s.highlighted, None);
    }

    #[test]
    fn highlight_resolves_after_shrink() {
        let mut s = state(10, 10);
        s.highlighted = Some(CellCoord::new(8, 8));
        s.grid.resize(4, 4);
        assert!(s.highlighted_cell().is_none());
        assert_eq!(s.apply_tool(), 0);
    }
}
