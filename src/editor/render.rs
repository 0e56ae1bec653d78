//! Per-frame drawing of the visible part of the grid.
//!
//! Drawing goes through [`Surface`] and frame pacing through [`FrameScheduler`],
//! so the renderer itself never touches a windowing or GPU API.

use bevy::prelude::Resource;

use super::state::EditorState;
use crate::grid::{cell_center, hex_corners};
use crate::math::{Rgb, Vector2};

/// A 2D canvas that accepts filled polygons in canvas pixels.
pub trait Surface {
    /// Erases the previous frame.
    fn clear(&mut self);
    /// Fills a closed polygon, optionally outlining it with `stroke`.
    fn fill_polygon(&mut self, points: &[Vector2], fill: Rgb, stroke: Option<Rgb>);
}

/// Host facility that invokes the render loop once per display refresh.
pub trait FrameScheduler {
    /// Requests one more frame.
    fn schedule_next_frame(&mut self);
    /// Drops any outstanding frame request.
    fn cancel(&mut self);
}

/// Visual constants for grid drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    /// Lighten factor applied to the highlighted cell.
    pub highlight_lighten: f32,
    /// Outlines are drawn while `camera.zoom` is below this value.
    pub outline_zoom_threshold: f64,
    /// Outline colour.
    pub outline_color: Rgb,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            highlight_lighten: 0.2,
            outline_zoom_threshold: 2.5,
            outline_color: Rgb::BLACK,
        }
    }
}

/// Exponential moving average of frame rate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    fps: f64,
    frames: u64,
}

impl FrameStats {
    const SMOOTHING: f64 = 0.1;

    /// Folds in the duration of one frame. Non-positive durations are ignored.
    pub fn record(&mut self, delta_secs: f64) {
        if delta_secs <= 0.0 {
            return;
        }
        let instant = 1.0 / delta_secs;
        self.fps = if self.frames == 0 {
            instant
        } else {
            self.fps + (instant - self.fps) * Self::SMOOTHING
        };
        self.frames += 1;
    }

    /// Smoothed frames per second; zero before the first frame.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Frames recorded so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Draws culled cells of an [`EditorState`] onto a [`Surface`].
#[derive(Resource, Debug, Default)]
pub struct Renderer {
    attached: bool,
    /// Drawing constants.
    pub style: RenderStyle,
    /// Frame timing.
    pub stats: FrameStats,
}

impl Renderer {
    /// Detached renderer with the given style.
    pub fn new(style: RenderStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Whether the loop is live.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Starts (or restarts) the loop by requesting a frame.
    pub fn attach(&mut self, scheduler: &mut impl FrameScheduler) {
        if !self.attached {
            self.attached = true;
            scheduler.schedule_next_frame();
        }
    }

    /// Stops the loop. Safe when already detached.
    pub fn detach(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.attached {
            self.attached = false;
            scheduler.cancel();
        }
    }

    /// Clears `surface` and draws every cell in the culling range; returns the cell count.
    pub fn render(&self, state: &EditorState, surface: &mut impl Surface) -> usize {
        surface.clear();

        let xform = state.world_to_canvas();
        let corners = hex_corners(state.scale);
        let stroke =
            (state.camera.zoom < self.style.outline_zoom_threshold).then_some(self.style.outline_color);

        let mut drawn = 0;
        let mut points = [Vector2::ZERO; 6];
        for coord in state.culling_range().coords() {
            let Some(cell) = state.grid.cell(coord) else {
                continue;
            };
            let center = cell_center(coord, state.scale);
            for (p, corner) in points.iter_mut().zip(corners) {
                *p = xform.apply(center + corner);
            }
            let fill = if state.highlighted == Some(coord) {
                cell.color.lighten(self.style.highlight_lighten)
            } else {
                cell.color
            };
            surface.fill_polygon(&points, fill, stroke);
            drawn += 1;
        }
        drawn
    }

    /// One loop iteration: draws and requests the next frame while attached.
    ///
    /// Returns `false` without drawing once detached, which ends the loop.
    pub fn render_loop(
        &mut self,
        state: &EditorState,
        surface: &mut impl Surface,
        scheduler: &mut impl FrameScheduler,
        delta_secs: f64,
    ) -> bool {
        if !self.attached {
            return false;
        }
        self.stats.record(delta_secs);
        self.render(state, surface);
        scheduler.schedule_next_frame();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::state::Viewport;
    use crate::grid::{CellCoord, GridModel};

    #[derive(Default)]
    struct Recording {
        clears: usize,
        polys: Vec<(Vec<Vector2>, Rgb, Option<Rgb>)>,
    }

    impl Surface for Recording {
        fn clear(&mut self) {
            self.clears += 1;
            self.polys.clear();
        }

        fn fill_polygon(&mut self, points: &[Vector2], fill: Rgb, stroke: Option<Rgb>) {
            self.polys.push((points.to_vec(), fill, stroke));
        }
    }

    #[derive(Default)]
    struct Frames {
        requested: usize,
        cancelled: usize,
    }

    impl FrameScheduler for Frames {
        fn schedule_next_frame(&mut self) {
            self.requested += 1;
        }

        fn cancel(&mut self) {
            self.cancelled += 1;
        }
    }

    fn state(w: i32, h: i32) -> EditorState {
        let mut s = EditorState::new(GridModel::new(w, h), 10.0);
        s.viewport = Viewport {
            width: 800.0,
            height: 600.0,
            device_pixel_ratio: 1.0,
        };
        s
    }

    // ── render ──────────────────────────────────────────────────────

    #[test]
    fn draws_every_visible_cell_once() {
        let s = state(6, 5);
        let mut surface = Recording::default();
        let n = Renderer::default().render(&s, &mut surface);
        assert_eq!(n, 30);
        assert_eq!(surface.polys.len(), 30);
        assert_eq!(surface.clears, 1);
    }

    #[test]
    fn polygons_are_canvas_space_hexagons() {
        let s = state(1, 1);
        let mut surface = Recording::default();
        Renderer::default().render(&s, &mut surface);
        let (points, fill, _) = &surface.polys[0];
        assert_eq!(points.len(), 6);
        assert_eq!(*fill, Rgb::GRAY);
        let center = s.world_to_canvas().apply(cell_center(CellCoord::new(0, 0), s.scale));
        for p in points {
            assert!(((*p - center).length() - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn off_grid_camera_draws_nothing() {
        let mut s = state(10, 10);
        s.camera.position = Vector2::new(-5_000.0, 0.0);
        let mut surface = Recording::default();
        assert_eq!(Renderer::default().render(&s, &mut surface), 0);
        assert_eq!(surface.clears, 1);
    }

    #[test]
    fn zoomed_in_view_draws_subset() {
        let mut s = state(300, 300);
        s.camera.position = Vector2::new(2000.0, 2000.0);
        s.camera.zoom = 0.5;
        let mut surface = Recording::default();
        let n = Renderer::default().render(&s, &mut surface);
        assert!(n > 0 && n < 300 * 300 / 20, "{n}");
    }

    #[test]
    fn highlighted_cell_is_lightened() {
        let mut s = state(2, 1);
        s.highlighted = Some(CellCoord::new(1, 0));
        let mut surface = Recording::default();
        Renderer::default().render(&s, &mut surface);
        let fills: Vec<_> = surface.polys.iter().map(|(_, f, _)| *f).collect();
        assert_eq!(fills, vec![Rgb::GRAY, Rgb::GRAY.lighten(0.2)]);
    }

    #[test]
    fn outline_only_below_zoom_threshold() {
        let mut s = state(2, 2);
        let renderer = Renderer::default();
        let mut surface = Recording::default();

        renderer.render(&s, &mut surface);
        assert!(surface.polys.iter().all(|(_, _, st)| *st == Some(Rgb::BLACK)));

        s.camera.zoom = 3.0;
        renderer.render(&s, &mut surface);
        assert!(surface.polys.iter().all(|(_, _, st)| st.is_none()));
    }

    // ── loop ────────────────────────────────────────────────────────

    #[test]
    fn loop_runs_only_while_attached() {
        let s = state(2, 2);
        let mut renderer = Renderer::default();
        let mut surface = Recording::default();
        let mut frames = Frames::default();

        assert!(!renderer.render_loop(&s, &mut surface, &mut frames, 0.016));
        assert_eq!(surface.clears, 0);

        renderer.attach(&mut frames);
        assert_eq!(frames.requested, 1);
        assert!(renderer.render_loop(&s, &mut surface, &mut frames, 0.016));
        assert_eq!(frames.requested, 2);

        renderer.detach(&mut frames);
        assert!(!renderer.render_loop(&s, &mut surface, &mut frames, 0.016));
        assert_eq!(frames.requested, 2);
        assert_eq!(surface.clears, 1);
    }

    #[test]
    fn attach_and_detach_are_idempotent() {
        let mut renderer = Renderer::default();
        let mut frames = Frames::default();
        renderer.detach(&mut frames);
        assert_eq!(frames.cancelled, 0);

        renderer.attach(&mut frames);
        renderer.attach(&mut frames);
        assert_eq!(frames.requested, 1);

        renderer.detach(&mut frames);
        renderer.detach(&mut frames);
        assert_eq!(frames.cancelled, 1);

        renderer.attach(&mut frames);
        assert!(renderer.is_attached());
        assert_eq!(frames.requested, 2);
    }

    // ── stats ───────────────────────────────────────────────────────

    #[test]
    fn fps_smooths_towards_frame_rate() {
        let mut stats = FrameStats::default();
        assert_eq!(stats.fps(), 0.0);
        stats.record(0.0);
        assert_eq!(stats.frames(), 0);
        for _ in 0..200 {
            stats.record(1.0 / 60.0);
        }
        assert!((stats.fps() - 60.0).abs() < 1e-6);
        stats.record(1.0 / 30.0);
        assert!(stats.fps() < 60.0 && stats.fps() > 30.0);
    }
}
