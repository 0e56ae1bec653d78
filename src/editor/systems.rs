use bevy::ecs::system::SystemParam;
use bevy::input::mouse::{MouseButton, MouseScrollUnit};
use bevy::prelude::*;
use bevy::window::{RequestRedraw, WindowEvent, WindowOccluded};
use bevy_egui::{EguiContexts, egui};

use super::EditorConfig;
use super::entities::{
    EditorCore, FramePacer, MapFileRequest, PointerInput, ViewportArea, ViewportListeners,
};
use super::input::{InputController, PointerButton, PointerEvent};
use super::render::{Renderer, Surface};
use super::state::{EditorState, Viewport};
use super::tools::{BucketMode, ToolKind};
use crate::grid::{MAX_DIMENSION, export_svg, load_map, save_map};
use crate::math::{Rgb, Vector2};

/// Pixels per wheel "line", matching browser wheel deltas.
const LINE_HEIGHT_PX: f32 = 40.0;

// ── Startup ────────────────────────────────────────────────────────

/// Camera for the egui pass; the map itself is painted by egui.
pub fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Merges the configured JSON map into the grid, if one was given.
pub fn import_map(cfg: Res<EditorConfig>, mut state: ResMut<EditorState>) {
    let Some(path) = &cfg.files.import else {
        return;
    };
    match load_map(path) {
        Ok(data) => {
            state.grid.deserialize(&data);
            let scale = state.scale;
            state.camera.position = state.grid.extent(scale) / 2.0;
            info!(
                "Imported {}x{} map from {}",
                data.width,
                data.height,
                path.display()
            );
        }
        Err(err) => error!("Map import failed: {err}"),
    }
}

/// Registers pointer listeners and starts the render loop.
pub fn attach_editor(
    mut controller: ResMut<InputController>,
    mut listeners: ResMut<ViewportListeners>,
    mut renderer: ResMut<Renderer>,
    mut pacer: ResMut<FramePacer>,
) {
    controller.attach(&mut *listeners);
    renderer.attach(&mut *pacer);
    info!("Editor attached ({} pointer listeners)", listeners.len());
}

// ── Input ──────────────────────────────────────────────────────────

/// Stops the map reacting to the pointer while the inspector is open.
pub fn detach_input(
    mut controller: ResMut<InputController>,
    mut listeners: ResMut<ViewportListeners>,
) {
    controller.detach(&mut *listeners);
    debug!("Pointer input detached");
}

/// Re-registers pointer listeners after the inspector closes.
pub fn attach_input(
    mut controller: ResMut<InputController>,
    mut listeners: ResMut<ViewportListeners>,
) {
    controller.attach(&mut *listeners);
    debug!("Pointer input attached");
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Right => PointerButton::Right,
        _ => PointerButton::Other,
    }
}

/// Browser-style vertical delta: positive scrolls down.
fn wheel_delta_y(unit: MouseScrollUnit, y: f32) -> f64 {
    let y = match unit {
        MouseScrollUnit::Line => y * LINE_HEIGHT_PX,
        MouseScrollUnit::Pixel => y,
    };
    -f64::from(y)
}

/// Last cursor position seen in the window event stream.
///
/// Presses carry no position of their own, so `Down` uses the most recent
/// `CursorMoved` that preceded it.
#[derive(Debug, Default)]
pub struct PointerTracker {
    cursor: Option<Vec2>,
}

impl PointerTracker {
    fn over_map(&self, area: &ViewportArea) -> bool {
        !area.ui_captures_pointer && self.cursor.is_some_and(|p| area.contains(p))
    }

    /// Maps one window event onto the map surface. Non-pointer events yield `None`.
    fn translate(
        &mut self,
        event: &WindowEvent,
        area: &ViewportArea,
        modifier: bool,
    ) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved(ev) => {
                self.cursor = Some(ev.position);
                if area.contains(ev.position) {
                    Some(PointerEvent::Move {
                        position: area.to_canvas(ev.position).as_dvec2(),
                        delta: ev.delta.unwrap_or(Vec2::ZERO).as_dvec2(),
                    })
                } else {
                    Some(PointerEvent::Leave)
                }
            }
            WindowEvent::CursorLeft(_) => {
                self.cursor = None;
                Some(PointerEvent::Leave)
            }
            WindowEvent::MouseButtonInput(ev) => {
                let button = pointer_button(ev.button);
                if !ev.state.is_pressed() {
                    return Some(PointerEvent::Up { button });
                }
                if !self.over_map(area) {
                    return None;
                }
                let pos = self.cursor?;
                Some(PointerEvent::Down {
                    button,
                    position: area.to_canvas(pos).as_dvec2(),
                    modifier,
                })
            }
            WindowEvent::MouseWheel(ev) => self.over_map(area).then(|| PointerEvent::Wheel {
                delta_y: wheel_delta_y(ev.unit, ev.y),
            }),
            _ => None,
        }
    }
}

/// Translates window pointer messages, in the order they arrived, into
/// [`PointerEvent`]s on the map and hands those with a registered listener to
/// the controller.
///
/// Leaving the map area counts as leaving the surface.
pub fn forward_pointer_input(
    mut input: PointerInput,
    mut tracker: Local<PointerTracker>,
    mut core: EditorCore,
) {
    let area = *core.area;
    let modifier = input
        .keys
        .any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    for ev in input.events.read() {
        let Some(event) = tracker.translate(ev, &area, modifier) else {
            continue;
        };
        if core.listeners.is_listening(event.kind()) {
            core.controller.handle(&mut core.state, event);
        }
    }
}

/// B selects the brush, G the bucket, F toggles flood / global fill.
pub fn select_tool_hotkeys(keys: Res<ButtonInput<KeyCode>>, mut state: ResMut<EditorState>) {
    let toolbox = &mut state.toolbox;
    if keys.just_pressed(KeyCode::KeyB) {
        toolbox.selected = ToolKind::Paintbrush;
        debug!("Tool: paintbrush");
    }
    if keys.just_pressed(KeyCode::KeyG) {
        toolbox.selected = ToolKind::PaintBucket;
        debug!("Tool: paint bucket");
    }
    if keys.just_pressed(KeyCode::KeyF) {
        let bucket = &mut toolbox.paint_bucket;
        bucket.mode = match bucket.mode {
            BucketMode::Flood => BucketMode::Global,
            BucketMode::Global => BucketMode::Flood,
        };
        debug!("Bucket mode: {:?}", bucket.mode);
    }
}

/// Executes sidebar save / load / export requests against the configured paths.
pub fn handle_map_file_requests(
    mut requests: MessageReader<MapFileRequest>,
    mut state: ResMut<EditorState>,
    cfg: Res<EditorConfig>,
) {
    let files = &cfg.files;
    for request in requests.read() {
        let result = match request {
            MapFileRequest::Save => save_map(&files.save_path, &state.grid).map(|_| &files.save_path),
            MapFileRequest::Load => load_map(&files.save_path).map(|data| {
                state.grid.deserialize(&data);
                &files.save_path
            }),
            MapFileRequest::ExportSvg => {
                export_svg(&files.svg_path, &state.grid, state.scale).map(|_| &files.svg_path)
            }
        };
        match result {
            Ok(path) => info!("{request:?}: {}", path.display()),
            Err(err) => error!("{request:?} failed: {err}"),
        }
    }
}

// ── Frame loop ─────────────────────────────────────────────────────

/// Halts the render loop while the window is hidden and restarts it when shown.
pub fn pause_when_occluded(
    mut occluded: MessageReader<WindowOccluded>,
    mut renderer: ResMut<Renderer>,
    mut pacer: ResMut<FramePacer>,
) {
    let Some(last) = occluded.read().last() else {
        return;
    };
    if last.occluded {
        renderer.detach(&mut *pacer);
        info!("Window occluded, render loop stopped");
    } else {
        renderer.attach(&mut *pacer);
        info!("Window visible, render loop restarted");
    }
}

/// Keeps the reactive winit loop ticking while a frame is requested.
pub fn request_frames(pacer: Res<FramePacer>, mut redraw: MessageWriter<RequestRedraw>) {
    if pacer.pending {
        redraw.write(RequestRedraw);
    }
}

// ── egui ───────────────────────────────────────────────────────────

fn color32(c: Rgb) -> egui::Color32 {
    let [r, g, b] = c.to_bytes();
    egui::Color32::from_rgb(r, g, b)
}

/// Paints canvas-pixel polygons into an egui rect.
struct EguiSurface {
    painter: egui::Painter,
    pixels_per_point: f32,
    background: egui::Color32,
}

impl EguiSurface {
    fn to_screen(&self, p: Vector2) -> egui::Pos2 {
        let origin = self.painter.clip_rect().min;
        let p = p.as_vec2() / self.pixels_per_point;
        egui::pos2(origin.x + p.x, origin.y + p.y)
    }
}

impl Surface for EguiSurface {
    fn clear(&mut self) {
        self.painter
            .rect_filled(self.painter.clip_rect(), 0.0, self.background);
    }

    fn fill_polygon(&mut self, points: &[Vector2], fill: Rgb, stroke: Option<Rgb>) {
        let points = points.iter().map(|p| self.to_screen(*p)).collect();
        let stroke = stroke.map_or(egui::Stroke::NONE, |c| egui::Stroke::new(1.0, color32(c)));
        self.painter
            .add(egui::Shape::convex_polygon(points, color32(fill), stroke));
    }
}

/// Everything the map pass reads or updates.
#[derive(SystemParam)]
pub struct MapFrame<'w> {
    state: ResMut<'w, EditorState>,
    renderer: ResMut<'w, Renderer>,
    pacer: ResMut<'w, FramePacer>,
    area: ResMut<'w, ViewportArea>,
    cfg: Res<'w, EditorConfig>,
    time: Res<'w, Time>,
}

/// Lays out the map area, syncs the viewport, and runs one render-loop step
/// when a frame is pending.
pub fn draw_map(mut contexts: EguiContexts, mut frame: MapFrame) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let ppp = ctx.pixels_per_point();
    let over_popup = ctx
        .pointer_hover_pos()
        .and_then(|p| ctx.layer_id_at(p))
        .is_some_and(|layer| layer.order != egui::Order::Background);
    let ui_captures_pointer = ctx.is_using_pointer() || over_popup;

    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let rect = ui.max_rect();
            *frame.area = ViewportArea {
                min: Vec2::new(rect.min.x, rect.min.y),
                size: Vec2::new(rect.width(), rect.height()),
                pixels_per_point: ppp,
                ui_captures_pointer,
            };
            frame.state.viewport = Viewport {
                width: f64::from(rect.width() * ppp),
                height: f64::from(rect.height() * ppp),
                device_pixel_ratio: f64::from(ppp),
            };

            if !frame.pacer.pending {
                return;
            }
            frame.pacer.pending = false;
            let mut surface = EguiSurface {
                painter: ui.painter_at(rect),
                pixels_per_point: ppp,
                background: color32(frame.cfg.render.clear_color),
            };
            let delta = frame.time.delta_secs_f64();
            frame
                .renderer
                .render_loop(&frame.state, &mut surface, &mut *frame.pacer, delta);
        });
}

/// Tool sidebar and status footer. Must run before [`draw_map`] so the map
/// gets the remaining space.
pub fn draw_sidebar(
    mut contexts: EguiContexts,
    mut state: ResMut<EditorState>,
    renderer: Res<Renderer>,
    mut requests: MessageWriter<MapFileRequest>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::SidePanel::left("editor_tools")
        .resizable(false)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Tools");
            let toolbox = &mut state.toolbox;
            ui.horizontal(|ui| {
                ui.selectable_value(&mut toolbox.selected, ToolKind::Paintbrush, "Brush (B)");
                ui.selectable_value(&mut toolbox.selected, ToolKind::PaintBucket, "Bucket (G)");
            });

            let color = match toolbox.selected {
                ToolKind::Paintbrush => &mut toolbox.paintbrush.color,
                ToolKind::PaintBucket => &mut toolbox.paint_bucket.color,
            };
            let mut rgb = color.to_array();
            ui.horizontal(|ui| {
                ui.label("Colour");
                if egui::color_picker::color_edit_button_rgb(ui, &mut rgb).changed() {
                    *color = Rgb::from(rgb);
                }
                ui.monospace(color.to_hex(true));
            });

            if toolbox.selected == ToolKind::PaintBucket {
                let mode = &mut toolbox.paint_bucket.mode;
                ui.radio_value(mode, BucketMode::Flood, "Flood region");
                ui.radio_value(mode, BucketMode::Global, "Replace everywhere (F)");
            }

            ui.separator();
            ui.heading("Grid");
            let (mut w, mut h) = (state.grid.width(), state.grid.height());
            let changed = ui
                .horizontal(|ui| {
                    let dim = 1..=MAX_DIMENSION;
                    ui.add(egui::DragValue::new(&mut w).range(dim.clone()).prefix("w "))
                        .changed()
                        | ui.add(egui::DragValue::new(&mut h).range(dim).prefix("h "))
                            .changed()
                })
                .inner;
            if changed {
                state.grid.resize(w, h);
                info!("Grid resized to {w}x{h}");
            }

            ui.separator();
            ui.heading("View");
            ui.label(format!("zoom {:.3}", state.camera.zoom));
            if ui.button("Centre on grid").clicked() {
                let scale = state.scale;
                state.camera.position = state.grid.extent(scale) / 2.0;
                state.camera.zoom = 1.0;
            }

            ui.separator();
            ui.heading("File");
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    requests.write(MapFileRequest::Save);
                }
                if ui.button("Load").clicked() {
                    requests.write(MapFileRequest::Load);
                }
                if ui.button("Export SVG").clicked() {
                    requests.write(MapFileRequest::ExportSvg);
                }
            });
        });

    egui::TopBottomPanel::bottom("editor_footer").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("{:.0} fps", renderer.stats.fps()));
            ui.separator();
            let range = state.culling_range();
            ui.label(format!("{} cells drawn", range.len()));
            ui.separator();
            match state.highlighted_cell() {
                Some(cell) => ui.label(format!(
                    "({}, {}) {}",
                    cell.x(),
                    cell.y(),
                    cell.color.to_hex(true)
                )),
                None => ui.label("-"),
            };
        });
    });
}
