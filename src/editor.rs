//! Interactive editing: session state, paint tools, pointer controller and
//! the grid renderer, plus the plugin wiring them into the app.
//!
//! The core types ([`EditorState`], [`InputController`], [`Renderer`],
//! [`Toolbox`]) are plain Rust and know nothing about windows; `systems`
//! feeds them Bevy input and draws through an egui painter.

mod entities;
pub mod input;
pub mod render;
pub mod state;
mod systems;
pub mod tools;

use std::path::PathBuf;

use bevy::prelude::*;

pub use entities::{FramePacer, MapFileRequest, ViewportArea, ViewportListeners};
pub use input::{InputController, InputTuning, InteractionMode, PointerEvent};
pub use render::{FrameStats, RenderStyle, Renderer};
pub use state::{CullingRange, EditorState, Viewport};
pub use tools::{BucketMode, PaintBucket, Paintbrush, Tool, ToolKind, Toolbox};

use crate::EditorMode;
use crate::grid::GridModel;
use crate::math::Rgb;

/// Nested configuration for the editor.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct EditorConfig {
    /// Initial grid layout.
    pub grid: GridSettings,
    /// Pan / zoom feel.
    pub controls: ControlSettings,
    /// Drawing constants.
    pub render: RenderSettings,
    /// Map file locations.
    pub files: FileSettings,
}

/// Grid dimensions and cell appearance.
#[derive(Clone, Debug, Reflect)]
pub struct GridSettings {
    /// Columns.
    pub width: i32,
    /// Rows per column.
    pub height: i32,
    /// Cell radius in world units.
    pub cell_radius: f64,
    /// Colour of unpainted cells.
    pub default_color: Rgb,
}

/// Pointer tuning.
#[derive(Clone, Debug, Reflect)]
pub struct ControlSettings {
    /// Larger values pan slower.
    pub pan_speed_factor: f64,
    /// Relative zoom per wheel notch.
    pub zoom_step: f64,
    /// Wheel zoom lower bound.
    pub min_zoom: f64,
    /// Wheel zoom upper bound.
    pub max_zoom: f64,
}

/// Grid drawing.
#[derive(Clone, Debug, Reflect)]
pub struct RenderSettings {
    /// Lighten factor for the hovered cell.
    pub highlight_lighten: f32,
    /// Outlines are drawn while the camera zoom is below this.
    pub outline_zoom_threshold: f64,
    /// Outline colour.
    pub outline_color: Rgb,
    /// Background behind the grid.
    pub clear_color: Rgb,
}

/// Where maps are read from and written to.
#[derive(Clone, Debug, Default, Reflect)]
pub struct FileSettings {
    /// JSON map loaded at startup, if any.
    #[reflect(ignore)]
    pub import: Option<PathBuf>,
    /// Target of "Save".
    #[reflect(ignore)]
    pub save_path: PathBuf,
    /// Target of "Export SVG".
    #[reflect(ignore)]
    pub svg_path: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings {
                width: 100,
                height: 100,
                cell_radius: 10.0,
                default_color: Rgb::GRAY,
            },
            controls: ControlSettings {
                pan_speed_factor: 2.0,
                zoom_step: 1.0 / 16.0,
                min_zoom: 0.05,
                max_zoom: 50.0,
            },
            render: RenderSettings {
                highlight_lighten: 0.2,
                outline_zoom_threshold: 2.5,
                outline_color: Rgb::BLACK,
                clear_color: Rgb::new(0.12, 0.12, 0.14),
            },
            files: FileSettings {
                import: None,
                save_path: PathBuf::from("map.json"),
                svg_path: PathBuf::from("map.svg"),
            },
        }
    }
}

impl EditorConfig {
    /// Fresh editing session sized from [`GridSettings`], camera centred on the grid.
    pub fn initial_state(&self) -> EditorState {
        let g = &self.grid;
        let grid = GridModel::with_color(g.width, g.height, g.default_color);
        let mut state = EditorState::new(grid, g.cell_radius);
        state.camera.position = state.grid.extent(g.cell_radius) / 2.0;
        state
    }

    /// Controller tuning derived from [`ControlSettings`].
    pub fn input_tuning(&self) -> InputTuning {
        InputTuning {
            pan_speed_factor: self.controls.pan_speed_factor,
            zoom_step: self.controls.zoom_step,
            min_zoom: self.controls.min_zoom,
            max_zoom: self.controls.max_zoom,
        }
    }

    /// Renderer style derived from [`RenderSettings`].
    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            highlight_lighten: self.render.highlight_lighten,
            outline_zoom_threshold: self.render.outline_zoom_threshold,
            outline_color: self.render.outline_color,
        }
    }
}

/// Hex paint editor: state, input forwarding, grid drawing and the tool sidebar.
pub struct EditorPlugin(pub EditorConfig);

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        let cfg = &self.0;
        let [r, g, b] = cfg.render.clear_color.to_array();

        app.register_type::<EditorConfig>()
            .register_type::<Toolbox>()
            .insert_resource(cfg.clone())
            .insert_resource(ClearColor(Color::srgb(r, g, b)))
            .insert_resource(cfg.initial_state())
            .insert_resource(InputController::new(cfg.input_tuning()))
            .insert_resource(Renderer::new(cfg.render_style()))
            .init_resource::<ViewportListeners>()
            .init_resource::<FramePacer>()
            .init_resource::<ViewportArea>()
            .add_message::<MapFileRequest>()
            .add_systems(
                Startup,
                (systems::spawn_camera, systems::import_map, systems::attach_editor).chain(),
            )
            .add_systems(
                Update,
                (
                    systems::forward_pointer_input,
                    systems::select_tool_hotkeys,
                    systems::handle_map_file_requests,
                    systems::pause_when_occluded,
                    systems::request_frames,
                )
                    .chain(),
            )
            .add_systems(OnEnter(EditorMode::Inspecting), systems::detach_input)
            .add_systems(OnExit(EditorMode::Inspecting), systems::attach_input)
            .add_systems(
                bevy_egui::EguiPrimaryContextPass,
                (systems::draw_sidebar, systems::draw_map).chain(),
            );
    }
}
