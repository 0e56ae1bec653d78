use bevy::ecs::system::SystemParam;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use bevy::window::WindowEvent;

use super::input::{EventSource, InputController, ListenerId, PointerEventKind};
use super::render::FrameScheduler;
use super::state::EditorState;

/// Pointer listeners registered by the [`InputController`] on the map viewport.
///
/// Input forwarding only delivers event kinds that currently have a listener.
#[derive(Resource, Debug, Default)]
pub struct ViewportListeners {
    next: u64,
    active: HashMap<ListenerId, PointerEventKind>,
}

impl ViewportListeners {
    /// Whether any listener is registered for `kind`.
    pub fn is_listening(&self, kind: PointerEventKind) -> bool {
        self.active.values().any(|k| *k == kind)
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl EventSource for ViewportListeners {
    fn listen(&mut self, kind: PointerEventKind) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.active.insert(id, kind);
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.active.remove(&id);
    }
}

/// Outstanding frame request for the render loop.
///
/// Set by [`FrameScheduler::schedule_next_frame`], consumed by the draw system.
#[derive(Resource, Debug, Default)]
pub struct FramePacer {
    /// A frame has been requested and not yet drawn.
    pub pending: bool,
}

impl FrameScheduler for FramePacer {
    fn schedule_next_frame(&mut self) {
        self.pending = true;
    }

    fn cancel(&mut self) {
        self.pending = false;
    }
}

/// Screen area left to the map after egui panels are laid out, in logical pixels.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ViewportArea {
    /// Top-left corner.
    pub min: Vec2,
    /// Width and height.
    pub size: Vec2,
    /// Physical pixels per logical pixel.
    pub pixels_per_point: f32,
    /// egui is dragging a widget; the map should not react to presses.
    pub ui_captures_pointer: bool,
}

impl Default for ViewportArea {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            size: Vec2::new(1280.0, 720.0),
            pixels_per_point: 1.0,
            ui_captures_pointer: false,
        }
    }
}

impl ViewportArea {
    /// Whether a window position falls on the map.
    pub fn contains(&self, window_pos: Vec2) -> bool {
        let rel = window_pos - self.min;
        rel.x >= 0.0 && rel.y >= 0.0 && rel.x < self.size.x && rel.y < self.size.y
    }

    /// Window logical position to canvas physical pixels.
    pub fn to_canvas(self, window_pos: Vec2) -> Vec2 {
        (window_pos - self.min) * self.pixels_per_point
    }
}

/// File operations requested from the sidebar.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFileRequest {
    /// Write the grid as JSON to the save path.
    Save,
    /// Merge the JSON at the save path into the grid.
    Load,
    /// Write an SVG picture of the grid.
    ExportSvg,
}

/// Raw window messages plus the modifier keys needed to translate them.
#[derive(SystemParam)]
pub struct PointerInput<'w, 's> {
    /// Window events in arrival order; cursor, button, wheel and leave are interleaved.
    pub events: MessageReader<'w, 's, WindowEvent>,
    /// Modifier keys.
    pub keys: Res<'w, ButtonInput<KeyCode>>,
}

/// Controller, the state it drives, and the listener registry gating delivery.
#[derive(SystemParam)]
pub struct EditorCore<'w> {
    /// Pointer state machine.
    pub controller: ResMut<'w, InputController>,
    /// Session state.
    pub state: ResMut<'w, EditorState>,
    /// Registered listeners.
    pub listeners: Res<'w, ViewportListeners>,
    /// Map placement on screen.
    pub area: Res<'w, ViewportArea>,
}
