//! Pointer/wheel state machine driving camera motion and tool application.
//!
//! The host translates its native events into [`PointerEvent`]s and forwards
//! them to [`InputController::handle`]. All handling is synchronous.

use bevy::prelude::Resource;

use super::state::EditorState;
use crate::math::Vector2;

/// Mouse button identity, reduced to what the editor distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Anything else.
    Other,
}

/// Kinds of listener the controller registers on its event source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button presses.
    Down,
    /// Button releases.
    Up,
    /// Pointer motion.
    Move,
    /// Pointer leaving the surface.
    Leave,
    /// Scroll wheel.
    Wheel,
}

impl PointerEventKind {
    /// Every kind, in registration order.
    pub const ALL: [PointerEventKind; 5] = [
        PointerEventKind::Down,
        PointerEventKind::Up,
        PointerEventKind::Move,
        PointerEventKind::Leave,
        PointerEventKind::Wheel,
    ];
}

/// Platform-independent pointer input; positions are canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// A button went down at `position`; `modifier` is the pan modifier (shift).
    Down {
        /// Which button.
        button: PointerButton,
        /// Canvas-space position.
        position: Vector2,
        /// Whether the pan modifier key is held.
        modifier: bool,
    },
    /// A button was released.
    Up {
        /// Which button.
        button: PointerButton,
    },
    /// The pointer moved to `position`; `delta` is the motion in logical pixels.
    Move {
        /// Canvas-space position.
        position: Vector2,
        /// Motion since the previous event, in logical (CSS-like) pixels.
        delta: Vector2,
    },
    /// The pointer left the surface.
    Leave,
    /// Scroll wheel; negative `delta_y` scrolls up (zoom in).
    Wheel {
        /// Vertical scroll amount.
        delta_y: f64,
    },
}

impl PointerEvent {
    /// Listener kind that receives this event.
    pub fn kind(&self) -> PointerEventKind {
        match self {
            PointerEvent::Down { .. } => PointerEventKind::Down,
            PointerEvent::Up { .. } => PointerEventKind::Up,
            PointerEvent::Move { .. } => PointerEventKind::Move,
            PointerEvent::Leave => PointerEventKind::Leave,
            PointerEvent::Wheel { .. } => PointerEventKind::Wheel,
        }
    }
}

/// Opaque handle returned by [`EventSource::listen`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Something pointer listeners can be registered on (a window, a canvas, a test double).
pub trait EventSource {
    /// Registers interest in `kind`.
    fn listen(&mut self, kind: PointerEventKind) -> ListenerId;
    /// Removes a listener previously returned by [`EventSource::listen`].
    fn unlisten(&mut self, id: ListenerId);
}

/// Interaction state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
    /// Hovering only.
    #[default]
    Idle,
    /// Dragging the camera.
    Panning,
    /// Dragging with the active tool.
    Painting,
}

/// Empirically tuned feel constants for panning and zooming.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputTuning {
    /// Pan divisor is `pan_speed_factor * device_pixel_ratio / zoom`.
    pub pan_speed_factor: f64,
    /// Relative zoom change per wheel notch.
    pub zoom_step: f64,
    /// Smallest camera zoom the wheel can reach (most magnified).
    pub min_zoom: f64,
    /// Largest camera zoom the wheel can reach (most world on screen).
    pub max_zoom: f64,
}

impl Default for InputTuning {
    fn default() -> Self {
        Self {
            pan_speed_factor: 2.0,
            zoom_step: 1.0 / 16.0,
            min_zoom: 0.05,
            max_zoom: 50.0,
        }
    }
}

/// Turns pointer events into camera motion and tool application.
#[derive(Resource, Debug, Default)]
pub struct InputController {
    mode: InteractionMode,
    listeners: Vec<ListenerId>,
    attached: bool,
    /// Pan / zoom constants.
    pub tuning: InputTuning,
}

impl InputController {
    /// Detached, idle controller.
    pub fn new(tuning: InputTuning) -> Self {
        Self {
            tuning,
            ..Default::default()
        }
    }

    /// Current interaction state.
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Whether listeners are registered.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Registers one listener per event kind. Calling it again while attached does nothing.
    pub fn attach(&mut self, source: &mut impl EventSource) {
        if self.attached {
            return;
        }
        self.listeners = PointerEventKind::ALL
            .iter()
            .map(|&kind| source.listen(kind))
            .collect();
        self.attached = true;
    }

    /// Removes every registered listener exactly once and returns to idle.
    ///
    /// Safe to call any number of times.
    pub fn detach(&mut self, source: &mut impl EventSource) {
        for id in self.listeners.drain(..) {
            source.unlisten(id);
        }
        self.attached = false;
        self.mode = InteractionMode::Idle;
    }

    /// Screen-pixel to world-unit divisor used while panning.
    pub fn zoom_factor(&self, state: &EditorState) -> f64 {
        self.tuning.pan_speed_factor * state.viewport.device_pixel_ratio / state.camera.zoom
    }

    /// Processes one event. Ignored while detached.
    pub fn handle(&mut self, state: &mut EditorState, event: PointerEvent) {
        if !self.attached {
            return;
        }
        match event {
            PointerEvent::Down {
                button,
                position,
                modifier,
            } => match button {
                PointerButton::Middle => self.mode = InteractionMode::Panning,
                PointerButton::Left if modifier => self.mode = InteractionMode::Panning,
                PointerButton::Left => {
                    self.mode = InteractionMode::Painting;
                    state.update_cursor(position);
                    state.apply_tool();
                }
                PointerButton::Right | PointerButton::Other => {}
            },
            PointerEvent::Move { position, delta } => match self.mode {
                InteractionMode::Panning => {
                    let factor = self.zoom_factor(state);
                    state.camera.position -= delta / factor;
                }
                InteractionMode::Painting => {
                    state.update_cursor(position);
                    state.apply_tool();
                }
                InteractionMode::Idle => state.update_cursor(position),
            },
            PointerEvent::Up {
                button: PointerButton::Left | PointerButton::Middle,
            }
            | PointerEvent::Leave => self.mode = InteractionMode::Idle,
            PointerEvent::Up { .. } => {}
            PointerEvent::Wheel { delta_y } => {
                let step = self.tuning.zoom_step;
                let zoom = if delta_y < 0.0 {
                    state.camera.zoom * (1.0 - step)
                } else {
                    state.camera.zoom * (1.0 + step)
                };
                state.camera.zoom = zoom.clamp(self.tuning.min_zoom, self.tuning.max_zoom);
            }
        }
    }
}
