#![warn(missing_docs)]
//! Hex-grid paint editor.
//!
//! Pan and zoom a camera over a grid of flat-topped hexagons and paint cells
//! with a brush or a flood / global bucket. Maps persist as JSON and export
//! to SVG.

pub mod editor;
pub mod grid;
pub mod math;

use bevy::prelude::*;

/// Application-wide mode, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum EditorMode {
    /// Map receives pointer input.
    #[default]
    Editing,
    /// World inspector open (Tab to toggle); the map ignores the pointer.
    Inspecting,
}
