//! Hex cell grid: storage, cell ↔ position math, persistence and SVG export.
//!
//! Columns are indexed by `x`, rows within a column by `y`; odd columns sit
//! half a cell lower than even ones. Cell identity is the `(x, y)` pair and
//! never changes, only the colour does.

mod model;
mod persist;
mod svg;

pub use model::{
    Cell, CellCoord, GridModel, MAX_DIMENSION, cell_center, column_pitch, coords_at_position,
    hex_corners, row_pitch,
};
pub use persist::{CellData, MapData, MapIoError, load_map, save_map};
pub use svg::{export_svg, render_svg};
