use std::f64::consts::FRAC_PI_3;

use bevy::math::Vec2;
use hexx::{HexLayout, HexOrientation};

use crate::math::{Rgb, Vector2};

/// Integer column/row address of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellCoord {
    /// Column.
    pub x: i32,
    /// Row within the column.
    pub y: i32,
}

impl CellCoord {
    /// Shorthand constructor.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `true` for columns shifted half a cell down.
    pub fn is_odd_column(&self) -> bool {
        self.x.rem_euclid(2) == 1
    }

    /// The six adjacent coordinates, possibly outside any grid.
    ///
    /// Adjacency depends on column parity because odd columns are offset.
    pub fn neighbors(&self) -> [CellCoord; 6] {
        let Self { x, y } = *self;
        let c = CellCoord::new;
        if self.is_odd_column() {
            [
                c(x, y - 1),
                c(x - 1, y),
                c(x + 1, y),
                c(x - 1, y + 1),
                c(x, y + 1),
                c(x + 1, y + 1),
            ]
        } else {
            [
                c(x - 1, y - 1),
                c(x, y - 1),
                c(x + 1, y - 1),
                c(x - 1, y),
                c(x + 1, y),
                c(x, y + 1),
            ]
        }
    }
}

/// A single hexagonal cell. Its coordinate is fixed at creation.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    coord: CellCoord,
    /// Current fill colour.
    pub color: Rgb,
}

impl Cell {
    fn new(x: i32, y: i32, color: Rgb) -> Self {
        Self {
            coord: CellCoord::new(x, y),
            color,
        }
    }

    /// Column index.
    pub fn x(&self) -> i32 {
        self.coord.x
    }

    /// Row index.
    pub fn y(&self) -> i32 {
        self.coord.y
    }

    /// Full coordinate.
    pub fn coord(&self) -> CellCoord {
        self.coord
    }
}

// ── Geometry ────────────────────────────────────────────────────────

/// Horizontal distance between adjacent column centres: `r(1 + cos 60°)`.
pub fn column_pitch(radius: f64) -> f64 {
    radius * (1.0 + FRAC_PI_3.cos())
}

/// Full hex height, also the vertical distance between rows: `2r sin 60°`.
pub fn row_pitch(radius: f64) -> f64 {
    2.0 * radius * FRAC_PI_3.sin()
}

/// Rendering-space centre of `coord` for hexes of the given radius.
///
/// Even columns start half a row down, odd columns a full row down.
pub fn cell_center(coord: CellCoord, radius: f64) -> Vector2 {
    let h = row_pitch(radius);
    let y0 = if coord.is_odd_column() { h } else { h / 2.0 };
    Vector2::new(
        column_pitch(radius) * coord.x as f64 + radius,
        h * coord.y as f64 + y0,
    )
}

/// Corner offsets of a flat-topped hexagon of the given radius, in order around the centre.
pub fn hex_corners(radius: f64) -> [Vector2; 6] {
    let layout = HexLayout {
        orientation: HexOrientation::Flat,
        scale: Vec2::splat(1.0),
        ..Default::default()
    };
    let unit = layout.center_aligned_hex_corners();
    std::array::from_fn(|i| unit[i].as_dvec2() * radius)
}

/// Maps a normalized point (hex radius 1) to the coordinate of the cell containing it.
///
/// Floors throughout (never truncates), so points left of or above the grid
/// yield negative coordinates instead of snapping to zero.
pub fn coords_at_position(pos: Vector2) -> CellCoord {
    let h = FRAC_PI_3.sin();
    let r = pos - Vector2::new(0.0, h);
    let a = r.x;
    let b = r.y / 3f64.sqrt();
    let u = (a + b).floor();
    let v = (a - b).floor();
    let i = ((u + v) / 3.0).floor();
    let k = (pos.y / h).floor() - (i % 2.0).floor();
    let j = (k / 2.0).floor();
    CellCoord::new(i as i32, j as i32)
}

// ── GridModel ───────────────────────────────────────────────────────

/// Largest width or height accepted from map files and the sidebar.
pub const MAX_DIMENSION: i32 = 2000;

/// Owns every cell of the map, stored column-major as `cells[x][y]`.
///
/// Invariant: `cells.len() == width` and every column has `height` cells,
/// each carrying its own `(x, y)`.
#[derive(Clone, Debug)]
pub struct GridModel {
    width: i32,
    height: i32,
    default_color: Rgb,
    cells: Vec<Vec<Cell>>,
}

impl GridModel {
    /// A `width × height` grid of gray cells. Dimensions are clamped to at least 1.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_color(width, height, Rgb::GRAY)
    }

    /// A grid whose cells (including ones added by later resizes) start as `default_color`.
    pub fn with_color(width: i32, height: i32, default_color: Rgb) -> Self {
        let mut grid = Self {
            width: 0,
            height: 0,
            default_color,
            cells: Vec::new(),
        };
        grid.resize(width, height);
        grid
    }

    /// Number of columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Colour given to newly created cells.
    pub fn default_color(&self) -> Rgb {
        self.default_color
    }

    /// Whether `coord` lies in `[0, width) × [0, height)`.
    pub fn contains(&self, coord: CellCoord) -> bool {
        (0..self.width).contains(&coord.x) && (0..self.height).contains(&coord.y)
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cell(CellCoord::new(x, y))
    }

    /// Mutable cell at `(x, y)`, or `None` outside the grid.
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.cell_mut(CellCoord::new(x, y))
    }

    /// Cell at `coord`, or `None` outside the grid.
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        if !self.contains(coord) {
            return None;
        }
        self.cells
            .get(coord.x as usize)
            .and_then(|col| col.get(coord.y as usize))
    }

    /// Mutable cell at `coord`, or `None` outside the grid.
    pub fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut Cell> {
        if !self.contains(coord) {
            return None;
        }
        self.cells
            .get_mut(coord.x as usize)
            .and_then(|col| col.get_mut(coord.y as usize))
    }

    /// Cell under a rendering-space point for hexes of radius `scale`.
    pub fn cell_at_position(&self, pos: Vector2, scale: f64) -> Option<&Cell> {
        self.cell(coords_at_position(pos / scale))
    }

    /// Rendering-space size of the tight box around every cell for hexes of `radius`.
    pub fn extent(&self, radius: f64) -> Vector2 {
        let h = row_pitch(radius);
        let stagger = if self.width > 1 { h / 2.0 } else { 0.0 };
        Vector2::new(
            column_pitch(radius) * (self.width - 1) as f64 + 2.0 * radius,
            h * self.height as f64 + stagger,
        )
    }

    /// Grows or truncates the grid in place.
    ///
    /// Cells still in range keep their colour; new slots get the default colour.
    /// Non-positive dimensions are clamped to 1.
    pub fn resize(&mut self, width: i32, height: i32) {
        let width = width.max(1);
        let height = height.max(1);
        let default_color = self.default_color;

        self.cells.truncate(width as usize);
        for (x, column) in self.cells.iter_mut().enumerate() {
            column.truncate(height as usize);
            let start = column.len() as i32;
            column.extend((start..height).map(|y| Cell::new(x as i32, y, default_color)));
        }
        for x in self.cells.len() as i32..width {
            self.cells
                .push((0..height).map(|y| Cell::new(x, y, default_color)).collect());
        }

        self.width = width;
        self.height = height;
    }

    /// Every cell, column by column.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    /// Every cell mutably, column by column.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut().flatten()
    }
}
