//! Paint tools. Each tool recolours cells starting from a target coordinate
//! and reports how many cells it changed.

use std::collections::VecDeque;

use bevy::platform::collections::HashSet;
use bevy::reflect::Reflect;

use crate::grid::{CellCoord, GridModel};
use crate::math::Rgb;

/// A grid-mutating operation triggered at the highlighted cell.
pub trait Tool {
    /// Applies the tool at `target`; returns the number of recoloured cells.
    fn apply(&self, grid: &mut GridModel, target: CellCoord) -> usize;
}

/// Sets the target cell to a single colour.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct Paintbrush {
    /// Paint colour.
    pub color: Rgb,
}

impl Default for Paintbrush {
    fn default() -> Self {
        Self { color: Rgb::GRAY }
    }
}

impl Tool for Paintbrush {
    fn apply(&self, grid: &mut GridModel, target: CellCoord) -> usize {
        match grid.cell_mut(target) {
            Some(cell) if cell.color != self.color => {
                cell.color = self.color;
                1
            }
            _ => 0,
        }
    }
}

/// How the paint bucket chooses which cells to recolour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum BucketMode {
    /// Connected region sharing the seed colour.
    #[default]
    Flood,
    /// Every cell sharing the seed colour, connected or not.
    Global,
}

/// Region or global colour replacement.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct PaintBucket {
    /// Replacement colour.
    pub color: Rgb,
    /// Fill strategy.
    pub mode: BucketMode,
}

impl Default for PaintBucket {
    fn default() -> Self {
        Self {
            color: Rgb::GRAY,
            mode: BucketMode::Flood,
        }
    }
}

impl PaintBucket {
    /// Breadth-first fill over hex neighbours whose colour equals `old`.
    ///
    /// Each coordinate is enqueued at most once, so every cell is recoloured at most once.
    fn flood_fill(&self, grid: &mut GridModel, seed: CellCoord, old: Rgb) -> usize {
        let mut queue = VecDeque::from([seed]);
        let mut seen: HashSet<CellCoord> = HashSet::default();
        seen.insert(seed);
        let mut recolored = 0;

        while let Some(coord) = queue.pop_front() {
            let Some(cell) = grid.cell_mut(coord) else {
                continue;
            };
            if cell.color != old {
                continue;
            }
            cell.color = self.color;
            recolored += 1;

            for next in coord.neighbors() {
                if grid.contains(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        recolored
    }

    fn global_replace(&self, grid: &mut GridModel, old: Rgb) -> usize {
        let mut recolored = 0;
        for cell in grid.iter_mut().filter(|c| c.color == old) {
            cell.color = self.color;
            recolored += 1;
        }
        recolored
    }
}

impl Tool for PaintBucket {
    fn apply(&self, grid: &mut GridModel, target: CellCoord) -> usize {
        let Some(old) = grid.cell(target).map(|c| c.color) else {
            return 0;
        };
        if old == self.color {
            return 0;
        }
        match self.mode {
            BucketMode::Flood => self.flood_fill(grid, target, old),
            BucketMode::Global => self.global_replace(grid, old),
        }
    }
}

/// Which tool pointer clicks apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum ToolKind {
    /// Single-cell painting.
    #[default]
    Paintbrush,
    /// Flood / global fill.
    PaintBucket,
}

/// Holds one instance of every tool plus the current selection.
#[derive(Clone, Debug, Default, PartialEq, Reflect)]
pub struct Toolbox {
    /// Active tool.
    pub selected: ToolKind,
    /// Brush parameters.
    pub paintbrush: Paintbrush,
    /// Bucket parameters.
    pub paint_bucket: PaintBucket,
}

impl Toolbox {
    /// The selected tool.
    pub fn current(&self) -> &dyn Tool {
        match self.selected {
            ToolKind::Paintbrush => &self.paintbrush,
            ToolKind::PaintBucket => &self.paint_bucket,
        }
    }
}
