use std::fs;
use std::path::{Path, PathBuf};

use bevy::log::warn;
use serde::{Deserialize, Serialize};

use super::model::{GridModel, MAX_DIMENSION};
use crate::math::Rgb;

/// Errors raised while reading or writing map files.
#[derive(Debug, thiserror::Error)]
pub enum MapIoError {
    /// Reading or writing the file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid map.
    #[error("malformed map data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted colour of one cell. A missing colour leaves the target cell untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    /// Colour to merge into the cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

/// Structural map object: `{width, height, cells[x][y].color}`, column-major.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    /// Number of columns.
    pub width: i32,
    /// Number of rows.
    pub height: i32,
    /// Column-major cell payloads; may be ragged or short.
    #[serde(default)]
    pub cells: Vec<Vec<CellData>>,
}

impl MapData {
    /// Parses a JSON document.
    pub fn from_json(text: &str) -> Result<Self, MapIoError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, MapIoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl GridModel {
    /// Snapshot of every cell colour.
    pub fn serialize(&self) -> MapData {
        let cells = (0..self.width())
            .map(|x| {
                (0..self.height())
                    .map(|y| CellData {
                        color: self.get(x, y).map(|c| c.color),
                    })
                    .collect()
            })
            .collect();
        MapData {
            width: self.width(),
            height: self.height(),
            cells,
        }
    }

    /// Resizes to the incoming dimensions, then merges colours cell by cell.
    ///
    /// Cells are never replaced; entries missing from `data` keep their colour.
    /// Dimensions above [`MAX_DIMENSION`] are clamped.
    pub fn deserialize(&mut self, data: &MapData) {
        let width = data.width.min(MAX_DIMENSION);
        let height = data.height.min(MAX_DIMENSION);
        if (width, height) != (data.width, data.height) {
            warn!(
                "Map is {}x{}, clamped to {width}x{height}",
                data.width, data.height
            );
        }
        self.resize(width, height);
        for (x, column) in data.cells.iter().enumerate() {
            for (y, incoming) in column.iter().enumerate() {
                let Some(color) = incoming.color else {
                    continue;
                };
                if let Some(cell) = self.get_mut(x as i32, y as i32) {
                    cell.color = color;
                }
            }
        }
    }
}

/// Reads and parses a JSON map file.
pub fn load_map(path: impl AsRef<Path>) -> Result<MapData, MapIoError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MapIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    MapData::from_json(&text)
}

/// Serializes `grid` and writes it as a JSON map file.
pub fn save_map(path: impl AsRef<Path>, grid: &GridModel) -> Result<(), MapIoError> {
    let path = path.as_ref();
    let text = grid.serialize().to_json()?;
    fs::write(path, text).map_err(|source| MapIoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted_grid() -> GridModel {
        let mut grid = GridModel::new(3, 2);
        grid.get_mut(0, 0).unwrap().color = Rgb::new(1.0, 0.0, 0.0);
        grid.get_mut(2, 1).unwrap().color = Rgb::new(0.0, 0.0, 1.0);
        grid
    }

    #[test]
    fn serialize_is_column_major() {
        let data = painted_grid().serialize();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.cells.len(), 3);
        assert!(data.cells.iter().all(|col| col.len() == 2));
        assert_eq!(data.cells[2][1].color, Some(Rgb::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn deserialize_clamps_oversized_dimensions() {
        let mut grid = GridModel::new(2, 2);
        let data = MapData::from_json(r#"{"width": 2000000000, "height": 3, "cells": []}"#).unwrap();
        grid.deserialize(&data);
        assert_eq!((grid.width(), grid.height()), (MAX_DIMENSION, 3));
    }

    #[test]
    fn deserialize_resizes_and_merges() {
        let source = painted_grid();
        let mut target = GridModel::new(7, 7);
        target.deserialize(&source.serialize());
        assert_eq!((target.width(), target.height()), (3, 2));
        for (a, b) in source.iter().zip(target.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn deserialize_keeps_colors_missing_from_payload() {
        let mut grid = GridModel::new(2, 2);
        grid.get_mut(1, 1).unwrap().color = Rgb::WHITE;
        let data = MapData {
            width: 2,
            height: 2,
            cells: vec![vec![CellData {
                color: Some(Rgb::BLACK),
            }]],
        };
        grid.deserialize(&data);
        assert_eq!(grid.get(0, 0).unwrap().color, Rgb::BLACK);
        assert_eq!(grid.get(0, 1).unwrap().color, Rgb::GRAY);
        assert_eq!(grid.get(1, 1).unwrap().color, Rgb::WHITE);
    }

    #[test]
    fn deserialize_ignores_cells_beyond_declared_size() {
        let mut grid = GridModel::new(1, 1);
        let data = MapData {
            width: 1,
            height: 1,
            cells: vec![
                vec![CellData::default(), CellData { color: Some(Rgb::BLACK) }],
                vec![CellData { color: Some(Rgb::BLACK) }],
            ],
        };
        grid.deserialize(&data);
        assert_eq!(grid.iter().count(), 1);
        assert_eq!(grid.get(0, 0).unwrap().color, Rgb::GRAY);
    }

    #[test]
    fn json_accepts_structural_objects() {
        let text = r#"{
            "width": 2,
            "height": 1,
            "cells": [[{"color": {"r": 1.0, "g": 0.5, "b": 0.0}}], [{}]]
        }"#;
        let data = MapData::from_json(text).unwrap();
        assert_eq!(data.cells[0][0].color, Some(Rgb::new(1.0, 0.5, 0.0)));
        assert_eq!(data.cells[1][0].color, None);
    }

    #[test]
    fn json_rejects_garbage() {
        assert!(matches!(
            MapData::from_json("{\"width\": \"wide\"}"),
            Err(MapIoError::Json(_))
        ));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        let grid = painted_grid();
        save_map(&path, &grid).unwrap();

        let mut loaded = GridModel::new(1, 1);
        loaded.deserialize(&load_map(&path).unwrap());
        for (a, b) in grid.iter().zip(loaded.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match load_map(&path) {
            Err(MapIoError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected io error, got {other:?}"),
        }
        let err = load_map(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"), "{err}");
    }
}
