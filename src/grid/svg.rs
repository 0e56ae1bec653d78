use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::model::{GridModel, cell_center, hex_corners};
use super::persist::MapIoError;
use crate::math::Rgb;

/// Renders every cell as a flat-topped hexagon into a standalone SVG document.
///
/// No camera or culling is involved: coordinates are rendering-space with hex radius `radius`.
pub fn render_svg(grid: &GridModel, radius: f64) -> String {
    let extent = grid.extent(radius);
    let (width, height) = (extent.x, extent.y);
    let corners = hex_corners(radius);
    let stroke = Rgb::BLACK.to_hex(true);

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.3}" height="{height:.3}" viewBox="0 0 {width:.3} {height:.3}">"#
    );
    for cell in grid.iter() {
        let center = cell_center(cell.coord(), radius);
        let points = corners
            .iter()
            .map(|c| format!("{:.3},{:.3}", center.x + c.x, center.y + c.y))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            r#"  <polygon points="{points}" fill="{}" stroke="{stroke}" stroke-width="{:.3}"/>"#,
            cell.color.to_hex(true),
            radius * 0.05,
        );
    }
    out.push_str("</svg>\n");
    out
}

/// Writes [`render_svg`] output to `path`.
pub fn export_svg(path: impl AsRef<Path>, grid: &GridModel, radius: f64) -> Result<(), MapIoError> {
    let path = path.as_ref();
    fs::write(path, render_svg(grid, radius)).map_err(|source| MapIoError::Io {
        path: path.to_path_buf(),
        source,
    })
}
