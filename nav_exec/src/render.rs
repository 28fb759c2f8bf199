//! # Map rendering
//!
//! Debug views of a [`MapSnapshot`]: an RGB image for saving to disk and a
//! coloured text view for the terminal. Both only read the snapshot.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::Path;

use image::{Rgb, RgbImage};
use nalgebra::Vector2;
use owo_colors::OwoColorize;

use comms_if::eqpt::nav::MapSnapshot;

use crate::map::{Cell, CellIndex};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Size of one cell in the rendered image.
///
/// Units: pixels
pub const CELL_PX: u32 = 15;

/// The image is never smaller than this, the grid is centred inside it.
pub const MIN_CANVAS_PX: (u32, u32) = (1280, 720);

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const OBSTACLE: Rgb<u8> = Rgb([255, 255, 255]);
const PLANT: Rgb<u8> = Rgb([0, 128, 0]);
const FOOTPRINT: Rgb<u8> = Rgb([255, 255, 0]);
const INFLATED: Rgb<u8> = Rgb([64, 64, 64]);
const BORDER: Rgb<u8> = Rgb([255, 255, 255]);
const ROBOT: Rgb<u8> = Rgb([0, 255, 0]);
const TARGET: Rgb<u8> = Rgb([255, 0, 0]);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Could not save the image: {0}")]
    ImageError(#[from] image::ImageError),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Paint a snapshot, and optionally the target, into an image.
///
/// The robot and target are drawn one and a half cells wide so they stay
/// visible on top of the cells around them. Free cells on the edge of the
/// grid are drawn as a border.
pub fn render_snapshot(snapshot: &MapSnapshot, target: Option<Vector2<f64>>) -> RgbImage {
    let grid_w = snapshot.cols as u32 * CELL_PX;
    let grid_h = snapshot.rows as u32 * CELL_PX;
    let width = grid_w.max(MIN_CANVAS_PX.0);
    let height = grid_h.max(MIN_CANVAS_PX.1);
    let offset = ((width - grid_w) / 2, (height - grid_h) / 2);

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    for (row, cells) in snapshot.array.iter().enumerate() {
        for (col, code) in cells.iter().enumerate() {
            let on_edge =
                row == 0 || col == 0 || row + 1 == snapshot.rows || col + 1 == snapshot.cols;

            let colour = match Cell::from_code(*code) {
                Some(Cell::Obstacle) => OBSTACLE,
                Some(Cell::Plant) => PLANT,
                Some(Cell::RobotFootprint) => FOOTPRINT,
                Some(Cell::Inflated) => INFLATED,
                _ if on_edge => BORDER,
                _ => continue,
            };

            let x = offset.0 + col as u32 * CELL_PX;
            let y = offset.1 + row as u32 * CELL_PX;
            fill_rect(&mut img, x as i64, y as i64, CELL_PX, colour);
        }
    }

    let marker_px = CELL_PX * 3 / 2;
    let mut mark = |x: f64, y: f64, colour| {
        let cell = CellIndex::from_position(x, y);
        let px = offset.0 as i64 + cell.col as i64 * CELL_PX as i64 - CELL_PX as i64 / 4;
        let py = offset.1 as i64 + cell.row as i64 * CELL_PX as i64 - CELL_PX as i64 / 4;
        fill_rect(&mut img, px, py, marker_px, colour);
    };

    if let Some(t) = target {
        mark(t.x, t.y, TARGET);
    }
    mark(snapshot.current_x, snapshot.current_y, ROBOT);

    img
}

/// Render a snapshot and save it, the format following the file extension.
pub fn save_png<P: AsRef<Path>>(
    snapshot: &MapSnapshot,
    target: Option<Vector2<f64>>,
    path: P,
) -> Result<(), RenderError> {
    render_snapshot(snapshot, target).save(path)?;
    Ok(())
}

/// Coloured text view of a snapshot, one line per row.
pub fn ascii(snapshot: &MapSnapshot, target: Option<Vector2<f64>>) -> String {
    let robot = CellIndex::from_position(snapshot.current_x, snapshot.current_y);
    let target = target.map(|t| CellIndex::from_position(t.x, t.y));

    let mut out = String::with_capacity(snapshot.rows * (snapshot.cols + 1));

    for (row, cells) in snapshot.array.iter().enumerate() {
        for (col, code) in cells.iter().enumerate() {
            let index = CellIndex::new(row as isize, col as isize);

            let symbol = if index == robot {
                "R".green().bold().to_string()
            } else if Some(index) == target {
                "T".red().bold().to_string()
            } else {
                match Cell::from_code(*code) {
                    Some(Cell::Obstacle) => "#".white().to_string(),
                    Some(Cell::Plant) => "*".green().to_string(),
                    Some(Cell::RobotFootprint) => "o".yellow().to_string(),
                    Some(Cell::Inflated) => "+".bright_black().to_string(),
                    _ => ".".to_string(),
                }
            };

            out.push_str(&symbol);
        }
        out.push('\n');
    }

    out
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Fill a square, clipped to the image.
fn fill_rect(img: &mut RgbImage, x: i64, y: i64, size: u32, colour: Rgb<u8>) {
    let x_range = x.max(0)..(x + size as i64).min(img.width() as i64);
    let y_range = y.max(0)..(y + size as i64).min(img.height() as i64);

    for py in y_range {
        for px in x_range.clone() {
            img.put_pixel(px as u32, py as u32, colour);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::map::Map;

    fn snapshot() -> MapSnapshot {
        // 5x5 cells, robot in (2, 2)
        let map = Map::new(20.0, 20.0);
        map.write_cell(CellIndex::new(1, 3), Cell::Obstacle).unwrap();
        map.write_cell(CellIndex::new(3, 1), Cell::Plant).unwrap();
        map.snapshot().unwrap()
    }

    #[test]
    fn test_small_map_centred() {
        let img = render_snapshot(&snapshot(), None);
        assert_eq!(img.dimensions(), MIN_CANVAS_PX);

        // 75 px of grid in the middle
        let ox = (1280 - 75) / 2;
        let oy = (720 - 75) / 2;

        // Corners are border, outside is background
        assert_eq!(*img.get_pixel(ox, oy), BORDER);
        assert_eq!(*img.get_pixel(ox - 1, oy), BACKGROUND);

        // Obstacle and plant cell centres
        assert_eq!(*img.get_pixel(ox + 3 * 15 + 7, oy + 15 + 7), OBSTACLE);
        assert_eq!(*img.get_pixel(ox + 15 + 7, oy + 3 * 15 + 7), PLANT);

        // Robot marker covers its cell
        assert_eq!(*img.get_pixel(ox + 2 * 15 + 7, oy + 2 * 15 + 7), ROBOT);
    }

    #[test]
    fn test_target_drawn() {
        let img = render_snapshot(&snapshot(), Some(Vector2::new(1.2, 1.1)));

        let ox = (1280 - 75) / 2;
        let oy = (720 - 75) / 2;
        assert_eq!(*img.get_pixel(ox + 15 + 7, oy + 15 + 7), TARGET);
    }

    #[test]
    fn test_large_map_grows_canvas() {
        let map = Map::new(400.0, 240.0);
        let img = render_snapshot(&map.snapshot().unwrap(), None);

        assert_eq!(img.dimensions(), (1500, 900));
    }

    #[test]
    fn test_ascii() {
        let text = ascii(&snapshot(), Some(Vector2::new(0.0, 4.0)));
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains('R'));
        assert!(lines[1].contains('#'));
        assert!(lines[3].contains('*'));
        assert!(lines[4].contains('T'));
    }
}
