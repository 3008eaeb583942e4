//! Decorative "suggested path" through the map.
//!
//! The path is a rational quadratic Bézier curve from `start` to `end` pulled
//! by `mid`, sampled densely and snapped to grid cells. It only decides which
//! cells carry the path bonus and where the map shows `O`.

use crate::environment::Pos;

/// Cells visited by the rational quadratic Bézier `start -> mid -> end`.
///
/// `weight` is the middle control point weight. Samples whose rational
/// denominator is not positive, or that fall outside `height x width`, are
/// dropped. Consecutive duplicates are collapsed, so the result is ordered
/// from `start` to `end`.
pub fn bezier_curve(start: Pos, mid: Pos, end: Pos, weight: f64, height: usize, width: usize) -> Vec<Pos> {
    let (r0, c0) = (start.row as f64, start.col as f64);
    let (r1, c1) = (mid.row as f64, mid.col as f64);
    let (r2, c2) = (end.row as f64, end.col as f64);

    let samples = 8 * (height + width).max(1);
    let mut cells: Vec<Pos> = Vec::new();
    for i in 0..=samples {
        let t = i as f64 / samples as f64;
        let a = (1.0 - t) * (1.0 - t);
        let b = 2.0 * weight * t * (1.0 - t);
        let c = t * t;
        let denom = a + b + c;
        if denom <= 0.0 {
            continue;
        }
        let row = ((a * r0 + b * r1 + c * r2) / denom).round();
        let col = ((a * c0 + b * c1 + c * c2) / denom).round();
        if row < 0.0 || col < 0.0 || row >= height as f64 || col >= width as f64 {
            continue;
        }
        let cell = Pos::new(row as usize, col as usize);
        if cells.last() != Some(&cell) {
            cells.push(cell);
        }
    }
    cells
}
