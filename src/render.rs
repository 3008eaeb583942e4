//! ASCII map of the grid.
//!
//! ```text
//! +---+---+
//! | O | X |
//! +---+---+
//! | X | O |
//! +---+---+
//! ```
//!
//! `O` marks the suggested path, `X` any other cell and `@` the agent.

use crate::environment::Pos;

const CELL_WIDTH: usize = 4;

/// Static decorative map. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapBuffer {
    bytes: Vec<u8>,
    width: usize,
    height: usize,
}

impl MapBuffer {
    pub fn new(height: usize, width: usize, path: &[Pos]) -> Self {
        let border = "+---".repeat(width) + "+\n";
        let cells = "| X ".repeat(width) + "|\n";
        let mut text = String::with_capacity((2 * height + 1) * border.len());
        for _ in 0..height {
            text.push_str(&border);
            text.push_str(&cells);
        }
        text.push_str(&border);

        let mut map = Self {
            bytes: text.into_bytes(),
            width,
            height,
        };
        for cell in path {
            if let Some(i) = map.offset(*cell) {
                map.bytes[i] = b'O';
            }
        }
        map
    }

    /// Byte offset of the marker character of `pos`.
    fn offset(&self, pos: Pos) -> Option<usize> {
        if pos.row >= self.height || pos.col >= self.width {
            return None;
        }
        let row_bytes = (CELL_WIDTH * self.width + 2) * 2;
        Some(pos.row * row_bytes + row_bytes / 2 + CELL_WIDTH * pos.col + 2)
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII is ever written into the buffer.
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

/// Copy of `map` with the agent drawn at `pos`.
pub fn draw(map: &MapBuffer, pos: Pos) -> String {
    let mut bytes = map.bytes.clone();
    if let Some(i) = map.offset(pos) {
        bytes[i] = b'@';
    }
    String::from_utf8(bytes).unwrap_or_default()
}
