use std::fmt;

use crate::error::{Error, Result};

/// Row-major grid of dot states, `true` meaning the dot shows its bright side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Create an all-clear bitmap
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width
            .checked_mul(height)
            .unwrap_or_else(|| panic!("{}x{} bitmap is too large", width, height));
        Bitmap {
            width,
            height,
            pixels: vec![false; len],
        }
    }

    /// Build a bitmap from rows of equal length
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(Error::InvalidImage("image has no pixels".into()));
        }

        let mut pixels = Vec::with_capacity(width * height);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(Error::InvalidImage(format!(
                    "row {} has {} pixels, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            pixels.extend(row);
        }

        Ok(Bitmap { width, height, pixels })
    }

    /// Parse ASCII art: `#`, `X`, `*` or `1` set a dot; `.`, `0` or space clear it.
    /// Short lines are padded with clear dots to the longest line.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut rows = Vec::with_capacity(lines.len());
        for (row, line) in lines.iter().enumerate() {
            let mut pixels = vec![false; width];
            for (col, c) in line.chars().enumerate() {
                pixels[col] = match c {
                    '#' | 'X' | '*' | '1' => true,
                    '.' | '0' | ' ' => false,
                    other => {
                        return Err(Error::InvalidImage(format!(
                            "unexpected character {:?} at row {}, column {}",
                            other, row, col
                        )))
                    }
                };
            }
            rows.push(pixels);
        }

        Self::from_rows(rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Dot state at (`row`, `col`); out-of-range reads as clear
    pub fn get(&self, row: usize, col: usize) -> bool {
        if row >= self.height || col >= self.width {
            return false;
        }
        self.pixels[row * self.width + col]
    }

    /// Set one dot; out-of-range writes are ignored
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        if row < self.height && col < self.width {
            self.pixels[row * self.width + col] = value;
        }
    }

    pub fn fill(&mut self, value: bool) {
        self.pixels.iter_mut().for_each(|p| *p = value);
    }

    /// Upside-down copy, for signs mounted inverted
    pub fn flipped_vertically(&self) -> Self {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for row in self.pixels.chunks(self.width.max(1)).rev() {
            pixels.extend_from_slice(row);
        }
        Bitmap {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Preview rendering, one `|...|` line per row
impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            let line: String = (0..self.width)
                .map(|col| if self.get(row, col) { '#' } else { ' ' })
                .collect();
            writeln!(f, "|{}|", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_clear() {
        let bitmap = Bitmap::new(3, 2);
        assert_eq!(bitmap.width(), 3);
        assert_eq!(bitmap.height(), 2);
        assert!(!bitmap.get(1, 2));
    }

    #[test]
    #[should_panic(expected = "bitmap is too large")]
    fn test_new_rejects_overflow() {
        let _ = Bitmap::new(usize::MAX / 2, 32);
    }

    #[test]
    fn test_set_and_get() {
        let mut bitmap = Bitmap::new(3, 2);
        bitmap.set(1, 2, true);
        assert!(bitmap.get(1, 2));
        assert!(!bitmap.get(0, 2));

        // Out of range is ignored
        bitmap.set(5, 5, true);
        assert!(!bitmap.get(5, 5));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![true, false], vec![true]];
        assert!(matches!(Bitmap::from_rows(rows), Err(Error::InvalidImage(_))));
        assert!(Bitmap::from_rows(Vec::new()).is_err());
    }

    #[test]
    fn test_parse_ascii_art() {
        let bitmap = Bitmap::parse("#.\n.#\n#").unwrap();
        assert_eq!(bitmap.width(), 2);
        assert_eq!(bitmap.height(), 3);
        assert!(bitmap.get(0, 0));
        assert!(bitmap.get(1, 1));
        assert!(bitmap.get(2, 0));
        assert!(!bitmap.get(2, 1));

        assert!(Bitmap::parse("#?").is_err());
    }

    #[test]
    fn test_flipped_vertically() {
        let bitmap = Bitmap::parse("#.\n..\n.#").unwrap();
        let flipped = bitmap.flipped_vertically();
        assert_eq!(flipped, Bitmap::parse(".#\n..\n#.").unwrap());
    }

    #[test]
    fn test_fill_and_preview() {
        let mut bitmap = Bitmap::new(2, 1);
        bitmap.fill(true);
        assert_eq!(bitmap.to_string(), "|##|\n");
    }
}
