//! Module grid construction for a single encode pass.
//!
//! A [`Matrix`] starts with every function pattern placed and every data module
//! unset. The encoder then maps the codeword bits, resolves leftover modules,
//! applies the mask and writes the format information, in that order.

use crate::qrcode::{format_band_primary, Config};

/// Finder pattern side length.
const FINDER_SIZE: usize = 7;

/// Alignment pattern side length.
const ALIGNMENT_SIZE: usize = 5;

/// Finder pattern plus separator plus format band along each inner edge.
const CORNER_ZONE: usize = 9;

/// Row and column carrying the timing patterns.
const TIMING: usize = 6;

/// A QR module grid under construction.
///
/// Cells are `None` until resolved. The reserved map is computed once from the
/// version parameters and shared by the mapper, the masker and the format writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    size: usize,
    version: u8,
    cells: Vec<Option<bool>>,
    reserved: Vec<bool>,
}

impl Matrix {
    /// Allocates the grid and places finder, separator, alignment, timing and dark
    /// modules. Data modules and the format bands stay unset.
    pub fn new(config: &Config) -> Self {
        let size = config.size();
        let centers = alignment_centers(config);
        let mut result = Self {
            size,
            version: config.version().value(),
            cells: vec![None; size * size],
            reserved: Vec::with_capacity(size * size),
        };
        for row in 0..size {
            for col in 0..size {
                let reserved = result.is_function_area(row, col, &centers);
                result.reserved.push(reserved);
            }
        }

        result.place_finder(0, 0);
        result.place_finder(size - FINDER_SIZE, 0);
        result.place_finder(0, size - FINDER_SIZE);
        result.place_separators();
        for &(row, col) in &centers {
            result.place_alignment(row, col);
        }
        result.place_timing();
        result.place_dark_module();
        result
    }

    /// Side length in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the cell at `(row, col)`, `None` if not yet resolved.
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.cells[row * self.size + col]
    }

    /// Whether `(row, col)` belongs to a finder/separator corner, a timing line, an
    /// alignment footprint, the dark module or a format band.
    pub fn is_reserved(&self, row: usize, col: usize) -> bool {
        self.reserved[row * self.size + col]
    }

    /// Number of modules available for data.
    pub fn data_capacity(&self) -> usize {
        self.reserved.iter().filter(|&&r| !r).count()
    }

    /// Coordinates of the fixed dark module next to the bottom-left finder.
    pub fn dark_module(&self) -> (usize, usize) {
        (4 * usize::from(self.version) + 9, 8)
    }

    fn set(&mut self, row: usize, col: usize, isdark: bool) {
        self.cells[row * self.size + col] = Some(isdark);
    }

    fn is_function_area(&self, row: usize, col: usize, centers: &[(usize, usize)]) -> bool {
        in_corner_zone(self.size, row, col)
            || row == TIMING
            || col == TIMING
            || centers
                .iter()
                .any(|&(r, c)| row.abs_diff(r) <= 2 && col.abs_diff(c) <= 2)
            || (row, col) == self.dark_module()
    }

    /// Places a 7x7 finder pattern with its top-left module at column `x`, row `y`.
    fn place_finder(&mut self, x: usize, y: usize) {
        for dy in 0..FINDER_SIZE {
            for dx in 0..FINDER_SIZE {
                let dist = dx.abs_diff(3).max(dy.abs_diff(3));
                self.set(y + dy, x + dx, dist != 2);
            }
        }
    }

    /// Clears the one-module border on the inner sides of each finder.
    fn place_separators(&mut self) {
        let size = self.size;
        for i in 0..=FINDER_SIZE {
            // Top-left
            self.set(FINDER_SIZE, i, false);
            self.set(i, FINDER_SIZE, false);
            // Top-right
            self.set(FINDER_SIZE, size - 1 - i, false);
            self.set(i, size - 1 - FINDER_SIZE, false);
            // Bottom-left
            self.set(size - 1 - FINDER_SIZE, i, false);
            self.set(size - 1 - i, FINDER_SIZE, false);
        }
    }

    /// Places a 5x5 alignment pattern centered on `(row, col)`.
    fn place_alignment(&mut self, row: usize, col: usize) {
        for dy in 0..ALIGNMENT_SIZE {
            for dx in 0..ALIGNMENT_SIZE {
                let dist = dx.abs_diff(2).max(dy.abs_diff(2));
                self.set(row + dy - 2, col + dx - 2, dist != 1);
            }
        }
    }

    /// Alternating modules along row 6 and column 6 between the separators,
    /// dark on even indices.
    fn place_timing(&mut self) {
        for i in CORNER_ZONE - 1..self.size - (CORNER_ZONE - 1) {
            self.set(TIMING, i, i % 2 == 0);
            self.set(i, TIMING, i % 2 == 0);
        }
    }

    fn place_dark_module(&mut self) {
        let (row, col) = self.dark_module();
        self.set(row, col, true);
    }

    /// Writes `bits` into the unreserved modules in zigzag order and returns how
    /// many bits were consumed.
    ///
    /// Column pairs are walked from the right edge leftward, skipping the timing
    /// column; the first pair runs bottom to top and the direction flips after each
    /// pair. Within a row the right column of the pair comes first.
    pub fn map_bits<I>(&mut self, bits: I) -> usize
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bits = bits.into_iter().peekable();
        let size = self.size;
        let mut consumed: usize = 0;
        let mut right: usize = size - 1;
        while right >= 1 && bits.peek().is_some() {
            if right == TIMING {
                right = TIMING - 1;
            }
            let upward: bool = ((right + 1) & 2) == 0;
            for vert in 0..size {
                let row = if upward { size - 1 - vert } else { vert };
                for col in [right, right - 1] {
                    if self.is_reserved(row, col) {
                        continue;
                    }
                    if let Some(bit) = bits.next() {
                        self.set(row, col, bit);
                        consumed += 1;
                    }
                }
            }
            if right < 2 {
                break;
            }
            right -= 2;
        }
        consumed
    }

    /// Resolves every unset data module to light and returns how many there were.
    pub fn fill_remainder(&mut self) -> usize {
        let mut filled = 0;
        for (cell, &reserved) in self.cells.iter_mut().zip(self.reserved.iter()) {
            if !reserved && cell.is_none() {
                *cell = Some(false);
                filled += 1;
            }
        }
        if filled > 0 {
            log::debug!("resolved {} remainder modules to light", filled);
        }
        filled
    }

    /// Applies the checkerboard mask: inverts every unreserved module where
    /// `(row + col) % 2 == 0`.
    pub fn apply_mask(&mut self) {
        for row in 0..self.size {
            for col in 0..self.size {
                if self.is_reserved(row, col) || (row + col) % 2 != 0 {
                    continue;
                }
                let cell = &mut self.cells[row * self.size + col];
                if let Some(isdark) = *cell {
                    *cell = Some(!isdark);
                }
            }
        }
    }

    /// Writes the 15-bit format word into the primary band around the top-left
    /// finder and into the redundant copies along row 8 (top-right, 8 bits) and
    /// column 8 (bottom-left, 7 bits).
    ///
    /// The copies split 8/7 as in ISO/IEC 18004 so the bottom-left copy stops
    /// short of the dark module; a 7/8 split would overwrite it.
    pub fn write_format_info(&mut self, word: u16) {
        let size = self.size;
        // Most significant bit first
        let bits: Vec<bool> = (0..15).rev().map(|i| (word >> i) & 1 != 0).collect();
        for (&bit, (row, col)) in bits.iter().zip(format_band_primary()) {
            self.set(row, col, bit);
        }
        for i in 0..8 {
            self.set(8, size - 1 - i, bits[14 - i]);
        }
        for i in 0..7 {
            self.set(size - 1 - i, 8, bits[i]);
        }
    }

    /// Whether every module has been resolved.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Consumes the grid, returning row-major modules.
    pub fn into_modules(self) -> Vec<bool> {
        debug_assert!(self.is_complete(), "Unresolved modules left in matrix");
        self.cells.into_iter().map(|cell| cell.unwrap_or(false)).collect()
    }
}

/// Whether `(row, col)` lies in one of the three 9x9 finder corners
/// (8x8 for the corners touching the right or bottom edge).
fn in_corner_zone(size: usize, row: usize, col: usize) -> bool {
    let near = CORNER_ZONE - 1;
    let far = size - near;
    (row <= near && col <= near) || (row <= near && col >= far) || (row >= far && col <= near)
}

/// Every pairing of the version's alignment coordinates whose 5x5 footprint stays
/// clear of the finder corners.
fn alignment_centers(config: &Config) -> Vec<(usize, usize)> {
    let size = config.size();
    let coords = config.alignment();
    let mut centers = Vec::new();
    for &row in coords {
        for &col in coords {
            let overlaps = (row - 2..=row + 2)
                .any(|r| (col - 2..=col + 2).any(|c| in_corner_zone(size, r, c)));
            if !overlaps {
                centers.push((row, col));
            }
        }
    }
    centers
}
