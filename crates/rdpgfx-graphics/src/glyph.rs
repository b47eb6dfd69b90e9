use core::fmt;

use bitvec::prelude::{BitSlice, BitVec, Msb0};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphError {
    InvalidMaskSize { expected: usize, actual: usize },
}

impl fmt::Display for GlyphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphError::InvalidMaskSize { expected, actual } => {
                write!(f, "invalid glyph mask size. Expected: {expected}, actual: {actual}")
            }
        }
    }
}

impl core::error::Error for GlyphError {}

/// A 1-bit stencil.
///
/// Scanlines are `ceil(width / 8)` bytes long and bits are always read most significant bit first,
/// whatever the byte order of the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Stencil {
    width: u16,
    height: u16,
    bits: BitVec<u8, Msb0>,
}

impl fmt::Debug for Stencil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stencil")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("set_bits", &self.bits.count_ones())
            .finish()
    }
}

impl Stencil {
    /// Builds a stencil from a packed glyph mask (`aj`).
    pub fn from_mask(width: u16, height: u16, mask: &[u8]) -> Result<Self, GlyphError> {
        let expected = scanline(width) * usize::from(height);

        let mask = mask.get(..expected).ok_or(GlyphError::InvalidMaskSize {
            expected,
            actual: mask.len(),
        })?;

        Ok(Self {
            width,
            height,
            bits: BitVec::from_slice(mask),
        })
    }

    /// An all-clear stencil.
    pub fn blank(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            bits: BitVec::repeat(false, scanline(width) * 8 * usize::from(height)),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Bytes per scanline.
    pub fn scanline(&self) -> usize {
        scanline(self.width)
    }

    /// Whether the bit at (`x`, `y`) is set. Out-of-range coordinates read as clear.
    pub fn is_set(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }

        self.row(y)
            .and_then(|row| row.get(usize::from(x)).map(|bit| *bit))
            .unwrap_or(false)
    }

    /// Whether the bit covering (`x`, `y`) is set when the stencil is tiled from `origin`.
    pub fn is_set_tiled(&self, x: i32, y: i32, origin: (i32, i32)) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }

        let tile_x = (x - origin.0).rem_euclid(i32::from(self.width));
        let tile_y = (y - origin.1).rem_euclid(i32::from(self.height));

        match (u16::try_from(tile_x), u16::try_from(tile_y)) {
            (Ok(tile_x), Ok(tile_y)) => self.is_set(tile_x, tile_y),
            _ => false,
        }
    }

    pub fn as_raw_slice(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    fn row(&self, y: u16) -> Option<&BitSlice<u8, Msb0>> {
        let row_bits = self.scanline() * 8;
        let start = usize::from(y) * row_bits;
        self.bits.get(start..start + row_bits)
    }
}

fn scanline(width: u16) -> usize {
    usize::from(width).div_ceil(8)
}
