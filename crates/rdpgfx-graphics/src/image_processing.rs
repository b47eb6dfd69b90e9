use core::{cmp, fmt};

use crate::color_conversion::bytes_per_pixel;
use crate::geometry::{InclusiveRectangle, Rectangle as _};

/// 32-bit layouts a tile codec can be configured to produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    BgrA32,
    BgrX32,
    RgbA32,
    RgbX32,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::BgrA32 | Self::BgrX32 | Self::RgbA32 | Self::RgbX32 => 4,
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::BgrA32 | Self::RgbA32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    OutOfBounds { required: usize, available: usize },
    PixelSizeMismatch { src: usize, dst: usize },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::OutOfBounds { required, available } => {
                write!(f, "image access out of bounds: {required} bytes required, {available} available")
            }
            ImageError::PixelSizeMismatch { src, dst } => {
                write!(f, "pixel size mismatch: source has {src} bytes per pixel, destination {dst}")
            }
        }
    }
}

impl core::error::Error for ImageError {}

pub struct ImageRegionMut<'a> {
    pub region: InclusiveRectangle,
    /// Row stride in bytes.
    pub step: usize,
    pub bytes_per_pixel: usize,
    pub data: &'a mut [u8],
}

impl fmt::Debug for ImageRegionMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRegionMut")
            .field("region", &self.region)
            .field("step", &self.step)
            .field("bytes_per_pixel", &self.bytes_per_pixel)
            .field("data_len", &self.data.len())
            .finish()
    }
}

pub struct ImageRegion<'a> {
    pub region: InclusiveRectangle,
    /// Row stride in bytes.
    pub step: usize,
    pub bytes_per_pixel: usize,
    pub data: &'a [u8],
}

impl fmt::Debug for ImageRegion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRegion")
            .field("region", &self.region)
            .field("step", &self.step)
            .field("bytes_per_pixel", &self.bytes_per_pixel)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl ImageRegion<'_> {
    /// Copies the overlapping part of both regions, row by row. Both sides must share the pixel size.
    pub fn copy_to(&self, other: &mut ImageRegionMut<'_>) -> Result<(), ImageError> {
        if self.bytes_per_pixel != other.bytes_per_pixel {
            return Err(ImageError::PixelSizeMismatch {
                src: self.bytes_per_pixel,
                dst: other.bytes_per_pixel,
            });
        }

        let width = usize::from(cmp::min(self.region.width(), other.region.width()));
        let height = usize::from(cmp::min(self.region.height(), other.region.height()));
        let row_len = width * self.bytes_per_pixel;

        let src_x = usize::from(self.region.left) * self.bytes_per_pixel;
        let dst_x = usize::from(other.region.left) * other.bytes_per_pixel;

        for y in 0..height {
            let src_start = (y + usize::from(self.region.top)) * self.step + src_x;
            let dst_start = (y + usize::from(other.region.top)) * other.step + dst_x;

            let src_row = self
                .data
                .get(src_start..src_start + row_len)
                .ok_or(ImageError::OutOfBounds {
                    required: src_start + row_len,
                    available: self.data.len(),
                })?;

            let available = other.data.len();
            let dst_row = other
                .data
                .get_mut(dst_start..dst_start + row_len)
                .ok_or(ImageError::OutOfBounds {
                    required: dst_start + row_len,
                    available,
                })?;

            dst_row.copy_from_slice(src_row);
        }

        Ok(())
    }
}

/// Copies `height` scanlines of `width` pixels from `src` into `dst` in reverse row order.
///
/// Uncompressed bitmap updates are transmitted bottom-up; this restores top-down order.
pub fn flip_vertical(src: &[u8], dst: &mut [u8], width: u16, height: u16, bpp: u16) -> Result<(), ImageError> {
    let row_len = usize::from(width) * bytes_per_pixel(bpp);
    let required = row_len * usize::from(height);

    if src.len() < required {
        return Err(ImageError::OutOfBounds {
            required,
            available: src.len(),
        });
    }

    if dst.len() < required {
        return Err(ImageError::OutOfBounds {
            required,
            available: dst.len(),
        });
    }

    if row_len == 0 {
        return Ok(());
    }

    src[..required]
        .chunks_exact(row_len)
        .rev()
        .zip(dst[..required].chunks_exact_mut(row_len))
        .for_each(|(src_row, dst_row)| dst_row.copy_from_slice(src_row));

    Ok(())
}
