//! Conversion of RDP pointer masks into ARGB device cursor images.
//!
//! # Notes on xor/and masks encoding:
//! A pointer is described by two masks. The xorMask is the base color of each pixel and the
//! andMask controls full transparency, full opacity or pixel inversion:
//!
//! - `andMask == 0` -> copy the pixel from xorMask
//! - `andMask == 1`, xorMask black -> transparent pixel
//! - `andMask == 1`, xorMask white -> inverted pixel
//!
//! Device cursors cannot invert what lies beneath them, so inverted pixels are rendered
//! following a black and white check pattern.
//!
//! xorMask can be 1, 8, 15, 16, 24 or 32 bits per pixel, andMask is always 1 bit per pixel.
//! Scanlines of both masks are padded to a multiple of 2 bytes. Color masks are stored
//! bottom-up, monochrome masks top-down.

use core::fmt;

use ironrdp_core::ReadCursor;

use crate::color_conversion::{ColorDepth, ColorError, PixelFormatConverter};

const TRANSPARENT: u32 = 0x0000_0000;
const OPAQUE_BLACK: u32 = 0xFF00_0000;
const OPAQUE_WHITE: u32 = 0xFFFF_FFFF;

#[derive(Debug)]
pub enum PointerError {
    InvalidXorMaskSize { expected: usize, actual: usize },
    InvalidAndMaskSize { expected: usize, actual: usize },
    NotSupportedBpp { bpp: u16 },
    Color(ColorError),
}

impl fmt::Display for PointerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerError::InvalidXorMaskSize { expected, actual } => {
                write!(
                    f,
                    "invalid pointer xorMask size. Expected: {expected}, actual: {actual}"
                )
            }
            PointerError::InvalidAndMaskSize { expected, actual } => {
                write!(
                    f,
                    "invalid pointer andMask size. Expected: {expected}, actual: {actual}"
                )
            }
            PointerError::NotSupportedBpp { bpp } => {
                write!(f, "not supported pointer bpp: {bpp}")
            }
            PointerError::Color(_) => write!(f, "xorMask color conversion failed"),
        }
    }
}

impl core::error::Error for PointerError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            PointerError::InvalidXorMaskSize { .. } => None,
            PointerError::InvalidAndMaskSize { .. } => None,
            PointerError::NotSupportedBpp { .. } => None,
            PointerError::Color(error) => Some(error),
        }
    }
}

impl From<ColorError> for PointerError {
    fn from(error: ColorError) -> Self {
        PointerError::Color(error)
    }
}

/// Pointer shape as announced by the session. Masks are borrowed from the update.
#[derive(Debug, Clone, Copy)]
pub struct PointerShape<'a> {
    pub width: u16,
    pub height: u16,
    pub hotspot_x: u16,
    pub hotspot_y: u16,
    pub xor_bpp: u16,
    pub and_mask: Option<&'a [u8]>,
    pub xor_mask: Option<&'a [u8]>,
}

/// Device cursor staging image: `width × height` non-premultiplied ARGB pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorImage {
    pub width: u16,
    pub height: u16,
    pub hotspot_x: u16,
    pub hotspot_y: u16,
    pub pixels: Vec<u32>,
}

impl CursorImage {
    /// A fully transparent image of the given extent.
    pub fn transparent(width: u16, height: u16, hotspot_x: u16, hotspot_y: u16) -> Self {
        Self {
            width,
            height,
            hotspot_x,
            hotspot_y,
            pixels: vec![TRANSPARENT; usize::from(width) * usize::from(height)],
        }
    }

    /// 1×1 fully transparent image, used to hide the cursor.
    pub fn hidden() -> Self {
        Self::transparent(1, 1, 0, 0)
    }

    /// Builds the cursor image for `shape`.
    ///
    /// The image stays fully transparent unless both masks are present.
    pub fn from_shape<C>(shape: &PointerShape<'_>, converter: &C) -> Result<Self, PointerError>
    where
        C: PixelFormatConverter + ?Sized,
    {
        let mut image = Self::transparent(shape.width, shape.height, shape.hotspot_x, shape.hotspot_y);

        if let (Some(and_mask), Some(xor_mask)) = (shape.and_mask, shape.xor_mask) {
            alpha_cursor_convert(
                &mut image.pixels,
                MaskData {
                    width: shape.width,
                    height: shape.height,
                    xor_bpp: shape.xor_bpp,
                    xor_mask,
                    and_mask,
                },
                converter,
            )?;
        }

        Ok(image)
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.iter().all(|pixel| pixel >> 24 == 0)
    }
}

/// Message-agnostic mask data.
struct MaskData<'a> {
    width: u16,
    height: u16,
    xor_bpp: u16,
    xor_mask: &'a [u8],
    and_mask: &'a [u8],
}

/// Converts a pair of masks into `dst`, which must hold `width × height` pixels.
fn alpha_cursor_convert<C>(dst: &mut [u32], data: MaskData<'_>, converter: &C) -> Result<(), PointerError>
where
    C: PixelFormatConverter + ?Sized,
{
    if data.width == 0 || data.height == 0 {
        return Ok(());
    }

    let depth =
        ColorDepth::try_from(data.xor_bpp).map_err(|_| PointerError::NotSupportedBpp { bpp: data.xor_bpp })?;

    let flip_vertical = depth != ColorDepth::Mono;

    let and_stride = Stride::from_bits(data.width.into());
    let xor_stride = Stride::from_bits(usize::from(data.width) * usize::from(data.xor_bpp));

    if data.xor_mask.len() < xor_stride.length * usize::from(data.height) {
        return Err(PointerError::InvalidXorMaskSize {
            expected: xor_stride.length * usize::from(data.height),
            actual: data.xor_mask.len(),
        });
    }

    if data.and_mask.len() < and_stride.length * usize::from(data.height) {
        return Err(PointerError::InvalidAndMaskSize {
            expected: and_stride.length * usize::from(data.height),
            actual: data.and_mask.len(),
        });
    }

    let width = usize::from(data.width);

    for (row_idx, dst_row) in (0..data.height).zip(dst.chunks_exact_mut(width)) {
        let src_row = if flip_vertical {
            usize::from(data.height - row_idx - 1)
        } else {
            usize::from(row_idx)
        };

        let mut xor_cursor = ReadCursor::new(&data.xor_mask[src_row * xor_stride.length..]);
        let mut and_cursor = ReadCursor::new(&data.and_mask[src_row * and_stride.length..]);

        let mut color_reader = ColorStrideReader::new(depth);
        let mut bitmask_reader = BitmaskStrideReader::new();

        for (col_idx, pixel) in (0..data.width).zip(dst_row.iter_mut()) {
            let and_bit = bitmask_reader.next_bit(&mut and_cursor);
            let (rgb, alpha) = color_reader.next_pixel(&mut xor_cursor, converter)?;
            let color = argb(rgb, alpha);

            *pixel = if and_bit == 1 && color == OPAQUE_BLACK {
                TRANSPARENT
            } else if and_bit == 1 && color == OPAQUE_WHITE {
                if (row_idx + col_idx) % 2 == 0 {
                    OPAQUE_WHITE
                } else {
                    OPAQUE_BLACK
                }
            } else {
                color
            };
        }
    }

    Ok(())
}

fn argb([r, g, b]: [u8; 3], alpha: u8) -> u32 {
    (u32::from(alpha) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

#[derive(Clone, Copy)]
struct Stride {
    length: usize,
}

impl Stride {
    fn from_bits(bits: usize) -> Stride {
        Stride {
            length: bits.div_ceil(16) * 2,
        }
    }
}

struct BitmaskStrideReader {
    current_byte: u8,
    read_bits: usize,
}

impl BitmaskStrideReader {
    fn new() -> Self {
        Self {
            current_byte: 0,
            read_bits: 8,
        }
    }

    fn next_bit(&mut self, cursor: &mut ReadCursor<'_>) -> u8 {
        if self.read_bits == 8 {
            self.read_bits = 0;
            self.current_byte = cursor.read_u8();
        }

        let bit = (self.current_byte >> (7 - self.read_bits)) & 1;
        self.read_bits += 1;
        bit
    }
}

enum ColorStrideReader {
    Color { depth: ColorDepth },
    Bitmask(BitmaskStrideReader),
}

impl ColorStrideReader {
    fn new(depth: ColorDepth) -> Self {
        match depth {
            ColorDepth::Mono => Self::Bitmask(BitmaskStrideReader::new()),
            depth => Self::Color { depth },
        }
    }

    fn next_pixel<C>(&mut self, cursor: &mut ReadCursor<'_>, converter: &C) -> Result<([u8; 3], u8), PointerError>
    where
        C: PixelFormatConverter + ?Sized,
    {
        match self {
            ColorStrideReader::Color { depth } => {
                let (value, alpha) = match depth {
                    ColorDepth::Bpp8 => (u32::from(cursor.read_u8()), 0xFF),
                    ColorDepth::Bpp15 | ColorDepth::Bpp16 => (u32::from(cursor.read_u16()), 0xFF),
                    ColorDepth::Bpp24 => {
                        let [b, g, r] = cursor.read_array::<3>();
                        (u32::from_le_bytes([b, g, r, 0]), 0xFF)
                    }
                    ColorDepth::Bpp32 => {
                        let [b, g, r, a] = cursor.read_array::<4>();
                        (u32::from_le_bytes([b, g, r, 0]), a)
                    }
                    ColorDepth::Mono => unreachable!("monochrome masks are read by the bitmask reader"),
                };

                Ok((converter.color_to_rgb(value, *depth)?, alpha))
            }
            ColorStrideReader::Bitmask(bitmask) => {
                if bitmask.next_bit(cursor) == 1 {
                    Ok(([0xFF; 3], 0xFF))
                } else {
                    Ok(([0x00; 3], 0xFF))
                }
            }
        }
    }
}
