//! Color depth conversion between the remote session and the local backend.
//!
//! Packed color values follow the layout of uncompressed bitmap pixels read as
//! little-endian integers:
//!
//! - 32 and 24 bpp: `0x00RRGGBB` (bytes `B, G, R[, A]`), the alpha byte of 32 bpp is ignored on input;
//! - 16 bpp: RGB 5-6-5;
//! - 15 bpp: RGB 5-5-5;
//! - 8 bpp: palette index.
//!
//! The BGR conversion variant swaps the red and blue channels, which is how a
//! color-inverted session is rendered on an RGB visual.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorDepth {
    Mono,
    Bpp8,
    Bpp15,
    Bpp16,
    Bpp24,
    Bpp32,
}

impl ColorDepth {
    pub const fn bits(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Bpp8 => 8,
            Self::Bpp15 => 15,
            Self::Bpp16 => 16,
            Self::Bpp24 => 24,
            Self::Bpp32 => 32,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        bytes_per_pixel(self.bits())
    }
}

impl TryFrom<u16> for ColorDepth {
    type Error = ColorError;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(Self::Mono),
            8 => Ok(Self::Bpp8),
            15 => Ok(Self::Bpp15),
            16 => Ok(Self::Bpp16),
            24 => Ok(Self::Bpp24),
            32 => Ok(Self::Bpp32),
            bits => Err(ColorError::UnsupportedDepth { bits }),
        }
    }
}

impl fmt::Display for ColorDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpp", self.bits())
    }
}

/// Number of whole bytes holding one pixel of `bpp` bits.
pub const fn bytes_per_pixel(bpp: u16) -> usize {
    (bpp as usize).div_ceil(8)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    UnsupportedDepth { bits: u16 },
    InvalidImageSize { expected: usize, actual: usize },
    OutOfMemory { requested: usize },
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::UnsupportedDepth { bits } => write!(f, "unsupported color depth: {bits} bpp"),
            ColorError::InvalidImageSize { expected, actual } => {
                write!(f, "invalid image size: expected at least {expected} bytes, got {actual}")
            }
            ColorError::OutOfMemory { requested } => write!(f, "failed to allocate {requested} bytes"),
        }
    }
}

impl core::error::Error for ColorError {}

/// Convert a 16-bit RDP color to RGB representation. Input value should be represented in
/// little-endian format.
pub fn rdp_16bit_to_rgb(color: u16) -> [u8; 3] {
    let r = (((((color >> 11) & 0x1f) * 527) + 23) >> 6) as u8;
    let g = (((((color >> 5) & 0x3f) * 259) + 33) >> 6) as u8;
    let b = ((((color & 0x1f) * 527) + 23) >> 6) as u8;
    [r, g, b]
}

/// Convert a 15-bit (5-5-5) RDP color to RGB representation.
pub fn rdp_15bit_to_rgb(color: u16) -> [u8; 3] {
    let expand = |v: u16| -> u8 {
        let v = (v & 0x1f) as u8;
        (v << 3) | (v >> 2)
    };

    [expand(color >> 10), expand(color >> 5), expand(color)]
}

/// 8 bpp color table.
///
/// Defaults to a 3-3-2 RGB cube until the session provides its own palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: [[u8; 3]; 256],
}

impl Palette {
    pub fn from_entries(entries: [[u8; 3]; 256]) -> Self {
        Self { entries }
    }

    pub fn get(&self, index: u8) -> [u8; 3] {
        self.entries[usize::from(index)]
    }

    pub fn set(&mut self, index: u8, rgb: [u8; 3]) {
        self.entries[usize::from(index)] = rgb;
    }
}

impl Default for Palette {
    fn default() -> Self {
        let mut entries = [[0; 3]; 256];

        for (index, entry) in (0u16..).zip(entries.iter_mut()) {
            let r = (index >> 5) & 0x07;
            let g = (index >> 2) & 0x07;
            let b = index & 0x03;
            *entry = [(r * 255 / 7) as u8, (g * 255 / 7) as u8, (b * 255 / 3) as u8];
        }

        Self { entries }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// Converts colors and pixel data from the remote color depth to the backend depth.
pub trait PixelFormatConverter {
    /// Converts a single packed color. The channel order follows the converter's inversion setting.
    fn convert_color(&self, color: u32, src: ColorDepth, dst: ColorDepth) -> Result<u32, ColorError>;

    /// Converts a tightly packed `width × height` image, returning a freshly allocated buffer.
    fn convert_image(
        &self,
        src: &[u8],
        width: u16,
        height: u16,
        src_depth: ColorDepth,
        dst_depth: ColorDepth,
    ) -> Result<Vec<u8>, ColorError>;

    /// Expands a packed color into its red, green and blue channels.
    fn color_to_rgb(&self, color: u32, depth: ColorDepth) -> Result<[u8; 3], ColorError>;
}

#[derive(Debug, Clone, Default)]
pub struct ColorConverter {
    /// Render the session with red and blue swapped.
    pub invert: bool,
    /// Set the alpha byte of 32 bpp output to opaque.
    pub alpha: bool,
    pub palette: Palette,
}

impl ColorConverter {
    pub fn new(invert: bool, alpha: bool, palette: Palette) -> Self {
        Self { invert, alpha, palette }
    }

    pub fn convert_color_rgb(&self, color: u32, src: ColorDepth, dst: ColorDepth) -> Result<u32, ColorError> {
        self.convert_color_with_order(color, src, dst, ChannelOrder::Rgb)
    }

    pub fn convert_color_bgr(&self, color: u32, src: ColorDepth, dst: ColorDepth) -> Result<u32, ColorError> {
        self.convert_color_with_order(color, src, dst, ChannelOrder::Bgr)
    }

    pub fn convert_color_with_order(
        &self,
        color: u32,
        src: ColorDepth,
        dst: ColorDepth,
        order: ChannelOrder,
    ) -> Result<u32, ColorError> {
        let rgb = self.color_to_rgb(color, src)?;
        self.rgb_to_color(apply_order(rgb, order), dst)
    }

    /// Packs RGB channels at the given depth.
    pub fn rgb_to_color(&self, [r, g, b]: [u8; 3], depth: ColorDepth) -> Result<u32, ColorError> {
        let (r, g, b) = (u32::from(r), u32::from(g), u32::from(b));

        match depth {
            ColorDepth::Bpp32 => {
                let alpha = if self.alpha { 0xFF00_0000 } else { 0 };
                Ok(alpha | (r << 16) | (g << 8) | b)
            }
            ColorDepth::Bpp24 => Ok((r << 16) | (g << 8) | b),
            ColorDepth::Bpp16 => Ok(((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)),
            ColorDepth::Bpp15 => Ok(((r >> 3) << 10) | ((g >> 3) << 5) | (b >> 3)),
            ColorDepth::Bpp8 | ColorDepth::Mono => Err(ColorError::UnsupportedDepth { bits: depth.bits() }),
        }
    }

    fn channel_order(&self) -> ChannelOrder {
        if self.invert {
            ChannelOrder::Bgr
        } else {
            ChannelOrder::Rgb
        }
    }
}

impl PixelFormatConverter for ColorConverter {
    fn convert_color(&self, color: u32, src: ColorDepth, dst: ColorDepth) -> Result<u32, ColorError> {
        self.convert_color_with_order(color, src, dst, self.channel_order())
    }

    fn convert_image(
        &self,
        src: &[u8],
        width: u16,
        height: u16,
        src_depth: ColorDepth,
        dst_depth: ColorDepth,
    ) -> Result<Vec<u8>, ColorError> {
        if src_depth == ColorDepth::Mono {
            return Err(ColorError::UnsupportedDepth { bits: 1 });
        }

        let pixel_count = usize::from(width) * usize::from(height);
        let src_bpp = src_depth.bytes_per_pixel();
        let dst_bpp = dst_depth.bytes_per_pixel();

        let expected = pixel_count * src_bpp;
        if src.len() < expected {
            return Err(ColorError::InvalidImageSize {
                expected,
                actual: src.len(),
            });
        }

        let requested = pixel_count * dst_bpp;
        let mut dst = Vec::new();
        dst.try_reserve_exact(requested)
            .map_err(|_| ColorError::OutOfMemory { requested })?;

        let order = self.channel_order();

        for pixel in src[..expected].chunks_exact(src_bpp) {
            let rgb = self.color_to_rgb(read_pixel(pixel), src_depth)?;
            let value = self.rgb_to_color(apply_order(rgb, order), dst_depth)?;
            dst.extend_from_slice(&value.to_le_bytes()[..dst_bpp]);
        }

        Ok(dst)
    }

    fn color_to_rgb(&self, color: u32, depth: ColorDepth) -> Result<[u8; 3], ColorError> {
        let rgb = match depth {
            ColorDepth::Mono => {
                if color & 1 == 0 {
                    [0x00; 3]
                } else {
                    [0xFF; 3]
                }
            }
            ColorDepth::Bpp8 => self.palette.get((color & 0xFF) as u8),
            ColorDepth::Bpp15 => rdp_15bit_to_rgb((color & 0x7FFF) as u16),
            ColorDepth::Bpp16 => rdp_16bit_to_rgb((color & 0xFFFF) as u16),
            ColorDepth::Bpp24 | ColorDepth::Bpp32 => [(color >> 16) as u8, (color >> 8) as u8, color as u8],
        };

        Ok(rgb)
    }
}

fn apply_order([r, g, b]: [u8; 3], order: ChannelOrder) -> [u8; 3] {
    match order {
        ChannelOrder::Rgb => [r, g, b],
        ChannelOrder::Bgr => [b, g, r],
    }
}

/// Reads one little-endian pixel of `pixel.len()` (1 to 4) bytes.
pub fn read_pixel(pixel: &[u8]) -> u32 {
    pixel
        .iter()
        .take(4)
        .rev()
        .fold(0u32, |value, byte| (value << 8) | u32::from(*byte))
}
