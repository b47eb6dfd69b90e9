use core::fmt;

use rdpgfx_graphics::color_conversion::bytes_per_pixel;
use rdpgfx_graphics::geometry::{InclusiveRectangle, InclusiveRectangleExt as _};

use crate::native::SurfaceHandle;

/// Bitmap cache entry.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bitmap {
    /// Pixel extent of the pixel buffer.
    pub width: u16,
    pub height: u16,
    /// Destination rectangle on the primary surface, inclusive.
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub bpp: u16,
    pub compressed: bool,
    /// Kept as an in-memory buffer only, never bound to a native surface.
    pub ephemeral: bool,
    /// Length of the payload, or of the pixel buffer once decompressed.
    pub length: usize,
    pub data: Option<Vec<u8>>,
    pub surface: Option<SurfaceHandle>,
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("left", &self.left)
            .field("top", &self.top)
            .field("right", &self.right)
            .field("bottom", &self.bottom)
            .field("bpp", &self.bpp)
            .field("compressed", &self.compressed)
            .field("ephemeral", &self.ephemeral)
            .field("length", &self.length)
            .field("data_len", &self.data.as_ref().map(Vec::len))
            .field("surface", &self.surface)
            .finish()
    }
}

impl Bitmap {
    pub fn new(width: u16, height: u16, bpp: u16) -> Self {
        Self {
            width,
            height,
            bpp,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_destination(mut self, left: u16, top: u16, right: u16, bottom: u16) -> Self {
        self.left = left;
        self.top = top;
        self.right = right;
        self.bottom = bottom;
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.length = data.len();
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Destination rectangle, `None` when inverted.
    pub fn destination(&self) -> Option<InclusiveRectangle> {
        let rect = InclusiveRectangle {
            left: self.left,
            top: self.top,
            right: self.right,
            bottom: self.bottom,
        };

        rect.is_valid().then_some(rect)
    }

    /// Pixel buffer size for the current extent and depth.
    pub fn expected_size(&self) -> usize {
        buffer_size(self.width, self.height, self.bpp)
    }
}

/// `width × height × ceil(bpp / 8)`
pub fn buffer_size(width: u16, height: u16, bpp: u16) -> usize {
    usize::from(width) * usize::from(height) * bytes_per_pixel(bpp)
}

/// Bitmap update payload handed to decompression.
#[derive(Clone, Copy)]
pub struct BitmapData<'a> {
    pub data: &'a [u8],
    pub width: u16,
    pub height: u16,
    pub bpp: u16,
    pub compressed: bool,
    /// Wire codec identifier.
    pub codec_id: u8,
}

impl fmt::Debug for BitmapData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapData")
            .field("data_len", &self.data.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bpp", &self.bpp)
            .field("compressed", &self.compressed)
            .field("codec_id", &self.codec_id)
            .finish()
    }
}
