//! Codec selection for bitmap updates.
//!
//! The compressed formats themselves are decoded by external decoders plugged into the
//! [`CodecDispatcher`]; this module only routes updates to them and normalizes their output
//! into the bitmap pixel buffer.

use core::fmt;

use rdpgfx_graphics::image_processing::{flip_vertical, ImageError, PixelFormat};

const TILE_SIZE: usize = 64;
const TILE_PIXEL_FORMAT: PixelFormat = PixelFormat::BgrA32;
const TILE_STRIDE: usize = TILE_SIZE * TILE_PIXEL_FORMAT.bytes_per_pixel();
const TILE_OUTPUT_BYTES_PER_PIXEL: usize = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CodecId {
    None = 0x0,
    NsCodec = 0x1,
    Jpeg = 0x2,
    RemoteFx = 0x3,
}

impl CodecId {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::NsCodec),
            2 => Some(Self::Jpeg),
            3 => Some(Self::RemoteFx),
            _ => None,
        }
    }

    /// Resolves a wire identifier, unknown identifiers taking the legacy path.
    pub const fn resolve(value: u8) -> Self {
        match Self::from_u8(value) {
            Some(codec) => codec,
            None => Self::None,
        }
    }
}

#[derive(Debug)]
pub enum DecodeError {
    /// The tile decoder did not produce a message.
    NoMessage,
    /// The decoded message holds no tile.
    EmptyMessage,
    /// The destination extent exceeds the single tile being copied.
    TileClipped { width: u16, height: u16 },
    MissingDecoder { codec: CodecId },
    Unsupported { codec: CodecId },
    Image(ImageError),
    Decoder(Box<dyn core::error::Error + Send + Sync>),
}

impl DecodeError {
    pub fn decoder<E>(error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Decoder(Box::new(error))
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NoMessage => write!(f, "decoder produced no message"),
            DecodeError::EmptyMessage => write!(f, "decoded message holds no tile"),
            DecodeError::TileClipped { width, height } => {
                write!(f, "{width}x{height} bitmap does not fit a single {TILE_SIZE}x{TILE_SIZE} tile")
            }
            DecodeError::MissingDecoder { codec } => write!(f, "no decoder registered for {codec:?}"),
            DecodeError::Unsupported { codec } => write!(f, "{codec:?} is not supported"),
            DecodeError::Image(_) => write!(f, "invalid image data"),
            DecodeError::Decoder(_) => write!(f, "decoder failure"),
        }
    }
}

impl core::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            DecodeError::Image(e) => Some(e),
            DecodeError::Decoder(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub x: u16,
    pub y: u16,
    /// 64×64 pixels in the configured pixel format, 64 pixels per row.
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMessage {
    pub tiles: Vec<Tile>,
}

/// Tile-transform (RemoteFX) decoder.
pub trait TileDecoder {
    fn set_pixel_format(&mut self, format: PixelFormat);

    /// Returns `None` when `data` cannot be decoded.
    fn process_message(&mut self, data: &[u8]) -> Option<TileMessage>;
}

pub trait JpegDecoder {
    /// Decodes `src` into `dst` as a `width × height` image at `bpp`.
    fn decompress(&mut self, src: &[u8], dst: &mut [u8], width: u16, height: u16, bpp: u16) -> Result<(), DecodeError>;
}

/// Legacy run-length (interleaved / planar) bitmap decoder.
pub trait InterleavedDecoder {
    fn decompress(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        width: u16,
        height: u16,
        src_bpp: u16,
        dst_bpp: u16,
    ) -> Result<(), DecodeError>;
}

/// Holds the external decoders and routes bitmap payloads to them.
#[derive(Default)]
pub struct CodecDispatcher {
    tile: Option<Box<dyn TileDecoder>>,
    jpeg: Option<Box<dyn JpegDecoder>>,
    interleaved: Option<Box<dyn InterleavedDecoder>>,
}

impl fmt::Debug for CodecDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecDispatcher")
            .field("tile", &self.tile.is_some())
            .field("jpeg", &self.jpeg.is_some())
            .field("interleaved", &self.interleaved.is_some())
            .finish()
    }
}

impl CodecDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tile_decoder(mut self, decoder: Box<dyn TileDecoder>) -> Self {
        self.tile = Some(decoder);
        self
    }

    #[must_use]
    pub fn with_jpeg_decoder(mut self, decoder: Box<dyn JpegDecoder>) -> Self {
        self.jpeg = Some(decoder);
        self
    }

    #[must_use]
    pub fn with_interleaved_decoder(mut self, decoder: Box<dyn InterleavedDecoder>) -> Self {
        self.interleaved = Some(decoder);
        self
    }

    /// Decodes a tile-transform message and copies the RGB channels of its first tile into `dst`,
    /// 3 bytes per pixel with `width` pixels per row.
    pub fn decode_tile(&mut self, src: &[u8], dst: &mut [u8], width: u16, height: u16) -> Result<(), DecodeError> {
        let decoder = self.tile.as_deref_mut().ok_or(DecodeError::MissingDecoder {
            codec: CodecId::RemoteFx,
        })?;

        decoder.set_pixel_format(TILE_PIXEL_FORMAT);

        let message = decoder.process_message(src).ok_or(DecodeError::NoMessage)?;

        if message.tiles.len() > 1 {
            debug!(tiles = message.tiles.len(), "Only the first tile is copied");
        }

        let tile = message.tiles.first().ok_or(DecodeError::EmptyMessage)?;

        copy_tile(tile, dst, width, height)
    }

    pub fn decode_jpeg(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        width: u16,
        height: u16,
        bpp: u16,
    ) -> Result<(), DecodeError> {
        let decoder = self
            .jpeg
            .as_deref_mut()
            .ok_or(DecodeError::MissingDecoder { codec: CodecId::Jpeg })?;

        decoder.decompress(src, dst, width, height, bpp)
    }

    /// Legacy path: run-length decoding of compressed payloads, scanline flip of raw ones.
    pub fn decode_bitmap(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        width: u16,
        height: u16,
        bpp: u16,
        compressed: bool,
    ) -> Result<(), DecodeError> {
        if compressed {
            let decoder = self
                .interleaved
                .as_deref_mut()
                .ok_or(DecodeError::MissingDecoder { codec: CodecId::None })?;

            decoder.decompress(src, dst, width, height, bpp, bpp)
        } else {
            flip_vertical(src, dst, width, height, bpp).map_err(DecodeError::Image)
        }
    }
}

fn copy_tile(tile: &Tile, dst: &mut [u8], width: u16, height: u16) -> Result<(), DecodeError> {
    let src_bpp = TILE_PIXEL_FORMAT.bytes_per_pixel();
    let dst_stride = usize::from(width) * TILE_OUTPUT_BYTES_PER_PIXEL;

    let columns = usize::from(width).min(TILE_SIZE);
    let rows = usize::from(height).min(TILE_SIZE);

    for row in 0..rows {
        let src_start = row * TILE_STRIDE;
        let src_end = src_start + columns * src_bpp;
        let src_row = tile.data.get(src_start..src_end).ok_or(DecodeError::Image(ImageError::OutOfBounds {
            required: src_end,
            available: tile.data.len(),
        }))?;

        let dst_start = row * dst_stride;
        let dst_end = dst_start + columns * TILE_OUTPUT_BYTES_PER_PIXEL;
        let available = dst.len();
        let dst_row = dst
            .get_mut(dst_start..dst_end)
            .ok_or(DecodeError::Image(ImageError::OutOfBounds {
                required: dst_end,
                available,
            }))?;

        for (dst_pixel, src_pixel) in dst_row
            .chunks_exact_mut(TILE_OUTPUT_BYTES_PER_PIXEL)
            .zip(src_row.chunks_exact(src_bpp))
        {
            dst_pixel.copy_from_slice(&src_pixel[..TILE_OUTPUT_BYTES_PER_PIXEL]);
        }
    }

    if columns < usize::from(width) || rows < usize::from(height) {
        return Err(DecodeError::TileClipped { width, height });
    }

    Ok(())
}
