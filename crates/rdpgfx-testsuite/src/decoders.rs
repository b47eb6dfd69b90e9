//! Stand-ins for the external codec implementations.
//!
//! Each fake records its calls into a shared [`DecoderLog`] so tests can inspect it once
//! the decoder has been boxed into a `CodecDispatcher`.

use std::cell::RefCell;
use std::rc::Rc;

use rdpgfx_backend::codec::{DecodeError, InterleavedDecoder, JpegDecoder, TileDecoder, TileMessage};
use rdpgfx_graphics::image_processing::{ImageError, PixelFormat};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecoderLog {
    pub calls: usize,
    pub pixel_format: Option<PixelFormat>,
    /// Source and destination depths of the last run-length decode.
    pub bpp: Option<(u16, u16)>,
}

pub type SharedLog = Rc<RefCell<DecoderLog>>;

pub struct FakeTileDecoder {
    message: Option<TileMessage>,
    log: SharedLog,
}

impl FakeTileDecoder {
    /// A decoder answering every payload with `message`.
    pub fn new(message: Option<TileMessage>) -> (Self, SharedLog) {
        let log = SharedLog::default();
        (
            Self {
                message,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl TileDecoder for FakeTileDecoder {
    fn set_pixel_format(&mut self, format: PixelFormat) {
        self.log.borrow_mut().pixel_format = Some(format);
    }

    fn process_message(&mut self, _data: &[u8]) -> Option<TileMessage> {
        self.log.borrow_mut().calls += 1;
        self.message.clone()
    }
}

/// Outcome of a fake decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Fill the destination with the byte.
    Fill(u8),
    /// Write the byte into the first half of the destination, then fail as if the stream was truncated.
    FailAfter(u8),
}

pub struct FakeJpegDecoder {
    outcome: Outcome,
    log: SharedLog,
}

impl FakeJpegDecoder {
    pub fn new(outcome: Outcome) -> (Self, SharedLog) {
        let log = SharedLog::default();
        (
            Self {
                outcome,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl JpegDecoder for FakeJpegDecoder {
    fn decompress(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        _width: u16,
        _height: u16,
        bpp: u16,
    ) -> Result<(), DecodeError> {
        let mut log = self.log.borrow_mut();
        log.calls += 1;
        log.bpp = Some((bpp, bpp));

        apply(self.outcome, src, dst)
    }
}

pub struct FakeInterleavedDecoder {
    outcome: Outcome,
    log: SharedLog,
}

impl FakeInterleavedDecoder {
    pub fn new(outcome: Outcome) -> (Self, SharedLog) {
        let log = SharedLog::default();
        (
            Self {
                outcome,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl InterleavedDecoder for FakeInterleavedDecoder {
    fn decompress(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        _width: u16,
        _height: u16,
        src_bpp: u16,
        dst_bpp: u16,
    ) -> Result<(), DecodeError> {
        let mut log = self.log.borrow_mut();
        log.calls += 1;
        log.bpp = Some((src_bpp, dst_bpp));

        apply(self.outcome, src, dst)
    }
}

fn apply(outcome: Outcome, src: &[u8], dst: &mut [u8]) -> Result<(), DecodeError> {
    match outcome {
        Outcome::Fill(byte) => {
            dst.fill(byte);
            Ok(())
        }
        Outcome::FailAfter(byte) => {
            let half = dst.len() / 2;
            dst[..half].fill(byte);
            Err(DecodeError::Image(ImageError::OutOfBounds {
                required: dst.len(),
                available: src.len(),
            }))
        }
    }
}
