use rdpgfx_graphics::color_conversion::{ColorDepth, ColorError, PixelFormatConverter};
use rdpgfx_graphics::geometry::{InclusiveRectangle, InclusiveRectangleExt as _};
use rdpgfx_graphics::glyph::Stencil;
use rdpgfx_graphics::pointer::{CursorImage, PointerShape};

use crate::bitmap::{buffer_size, Bitmap, BitmapData};
use crate::codec::{CodecDispatcher, CodecId, DecodeError};
use crate::glyph::{Glyph, GlyphRun, GlyphShape};
use crate::native::{CursorHandle, Drawable, FillState, FillStyle, Image, NativeBackend, SurfaceHandle};
use crate::pointer::Pointer;
use crate::registry::{BitmapClass, GlyphClass, PointerClass};
use crate::surface::SurfaceTarget;
use crate::{BackendError, BackendErrorExt as _, BackendResult, Config};

/// Extent of the placeholder stencil installed between glyph draws.
const MONO_STENCIL_SIZE: u16 = 8;

/// Per-session rendering state on top of a native backend.
pub struct GraphicsContext<B: NativeBackend> {
    backend: B,
    config: Config,
    converter: Box<dyn PixelFormatConverter>,
    codecs: CodecDispatcher,
    target: SurfaceTarget,
    fill: FillState,
    mono_stencil: SurfaceHandle,
    hidden_cursor: CursorHandle,
}

impl<B: NativeBackend> core::fmt::Debug for GraphicsContext<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GraphicsContext")
            .field("config", &self.config)
            .field("codecs", &self.codecs)
            .field("target", &self.target)
            .field("fill", &self.fill)
            .field("mono_stencil", &self.mono_stencil)
            .field("hidden_cursor", &self.hidden_cursor)
            .finish_non_exhaustive()
    }
}

impl<B: NativeBackend> GraphicsContext<B> {
    /// Sets up the session: creates the placeholder mono stencil and the hidden cursor.
    pub fn new(mut backend: B, config: Config, codecs: CodecDispatcher) -> BackendResult<Self> {
        let mono_stencil = backend.create_surface(MONO_STENCIL_SIZE, MONO_STENCIL_SIZE, ColorDepth::Mono)?;
        backend.put_stencil(mono_stencil, &Stencil::blank(MONO_STENCIL_SIZE, MONO_STENCIL_SIZE))?;

        let hidden_cursor = match backend.create_cursor(&CursorImage::hidden()) {
            Ok(cursor) => cursor,
            Err(e) => {
                backend.free_surface(mono_stencil);
                return Err(e);
            }
        };

        let converter = Box::new(config.color_converter());

        debug!(
            color_depth = %config.color_depth,
            backend_depth = %backend.depth(),
            remote_app = config.remote_app,
            "Graphics context created"
        );

        Ok(Self {
            backend,
            config,
            converter,
            codecs,
            target: SurfaceTarget::default(),
            fill: FillState::solid(mono_stencil),
            mono_stencil,
            hidden_cursor,
        })
    }

    /// Replaces the color converter built from the configuration.
    #[must_use]
    pub fn with_converter(mut self, converter: Box<dyn PixelFormatConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn surface_target(&self) -> &SurfaceTarget {
        &self.target
    }

    pub fn fill_state(&self) -> &FillState {
        &self.fill
    }

    pub fn hidden_cursor(&self) -> CursorHandle {
        self.hidden_cursor
    }

    /// Draws a whole glyph run: background rectangle, each cell, then presentation.
    pub fn draw_glyph_run(&mut self, run: &GlyphRun<'_>) -> BackendResult<()> {
        self.begin_draw(run.x, run.y, run.width, run.height, run.bg, run.fg)?;

        for cell in run.cells {
            self.draw_glyph(cell.glyph, cell.x, cell.y)?;
        }

        self.end_draw(run.x, run.y, run.width, run.height, run.bg, run.fg)
    }

    /// Releases the session-wide resources and hands the native backend back.
    pub fn shutdown(mut self) -> B {
        self.backend.free_cursor(self.hidden_cursor);
        self.backend.free_surface(self.mono_stencil);

        debug!("Graphics context shut down");

        self.backend
    }

    fn convert_color(&self, color: u32) -> BackendResult<u32> {
        self.converter
            .convert_color(color, self.config.color_depth, self.backend.depth())
            .map_err(|e| color_error("convert color", e))
    }

    fn present(&mut self, rect: InclusiveRectangle) -> BackendResult<()> {
        if !self.config.remote_app {
            self.backend
                .copy_area(Drawable::Primary, Drawable::Window, &rect, rect.left, rect.top)?;
        }

        self.backend.invalidate_region(rect);

        Ok(())
    }

    fn free_bitmap_surface(&mut self, surface: SurfaceHandle) {
        self.backend.free_surface(surface);

        if self.target.active() == Drawable::Surface(surface) {
            self.target.set_primary();
        }
    }
}

impl<B: NativeBackend> BitmapClass for GraphicsContext<B> {
    fn new_bitmap(&mut self, bitmap: &mut Bitmap) -> BackendResult<()> {
        let depth = self.backend.depth();

        if let Some(stale) = bitmap.surface.take() {
            debug!(surface = ?stale, "Replacing the native surface of a reused bitmap");
            self.free_bitmap_surface(stale);
        }

        if !bitmap.ephemeral {
            bitmap.surface = Some(self.backend.create_surface(bitmap.width, bitmap.height, depth)?);
        }

        let Some(raw) = bitmap.data.as_deref() else {
            trace!(width = bitmap.width, height = bitmap.height, "Bitmap created without pixel data");
            return Ok(());
        };

        let converted = match self
            .converter
            .convert_image(raw, bitmap.width, bitmap.height, self.config.color_depth, depth)
        {
            Ok(converted) => converted,
            Err(e @ ColorError::OutOfMemory { .. }) => return Err(alloc_err!("convert bitmap", e)),
            Err(error) => {
                warn!(%error, "Failed to convert bitmap pixels");
                return Ok(());
            }
        };

        match bitmap.surface {
            Some(surface) => {
                if let Some(rect) = InclusiveRectangle::from_extent(0, 0, bitmap.width, bitmap.height) {
                    let image = Image {
                        data: &converted,
                        width: bitmap.width,
                        height: bitmap.height,
                        depth,
                    };

                    self.backend.put_image(Drawable::Surface(surface), &image, &rect)?;
                }
            }
            None => {
                bitmap.length = converted.len();
                bitmap.data = Some(converted);
                bitmap.bpp = depth.bits();
            }
        }

        Ok(())
    }

    fn free_bitmap(&mut self, bitmap: &mut Bitmap) {
        if let Some(surface) = bitmap.surface.take() {
            self.free_bitmap_surface(surface);
        }
    }

    fn paint_bitmap(&mut self, bitmap: &Bitmap) -> BackendResult<()> {
        let rect = bitmap.destination().ok_or_else(|| {
            reason_err!(
                "paint bitmap",
                "invalid destination rectangle ({}, {}, {}, {})",
                bitmap.left,
                bitmap.top,
                bitmap.right,
                bitmap.bottom
            )
        })?;

        let data = bitmap
            .data
            .as_deref()
            .ok_or_else(|| general_err!("bitmap has no pixel data"))?;

        let expected = bitmap.expected_size();
        if data.len() != expected {
            return Err(reason_err!(
                "paint bitmap",
                "pixel buffer holds {} bytes, expected {expected}",
                data.len()
            ));
        }

        let src_depth = ColorDepth::try_from(bitmap.bpp).map_err(|e| custom_err!("paint bitmap", e))?;
        let depth = self.backend.depth();

        let converted;
        let pixels = if src_depth == depth {
            data
        } else {
            converted = self
                .converter
                .convert_image(data, bitmap.width, bitmap.height, src_depth, depth)
                .map_err(|e| color_error("paint bitmap", e))?;
            converted.as_slice()
        };

        let image = Image {
            data: pixels,
            width: bitmap.width,
            height: bitmap.height,
            depth,
        };

        self.backend.put_image(Drawable::Primary, &image, &rect)?;

        self.present(rect)
    }

    #[instrument(skip_all, fields(codec_id = input.codec_id))]
    fn decompress_bitmap(&mut self, bitmap: &mut Bitmap, input: &BitmapData<'_>) -> BackendResult<()> {
        let size = buffer_size(input.width, input.height, input.bpp);

        let buffer = bitmap.data.get_or_insert_with(Vec::new);
        if let Some(additional) = size.checked_sub(buffer.len()) {
            buffer
                .try_reserve_exact(additional)
                .map_err(|e| alloc_err!("bitmap buffer", e))?;
        }
        buffer.resize(size, 0);

        bitmap.width = input.width;
        bitmap.height = input.height;

        let codec = CodecId::resolve(input.codec_id);
        if CodecId::from_u8(input.codec_id).is_none() {
            debug!(codec_id = input.codec_id, "Unknown codec, using the bitmap path");
        }

        let result = match codec {
            CodecId::NsCodec => self.nsc_process(bitmap, input),
            CodecId::RemoteFx => self.rfx_process(bitmap, input),
            CodecId::Jpeg => self.jpeg_process(bitmap, input),
            CodecId::None => self.bitmap_process(bitmap, input),
        };

        if let Err(error) = result {
            warn!(?codec, error = %error.report(), "Bitmap decompression failed");
        }

        bitmap.compressed = false;
        bitmap.length = size;
        bitmap.bpp = input.bpp;

        Ok(())
    }

    fn set_bitmap_surface(&mut self, bitmap: Option<&Bitmap>, primary: bool) -> BackendResult<()> {
        if primary {
            self.target.set_primary();
            return Ok(());
        }

        let surface = bitmap
            .and_then(|bitmap| bitmap.surface)
            .ok_or_else(|| general_err!("bitmap has no native surface"))?;

        self.target.set_offscreen(surface);

        Ok(())
    }

    fn rfx_process(&mut self, bitmap: &mut Bitmap, input: &BitmapData<'_>) -> BackendResult<()> {
        let dst = pixel_buffer(bitmap)?;

        self.codecs
            .decode_tile(input.data, dst, input.width, input.height)
            .map_err(|e| decode_error("rfx process", e))
    }

    fn nsc_process(&mut self, _bitmap: &mut Bitmap, _input: &BitmapData<'_>) -> BackendResult<()> {
        Err(BackendError::unsupported_codec("nsc process", CodecId::NsCodec))
    }

    fn jpeg_process(&mut self, bitmap: &mut Bitmap, input: &BitmapData<'_>) -> BackendResult<()> {
        let dst = pixel_buffer(bitmap)?;

        self.codecs
            .decode_jpeg(input.data, dst, input.width, input.height, input.bpp)
            .map_err(|e| decode_error("jpeg process", e))
    }

    fn bitmap_process(&mut self, bitmap: &mut Bitmap, input: &BitmapData<'_>) -> BackendResult<()> {
        let dst = pixel_buffer(bitmap)?;

        self.codecs
            .decode_bitmap(input.data, dst, input.width, input.height, input.bpp, input.compressed)
            .map_err(|e| decode_error("bitmap process", e))
    }
}

impl<B: NativeBackend> PointerClass for GraphicsContext<B> {
    fn new_pointer(&mut self, shape: &PointerShape<'_>) -> BackendResult<Pointer> {
        let image = CursorImage::from_shape(shape, &*self.converter).unwrap_or_else(|error| {
            warn!(%error, "Invalid pointer masks, using a transparent cursor");
            CursorImage::transparent(shape.width, shape.height, shape.hotspot_x, shape.hotspot_y)
        });

        let mut pointer = Pointer::from_shape(shape);
        pointer.cursor = Some(self.backend.create_cursor(&image)?);

        Ok(pointer)
    }

    fn free_pointer(&mut self, pointer: &mut Pointer) {
        if let Some(cursor) = pointer.cursor.take() {
            self.backend.free_cursor(cursor);
        }
    }

    fn set_pointer(&mut self, pointer: &Pointer) {
        // In remote application mode no window may have had focus yet.
        let Some(window) = self.backend.focused_window() else {
            return;
        };

        match pointer.cursor {
            Some(cursor) => self.backend.define_cursor(window, cursor),
            None => debug!("Pointer has no device cursor"),
        }
    }

    fn set_null_pointer(&mut self) {
        if let Some(window) = self.backend.focused_window() {
            self.backend.define_cursor(window, self.hidden_cursor);
        }
    }

    fn set_default_pointer(&mut self) {
        if let Some(window) = self.backend.focused_window() {
            self.backend.undefine_cursor(window);
        }
    }
}

impl<B: NativeBackend> GlyphClass for GraphicsContext<B> {
    fn new_glyph(&mut self, shape: &GlyphShape<'_>) -> BackendResult<Glyph> {
        let stencil = Stencil::from_mask(shape.cx, shape.cy, shape.mask).map_err(|e| custom_err!("new glyph", e))?;

        let surface = self.backend.create_surface(shape.cx, shape.cy, ColorDepth::Mono)?;

        if let Err(e) = self.backend.put_stencil(surface, &stencil) {
            self.backend.free_surface(surface);
            return Err(e);
        }

        Ok(Glyph {
            cx: shape.cx,
            cy: shape.cy,
            stencil: Some(surface),
        })
    }

    fn free_glyph(&mut self, glyph: &mut Glyph) {
        if let Some(surface) = glyph.stencil.take() {
            self.backend.free_surface(surface);
        }
    }

    fn draw_glyph(&mut self, glyph: &Glyph, x: u16, y: u16) -> BackendResult<()> {
        let stencil = glyph.stencil.ok_or_else(|| general_err!("glyph has no stencil"))?;

        let Some(rect) = InclusiveRectangle::from_extent(x, y, glyph.cx, glyph.cy) else {
            return Ok(());
        };

        self.fill.stipple = stencil;
        self.fill.origin = (x, y);

        let result = self.backend.fill_rectangle(self.target.active(), &rect, &self.fill);

        self.fill.stipple = self.mono_stencil;

        result
    }

    fn begin_draw(&mut self, x: u16, y: u16, width: u16, height: u16, bg: u32, fg: u32) -> BackendResult<()> {
        let bg = self.convert_color(bg)?;
        let fg = self.convert_color(fg)?;

        self.fill.style = FillStyle::Solid;
        self.fill.foreground = fg;

        if let Some(rect) = InclusiveRectangle::from_extent(x, y, width, height) {
            self.backend.fill_rectangle(self.target.active(), &rect, &self.fill)?;
        }

        self.fill.foreground = bg;
        self.fill.background = fg;
        self.fill.style = FillStyle::Stippled;

        Ok(())
    }

    fn end_draw(&mut self, x: u16, y: u16, width: u16, height: u16, _bg: u32, _fg: u32) -> BackendResult<()> {
        if !self.target.is_primary() {
            trace!("Glyph run drawn offscreen");
            return Ok(());
        }

        match InclusiveRectangle::from_extent(x, y, width, height) {
            Some(rect) => self.present(rect),
            None => Ok(()),
        }
    }
}

fn pixel_buffer(bitmap: &mut Bitmap) -> BackendResult<&mut [u8]> {
    bitmap
        .data
        .as_deref_mut()
        .ok_or_else(|| general_err!("bitmap has no pixel buffer"))
}

fn color_error(context: &'static str, error: ColorError) -> BackendError {
    match error {
        ColorError::OutOfMemory { .. } => alloc_err!(context, error),
        _ => custom_err!(context, error),
    }
}

fn decode_error(context: &'static str, error: DecodeError) -> BackendError {
    match error {
        DecodeError::Unsupported { codec } => BackendError::unsupported_codec(context, codec).with_source(error),
        _ => BackendError::decode(context, error),
    }
}
