//! In-memory [`NativeBackend`] with no windowing system behind it.

use std::collections::HashMap;

use rdpgfx_graphics::color_conversion::{read_pixel, ColorDepth};
use rdpgfx_graphics::geometry::{InclusiveRectangle, InclusiveRectangleExt as _, Rectangle as _};
use rdpgfx_graphics::glyph::Stencil;
use rdpgfx_graphics::image_processing::{ImageRegion, ImageRegionMut};
use rdpgfx_graphics::pointer::CursorImage;

use crate::native::{
    CursorHandle, Drawable, FillState, FillStyle, Image, NativeBackend, SurfaceHandle, WindowHandle,
};
use crate::BackendResult;

/// Pixel buffer at a fixed depth, rows packed without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    depth: ColorDepth,
    data: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u16, height: u16, depth: ColorDepth) -> BackendResult<Self> {
        let size = usize::from(width) * usize::from(height) * depth.bytes_per_pixel();

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|e| alloc_err!("framebuffer", e))?;
        data.resize(size, 0);

        Ok(Self {
            width,
            height,
            depth,
            data,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn stride(&self) -> usize {
        usize::from(self.width) * self.depth.bytes_per_pixel()
    }

    pub fn bounds(&self) -> Option<InclusiveRectangle> {
        InclusiveRectangle::from_extent(0, 0, self.width, self.height)
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<u32> {
        let start = self.offset(x, y)?;
        self.data
            .get(start..start + self.depth.bytes_per_pixel())
            .map(read_pixel)
    }

    fn set_pixel(&mut self, x: u16, y: u16, value: u32) {
        let bytes_per_pixel = self.depth.bytes_per_pixel();

        if let Some(pixel) = self
            .offset(x, y)
            .and_then(|start| self.data.get_mut(start..start + bytes_per_pixel))
        {
            pixel.copy_from_slice(&value.to_le_bytes()[..bytes_per_pixel]);
        }
    }

    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * self.stride() + usize::from(x) * self.depth.bytes_per_pixel())
    }

    /// Copies `rect`, clipped to the framebuffer, into a tightly packed buffer.
    ///
    /// Returns `None` when `rect` lies outside of the framebuffer.
    fn read_region(&self, rect: &InclusiveRectangle) -> BackendResult<Option<(InclusiveRectangle, Vec<u8>)>> {
        let Some(rect) = self.bounds().and_then(|bounds| bounds.intersect(rect)) else {
            return Ok(None);
        };

        let bytes_per_pixel = self.depth.bytes_per_pixel();
        let row_len = usize::from(rect.width()) * bytes_per_pixel;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(row_len * usize::from(rect.height()))
            .map_err(|e| alloc_err!("copy area", e))?;

        for y in rect.top..=rect.bottom {
            let start = usize::from(y) * self.stride() + usize::from(rect.left) * bytes_per_pixel;
            let row = self
                .data
                .get(start..start + row_len)
                .ok_or_else(|| general_err!("source row out of bounds"))?;
            pixels.extend_from_slice(row);
        }

        Ok(Some((rect, pixels)))
    }

    /// Writes a tightly packed `src_width`-pixel wide image with its origin at the corner of `rect`,
    /// clipped to both `rect` and the framebuffer.
    fn write_region(
        &mut self,
        rect: &InclusiveRectangle,
        src: &[u8],
        src_width: u16,
        src_height: u16,
    ) -> BackendResult<()> {
        let Some(src_rect) = InclusiveRectangle::from_extent(0, 0, src_width, src_height) else {
            return Ok(());
        };

        let Some(dst_rect) = self.bounds().and_then(|bounds| bounds.intersect(rect)) else {
            return Ok(());
        };

        let bytes_per_pixel = self.depth.bytes_per_pixel();
        let step = self.stride();

        let source = ImageRegion {
            region: src_rect,
            step: usize::from(src_width) * bytes_per_pixel,
            bytes_per_pixel,
            data: src,
        };

        let mut destination = ImageRegionMut {
            region: dst_rect,
            step,
            bytes_per_pixel,
            data: &mut self.data,
        };

        source
            .copy_to(&mut destination)
            .map_err(|e| custom_err!("write region", e))
    }
}

#[derive(Debug, Clone)]
enum SurfaceStore {
    Pixels(Framebuffer),
    Stencil(Stencil),
}

/// Software rendering backend.
///
/// Keeps the primary surface, the visible window and every offscreen surface in memory.
/// Mono surfaces are kept as stencils. Cursors are kept as their staging images.
#[derive(Debug)]
pub struct SoftwareBackend {
    depth: ColorDepth,
    primary: Framebuffer,
    window: Framebuffer,
    surfaces: HashMap<SurfaceHandle, SurfaceStore>,
    cursors: HashMap<CursorHandle, CursorImage>,
    window_cursors: HashMap<WindowHandle, CursorHandle>,
    focused_window: Option<WindowHandle>,
    invalidated: Vec<InclusiveRectangle>,
    next_handle: u32,
}

impl SoftwareBackend {
    /// Creates a desktop of `width × height` pixels at `depth`.
    pub fn new(width: u16, height: u16, depth: ColorDepth) -> BackendResult<Self> {
        if depth == ColorDepth::Mono || depth == ColorDepth::Bpp8 {
            return Err(reason_err!("software backend", "unsupported backend depth: {depth}"));
        }

        Ok(Self {
            depth,
            primary: Framebuffer::new(width, height, depth)?,
            window: Framebuffer::new(width, height, depth)?,
            surfaces: HashMap::new(),
            cursors: HashMap::new(),
            window_cursors: HashMap::new(),
            focused_window: None,
            invalidated: Vec::new(),
            next_handle: 1,
        })
    }

    pub fn set_focused_window(&mut self, window: Option<WindowHandle>) {
        self.focused_window = window;
    }

    pub fn primary(&self) -> &Framebuffer {
        &self.primary
    }

    pub fn window(&self) -> &Framebuffer {
        &self.window
    }

    pub fn surface(&self, surface: SurfaceHandle) -> Option<&Framebuffer> {
        match self.surfaces.get(&surface) {
            Some(SurfaceStore::Pixels(framebuffer)) => Some(framebuffer),
            _ => None,
        }
    }

    pub fn stencil(&self, surface: SurfaceHandle) -> Option<&Stencil> {
        match self.surfaces.get(&surface) {
            Some(SurfaceStore::Stencil(stencil)) => Some(stencil),
            _ => None,
        }
    }

    pub fn cursor(&self, cursor: CursorHandle) -> Option<&CursorImage> {
        self.cursors.get(&cursor)
    }

    /// Cursor defined on `window`, `None` for the platform default.
    pub fn window_cursor(&self, window: WindowHandle) -> Option<CursorHandle> {
        self.window_cursors.get(&window).copied()
    }

    pub fn invalidated(&self) -> &[InclusiveRectangle] {
        &self.invalidated
    }

    pub fn take_invalidated(&mut self) -> Vec<InclusiveRectangle> {
        core::mem::take(&mut self.invalidated)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn cursor_count(&self) -> usize {
        self.cursors.len()
    }

    fn allocate_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1);
        handle
    }

    fn framebuffer(&self, drawable: Drawable) -> BackendResult<&Framebuffer> {
        match drawable {
            Drawable::Primary => Ok(&self.primary),
            Drawable::Window => Ok(&self.window),
            Drawable::Surface(surface) => match self.surfaces.get(&surface) {
                Some(SurfaceStore::Pixels(framebuffer)) => Ok(framebuffer),
                Some(SurfaceStore::Stencil(_)) => Err(general_err!("drawable is a mono surface")),
                None => Err(reason_err!("drawable", "unknown surface {}", surface.0)),
            },
        }
    }

    fn framebuffer_mut(&mut self, drawable: Drawable) -> BackendResult<&mut Framebuffer> {
        match drawable {
            Drawable::Primary => Ok(&mut self.primary),
            Drawable::Window => Ok(&mut self.window),
            Drawable::Surface(surface) => match self.surfaces.get_mut(&surface) {
                Some(SurfaceStore::Pixels(framebuffer)) => Ok(framebuffer),
                Some(SurfaceStore::Stencil(_)) => Err(general_err!("drawable is a mono surface")),
                None => Err(reason_err!("drawable", "unknown surface {}", surface.0)),
            },
        }
    }
}

impl NativeBackend for SoftwareBackend {
    fn depth(&self) -> ColorDepth {
        self.depth
    }

    fn create_surface(&mut self, width: u16, height: u16, depth: ColorDepth) -> BackendResult<SurfaceHandle> {
        let store = if depth == ColorDepth::Mono {
            SurfaceStore::Stencil(Stencil::blank(width, height))
        } else {
            SurfaceStore::Pixels(Framebuffer::new(width, height, depth)?)
        };

        let surface = SurfaceHandle(self.allocate_handle());
        trace!(?surface, width, height, %depth, "Surface created");
        self.surfaces.insert(surface, store);

        Ok(surface)
    }

    fn free_surface(&mut self, surface: SurfaceHandle) {
        if self.surfaces.remove(&surface).is_none() {
            warn!(?surface, "Freeing an unknown surface");
        }
    }

    fn put_image(&mut self, dst: Drawable, image: &Image<'_>, rect: &InclusiveRectangle) -> BackendResult<()> {
        let framebuffer = self.framebuffer_mut(dst)?;

        if image.depth != framebuffer.depth() {
            return Err(reason_err!(
                "put image",
                "image depth {} does not match surface depth {}",
                image.depth,
                framebuffer.depth()
            ));
        }

        let required = image.stride() * usize::from(image.height);
        if image.data.len() < required {
            return Err(reason_err!(
                "put image",
                "image holds {} bytes, expected {required}",
                image.data.len()
            ));
        }

        framebuffer.write_region(rect, image.data, image.width, image.height)
    }

    fn put_stencil(&mut self, surface: SurfaceHandle, stencil: &Stencil) -> BackendResult<()> {
        match self.surfaces.get_mut(&surface) {
            Some(SurfaceStore::Stencil(current))
                if current.width() == stencil.width() && current.height() == stencil.height() =>
            {
                *current = stencil.clone();
                Ok(())
            }
            Some(_) => Err(reason_err!(
                "put stencil",
                "surface {} is not a {}x{} mono surface",
                surface.0,
                stencil.width(),
                stencil.height()
            )),
            None => Err(reason_err!("put stencil", "unknown surface {}", surface.0)),
        }
    }

    fn copy_area(
        &mut self,
        src: Drawable,
        dst: Drawable,
        rect: &InclusiveRectangle,
        dst_x: u16,
        dst_y: u16,
    ) -> BackendResult<()> {
        let Some((area, pixels)) = self.framebuffer(src)?.read_region(rect)? else {
            trace!(?rect, "Copied area lies outside of the source");
            return Ok(());
        };

        let Some(dst_rect) = InclusiveRectangle::from_extent(dst_x, dst_y, area.width(), area.height()) else {
            return Ok(());
        };

        self.framebuffer_mut(dst)?
            .write_region(&dst_rect, &pixels, area.width(), area.height())
    }

    fn fill_rectangle(&mut self, dst: Drawable, rect: &InclusiveRectangle, fill: &FillState) -> BackendResult<()> {
        let stipple = match fill.style {
            FillStyle::Solid => None,
            FillStyle::Stippled => match self.surfaces.get(&fill.stipple) {
                Some(SurfaceStore::Stencil(stencil)) => Some(stencil.clone()),
                _ => return Err(reason_err!("fill rectangle", "invalid stipple surface {}", fill.stipple.0)),
            },
        };

        let framebuffer = self.framebuffer_mut(dst)?;

        let Some(area) = framebuffer.bounds().and_then(|bounds| bounds.intersect(rect)) else {
            return Ok(());
        };

        let origin = (i32::from(fill.origin.0), i32::from(fill.origin.1));

        for y in area.top..=area.bottom {
            for x in area.left..=area.right {
                let paint = stipple
                    .as_ref()
                    .is_none_or(|stencil| stencil.is_set_tiled(i32::from(x), i32::from(y), origin));

                if paint {
                    framebuffer.set_pixel(x, y, fill.foreground);
                }
            }
        }

        Ok(())
    }

    fn create_cursor(&mut self, image: &CursorImage) -> BackendResult<CursorHandle> {
        let cursor = CursorHandle(self.allocate_handle());
        trace!(?cursor, width = image.width, height = image.height, "Cursor created");
        self.cursors.insert(cursor, image.clone());

        Ok(cursor)
    }

    fn free_cursor(&mut self, cursor: CursorHandle) {
        if self.cursors.remove(&cursor).is_none() {
            warn!(?cursor, "Freeing an unknown cursor");
        }

        self.window_cursors.retain(|_, defined| *defined != cursor);
    }

    fn define_cursor(&mut self, window: WindowHandle, cursor: CursorHandle) {
        self.window_cursors.insert(window, cursor);
    }

    fn undefine_cursor(&mut self, window: WindowHandle) {
        self.window_cursors.remove(&window);
    }

    fn focused_window(&self) -> Option<WindowHandle> {
        self.focused_window
    }

    fn invalidate_region(&mut self, region: InclusiveRectangle) {
        self.invalidated.push(region);
    }
}
