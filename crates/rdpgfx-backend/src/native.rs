//! Seam between the graphical objects and the windowing system.

use core::fmt;

use rdpgfx_graphics::color_conversion::ColorDepth;
use rdpgfx_graphics::geometry::InclusiveRectangle;
use rdpgfx_graphics::glyph::Stencil;
use rdpgfx_graphics::pointer::CursorImage;

use crate::BackendResult;

/// Native offscreen surface: a bitmap pixmap or a 1-bit stencil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u32);

/// Target of drawing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drawable {
    /// Back buffer mirroring the whole remote desktop.
    Primary,
    /// Visible drawable the primary surface is presented on.
    Window,
    Surface(SurfaceHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStyle {
    Solid,
    /// Only pixels under a set stipple bit receive the foreground color, the others are left untouched.
    Stippled,
}

/// Graphics state used by rectangle fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillState {
    pub style: FillStyle,
    /// Color at backend depth.
    pub foreground: u32,
    /// Color at backend depth.
    pub background: u32,
    /// 1-bit surface tiled over the destination for stippled fills.
    pub stipple: SurfaceHandle,
    /// Tile origin of the stipple in destination coordinates.
    pub origin: (u16, u16),
}

impl FillState {
    pub fn solid(stipple: SurfaceHandle) -> Self {
        Self {
            style: FillStyle::Solid,
            foreground: 0,
            background: 0,
            stipple,
            origin: (0, 0),
        }
    }
}

/// Tightly packed pixel data at `depth`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    pub data: &'a [u8],
    pub width: u16,
    pub height: u16,
    pub depth: ColorDepth,
}

impl fmt::Debug for Image<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("data_len", &self.data.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.depth)
            .finish()
    }
}

impl Image<'_> {
    /// Bytes per scanline.
    pub fn stride(&self) -> usize {
        usize::from(self.width) * self.depth.bytes_per_pixel()
    }
}

/// Surface and cursor primitives of a windowing system.
pub trait NativeBackend {
    /// Pixel depth of the surfaces presented to the user.
    fn depth(&self) -> ColorDepth;

    fn create_surface(&mut self, width: u16, height: u16, depth: ColorDepth) -> BackendResult<SurfaceHandle>;

    fn free_surface(&mut self, surface: SurfaceHandle);

    /// Uploads `image` into `dst`. The image origin lands at the top-left corner of `rect`
    /// and at most `rect` is written.
    fn put_image(&mut self, dst: Drawable, image: &Image<'_>, rect: &InclusiveRectangle) -> BackendResult<()>;

    /// Replaces the content of a 1-bit surface.
    fn put_stencil(&mut self, surface: SurfaceHandle, stencil: &Stencil) -> BackendResult<()>;

    /// Copies `rect` of `src` to (`dst_x`, `dst_y`) in `dst`. Parts outside either drawable are clipped.
    fn copy_area(
        &mut self,
        src: Drawable,
        dst: Drawable,
        rect: &InclusiveRectangle,
        dst_x: u16,
        dst_y: u16,
    ) -> BackendResult<()>;

    fn fill_rectangle(&mut self, dst: Drawable, rect: &InclusiveRectangle, fill: &FillState) -> BackendResult<()>;

    fn create_cursor(&mut self, image: &CursorImage) -> BackendResult<CursorHandle>;

    fn free_cursor(&mut self, cursor: CursorHandle);

    fn define_cursor(&mut self, window: WindowHandle, cursor: CursorHandle);

    /// Reverts `window` to the platform default cursor.
    fn undefine_cursor(&mut self, window: WindowHandle);

    /// Window receiving cursor changes, if any window has focus.
    fn focused_window(&self) -> Option<WindowHandle>;

    /// Reports a region needing redisplay.
    fn invalidate_region(&mut self, region: InclusiveRectangle);
}
