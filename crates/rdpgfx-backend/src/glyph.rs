use core::fmt;

use crate::native::SurfaceHandle;

/// Glyph definition from the glyph cache. `mask` is 1 bit per pixel, `ceil(cx / 8)` bytes per scanline.
#[derive(Clone, Copy)]
pub struct GlyphShape<'a> {
    pub cx: u16,
    pub cy: u16,
    pub mask: &'a [u8],
}

impl fmt::Debug for GlyphShape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphShape")
            .field("cx", &self.cx)
            .field("cy", &self.cy)
            .field("mask_len", &self.mask.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glyph {
    pub cx: u16,
    pub cy: u16,
    pub stencil: Option<SurfaceHandle>,
}

/// A glyph placed within a run.
#[derive(Debug, Clone, Copy)]
pub struct GlyphCell<'a> {
    pub glyph: &'a Glyph,
    pub x: u16,
    pub y: u16,
}

/// Text run: a background rectangle and the glyph cells drawn over it.
#[derive(Debug, Clone, Copy)]
pub struct GlyphRun<'a> {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Remote color punched through the glyph shapes.
    pub bg: u32,
    /// Remote color of the run rectangle.
    pub fg: u32,
    pub cells: &'a [GlyphCell<'a>],
}
