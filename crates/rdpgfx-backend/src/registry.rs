//! Capability tables exposed to the update engine.

use rdpgfx_graphics::pointer::PointerShape;

use crate::bitmap::{Bitmap, BitmapData};
use crate::glyph::{Glyph, GlyphShape};
use crate::pointer::Pointer;
use crate::BackendResult;

pub trait BitmapClass {
    /// Materializes `bitmap` from its raw pixel data, if any.
    fn new_bitmap(&mut self, bitmap: &mut Bitmap) -> BackendResult<()>;

    /// Releases the native surface. Calling it again is a no-op.
    fn free_bitmap(&mut self, bitmap: &mut Bitmap);

    /// Blits the pixel buffer onto the primary surface at the destination rectangle.
    fn paint_bitmap(&mut self, bitmap: &Bitmap) -> BackendResult<()>;

    /// Decodes `input` into the pixel buffer, reallocating it to the decoded size.
    ///
    /// Decode failures are logged, only allocation failures are returned.
    fn decompress_bitmap(&mut self, bitmap: &mut Bitmap, input: &BitmapData<'_>) -> BackendResult<()>;

    /// Routes subsequent drawing to the primary surface, or to the surface of `bitmap`.
    fn set_bitmap_surface(&mut self, bitmap: Option<&Bitmap>, primary: bool) -> BackendResult<()>;

    fn rfx_process(&mut self, bitmap: &mut Bitmap, input: &BitmapData<'_>) -> BackendResult<()>;

    fn nsc_process(&mut self, bitmap: &mut Bitmap, input: &BitmapData<'_>) -> BackendResult<()>;

    fn jpeg_process(&mut self, bitmap: &mut Bitmap, input: &BitmapData<'_>) -> BackendResult<()>;

    fn bitmap_process(&mut self, bitmap: &mut Bitmap, input: &BitmapData<'_>) -> BackendResult<()>;
}

pub trait PointerClass {
    fn new_pointer(&mut self, shape: &PointerShape<'_>) -> BackendResult<Pointer>;

    fn free_pointer(&mut self, pointer: &mut Pointer);

    /// Activates the cursor of `pointer` on the focused window.
    fn set_pointer(&mut self, pointer: &Pointer);

    /// Hides the cursor on the focused window.
    fn set_null_pointer(&mut self);

    /// Reverts the focused window to the platform default cursor.
    fn set_default_pointer(&mut self);
}

pub trait GlyphClass {
    fn new_glyph(&mut self, shape: &GlyphShape<'_>) -> BackendResult<Glyph>;

    fn free_glyph(&mut self, glyph: &mut Glyph);

    fn draw_glyph(&mut self, glyph: &Glyph, x: u16, y: u16) -> BackendResult<()>;

    fn begin_draw(&mut self, x: u16, y: u16, width: u16, height: u16, bg: u32, fg: u32) -> BackendResult<()>;

    fn end_draw(&mut self, x: u16, y: u16, width: u16, height: u16, bg: u32, fg: u32) -> BackendResult<()>;
}

/// Anything able to back all three graphical object classes.
pub trait GraphicsBackend: BitmapClass + PointerClass + GlyphClass {}

impl<T> GraphicsBackend for T where T: BitmapClass + PointerClass + GlyphClass {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Bitmap,
    Pointer,
    Glyph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    New,
    Free,
    Paint,
    Decompress,
    SetSurface,
    RfxProcess,
    NscProcess,
    JpegProcess,
    BitmapProcess,
    Set,
    SetNull,
    SetDefault,
    Draw,
    BeginDraw,
    EndDraw,
}

const BITMAP_ENTRY_POINTS: &[EntryPoint] = &[
    EntryPoint::New,
    EntryPoint::Free,
    EntryPoint::Paint,
    EntryPoint::Decompress,
    EntryPoint::SetSurface,
    EntryPoint::RfxProcess,
    EntryPoint::NscProcess,
    EntryPoint::JpegProcess,
    EntryPoint::BitmapProcess,
];

const POINTER_ENTRY_POINTS: &[EntryPoint] = &[
    EntryPoint::New,
    EntryPoint::Free,
    EntryPoint::Set,
    EntryPoint::SetNull,
    EntryPoint::SetDefault,
];

const GLYPH_ENTRY_POINTS: &[EntryPoint] = &[
    EntryPoint::New,
    EntryPoint::Free,
    EntryPoint::Draw,
    EntryPoint::BeginDraw,
    EntryPoint::EndDraw,
];

/// Registration of one object class: the size of its objects and the entry points it provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub kind: ClassKind,
    pub object_size: usize,
    pub entry_points: &'static [EntryPoint],
}

/// Exposes a graphics backend to the update engine through its class capabilities.
#[derive(Debug)]
pub struct BackendRegistry<G> {
    backend: G,
    descriptors: [ClassDescriptor; 3],
}

impl<G: GraphicsBackend> BackendRegistry<G> {
    pub fn register(backend: G) -> Self {
        let descriptors = [
            ClassDescriptor {
                kind: ClassKind::Bitmap,
                object_size: size_of::<Bitmap>(),
                entry_points: BITMAP_ENTRY_POINTS,
            },
            ClassDescriptor {
                kind: ClassKind::Pointer,
                object_size: size_of::<Pointer>(),
                entry_points: POINTER_ENTRY_POINTS,
            },
            ClassDescriptor {
                kind: ClassKind::Glyph,
                object_size: size_of::<Glyph>(),
                entry_points: GLYPH_ENTRY_POINTS,
            },
        ];

        debug!(?descriptors, "Registered graphics classes");

        Self { backend, descriptors }
    }

    pub fn descriptors(&self) -> &[ClassDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, kind: ClassKind) -> Option<&ClassDescriptor> {
        self.descriptors.iter().find(|descriptor| descriptor.kind == kind)
    }

    pub fn bitmap(&mut self) -> &mut dyn BitmapClass {
        &mut self.backend
    }

    pub fn pointer(&mut self) -> &mut dyn PointerClass {
        &mut self.backend
    }

    pub fn glyph(&mut self) -> &mut dyn GlyphClass {
        &mut self.backend
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }

    pub fn into_inner(self) -> G {
        self.backend
    }
}
