use rdpgfx_graphics::pointer::PointerShape;

use crate::native::CursorHandle;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pointer {
    pub width: u16,
    pub height: u16,
    pub hotspot_x: u16,
    pub hotspot_y: u16,
    pub xor_bpp: u16,
    pub cursor: Option<CursorHandle>,
}

impl Pointer {
    pub fn from_shape(shape: &PointerShape<'_>) -> Self {
        Self {
            width: shape.width,
            height: shape.height,
            hotspot_x: shape.hotspot_x,
            hotspot_y: shape.hotspot_y,
            xor_bpp: shape.xor_bpp,
            cursor: None,
        }
    }
}
