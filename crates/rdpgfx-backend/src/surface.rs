use crate::native::{Drawable, SurfaceHandle};

/// Surface receiving bitmap paints and glyph draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceTarget {
    active: Drawable,
}

impl Default for SurfaceTarget {
    fn default() -> Self {
        Self {
            active: Drawable::Primary,
        }
    }
}

impl SurfaceTarget {
    pub fn set_primary(&mut self) {
        self.active = Drawable::Primary;
    }

    /// Routes drawing to a bitmap surface for offscreen composition.
    pub fn set_offscreen(&mut self, surface: SurfaceHandle) {
        self.active = Drawable::Surface(surface);
    }

    pub fn is_primary(&self) -> bool {
        self.active == Drawable::Primary
    }

    pub fn active(&self) -> Drawable {
        self.active
    }
}
