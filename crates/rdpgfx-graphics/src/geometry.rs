//! Rectangle helpers on top of the protocol [`InclusiveRectangle`].

pub use ironrdp_pdu::geometry::{InclusiveRectangle, Rectangle};

pub trait InclusiveRectangleExt: Sized {
    /// Builds the rectangle covering `width × height` pixels starting at (`x`, `y`).
    ///
    /// Returns `None` for an empty extent or when the rectangle does not fit the 16-bit plane.
    fn from_extent(x: u16, y: u16, width: u16, height: u16) -> Option<Self>;

    /// Whether `right >= left` and `bottom >= top`.
    fn is_valid(&self) -> bool;

    fn contains(&self, x: u16, y: u16) -> bool;
}

impl InclusiveRectangleExt for InclusiveRectangle {
    fn from_extent(x: u16, y: u16, width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        Some(Self {
            left: x,
            top: y,
            right: x.checked_add(width - 1)?,
            bottom: y.checked_add(height - 1)?,
        })
    }

    fn is_valid(&self) -> bool {
        self.right >= self.left && self.bottom >= self.top
    }

    fn contains(&self, x: u16, y: u16) -> bool {
        (self.left..=self.right).contains(&x) && (self.top..=self.bottom).contains(&y)
    }
}
