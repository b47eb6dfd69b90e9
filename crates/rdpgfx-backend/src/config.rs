use rdpgfx_graphics::color_conversion::{ColorConverter, ColorDepth, Palette};

/// Session settings consumed by the rendering backend.
///
/// The backend pixel depth is not part of it: it is reported by the native backend itself.
#[derive(Debug, Clone)]
pub struct Config {
    /// Color depth negotiated with the remote session.
    pub color_depth: ColorDepth,
    /// Single remote application window mode.
    ///
    /// When set, painting never copies the primary surface to the visible drawable: remote
    /// application windows present their content themselves.
    pub remote_app: bool,
    /// Render with red and blue channels swapped.
    pub invert_colors: bool,
    /// Produce opaque alpha for 32 bpp output.
    pub alpha: bool,
    pub palette: Palette,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_depth: ColorDepth::Bpp32,
            remote_app: false,
            invert_colors: false,
            alpha: true,
            palette: Palette::default(),
        }
    }
}

impl Config {
    pub fn color_converter(&self) -> ColorConverter {
        ColorConverter::new(self.invert_colors, self.alpha, self.palette.clone())
    }
}
