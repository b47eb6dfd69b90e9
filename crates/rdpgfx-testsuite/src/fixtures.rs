use rdpgfx_backend::codec::{CodecDispatcher, Tile, TileMessage};
use rdpgfx_backend::native::WindowHandle;
use rdpgfx_backend::software::SoftwareBackend;
use rdpgfx_backend::{Config, GraphicsContext};
use rdpgfx_graphics::color_conversion::ColorDepth;

pub const DESKTOP_WIDTH: u16 = 64;
pub const DESKTOP_HEIGHT: u16 = 64;
pub const MAIN_WINDOW: WindowHandle = WindowHandle(1);

pub fn software_backend() -> SoftwareBackend {
    let mut backend =
        SoftwareBackend::new(DESKTOP_WIDTH, DESKTOP_HEIGHT, ColorDepth::Bpp32).expect("software backend");
    backend.set_focused_window(Some(MAIN_WINDOW));
    backend
}

pub fn context_with(config: Config, codecs: CodecDispatcher) -> GraphicsContext<SoftwareBackend> {
    GraphicsContext::new(software_backend(), config, codecs).expect("graphics context")
}

pub fn context(config: Config) -> GraphicsContext<SoftwareBackend> {
    context_with(config, CodecDispatcher::new())
}

/// 64×64 BGRA tile where pixel (x, y) is `[x, y, x ^ y, 0xFF]`.
pub fn gradient_tile() -> Tile {
    let mut data = Vec::with_capacity(64 * 64 * 4);

    for y in 0..64u8 {
        for x in 0..64u8 {
            data.extend_from_slice(&[x, y, x ^ y, 0xFF]);
        }
    }

    Tile { x: 0, y: 0, data }
}

pub fn tile_message(tiles: Vec<Tile>) -> TileMessage {
    TileMessage { tiles }
}
