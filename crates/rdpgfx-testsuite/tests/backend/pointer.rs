use rdpgfx_backend::registry::PointerClass as _;
use rdpgfx_backend::Config;
use rdpgfx_graphics::pointer::PointerShape;
use rdpgfx_testsuite::fixtures::{context, MAIN_WINDOW};

fn shape_without_masks() -> PointerShape<'static> {
    PointerShape {
        width: 32,
        height: 16,
        hotspot_x: 3,
        hotspot_y: 5,
        xor_bpp: 24,
        and_mask: None,
        xor_mask: None,
    }
}

#[test]
fn pointer_without_masks_is_transparent() {
    let mut ctx = context(Config::default());

    let pointer = ctx.new_pointer(&shape_without_masks()).unwrap();

    assert_eq!((pointer.width, pointer.height), (32, 16));
    assert_eq!((pointer.hotspot_x, pointer.hotspot_y), (3, 5));

    let image = ctx.backend().cursor(pointer.cursor.unwrap()).unwrap();
    assert_eq!(image.pixels.len(), 32 * 16);
    assert!(image.is_fully_transparent());
    assert_eq!((image.hotspot_x, image.hotspot_y), (3, 5));
}

#[test]
fn monochrome_pointer_is_converted() {
    let mut ctx = context(Config::default());
    // 2×1: AND 0 / XOR 1 -> white, AND 1 / XOR 0 -> transparent
    let shape = PointerShape {
        width: 2,
        height: 1,
        hotspot_x: 0,
        hotspot_y: 0,
        xor_bpp: 1,
        and_mask: Some(&[0b0100_0000, 0x00]),
        xor_mask: Some(&[0b1000_0000, 0x00]),
    };

    let pointer = ctx.new_pointer(&shape).unwrap();

    let image = ctx.backend().cursor(pointer.cursor.unwrap()).unwrap();
    assert_eq!(image.pixels, [0xFFFF_FFFF, 0x0000_0000]);
}

#[test]
fn malformed_masks_fall_back_to_transparent_cursor() {
    let mut ctx = context(Config::default());
    let shape = PointerShape {
        and_mask: Some(&[0; 4]),
        xor_mask: Some(&[0xFF; 4]),
        ..shape_without_masks()
    };

    let pointer = ctx.new_pointer(&shape).unwrap();

    let image = ctx.backend().cursor(pointer.cursor.unwrap()).unwrap();
    assert!(image.is_fully_transparent());
}

#[test]
fn activation_follows_focused_window() {
    let mut ctx = context(Config::default());
    let pointer = ctx.new_pointer(&shape_without_masks()).unwrap();

    ctx.set_pointer(&pointer);
    assert_eq!(ctx.backend().window_cursor(MAIN_WINDOW), pointer.cursor);

    ctx.set_null_pointer();
    assert_eq!(ctx.backend().window_cursor(MAIN_WINDOW), Some(ctx.hidden_cursor()));

    let hidden = ctx.backend().cursor(ctx.hidden_cursor()).unwrap();
    assert_eq!((hidden.width, hidden.height), (1, 1));
    assert!(hidden.is_fully_transparent());

    ctx.set_default_pointer();
    assert_eq!(ctx.backend().window_cursor(MAIN_WINDOW), None);
}

#[test]
fn activation_without_focus_is_a_no_op() {
    let mut ctx = context(Config {
        remote_app: true,
        ..Config::default()
    });
    ctx.backend_mut().set_focused_window(None);
    let pointer = ctx.new_pointer(&shape_without_masks()).unwrap();

    ctx.set_pointer(&pointer);
    ctx.set_null_pointer();

    assert_eq!(ctx.backend().window_cursor(MAIN_WINDOW), None);
}

#[test]
fn free_is_idempotent() {
    let mut ctx = context(Config::default());
    let cursors = ctx.backend().cursor_count();
    let mut pointer = ctx.new_pointer(&shape_without_masks()).unwrap();
    assert_eq!(ctx.backend().cursor_count(), cursors + 1);

    ctx.free_pointer(&mut pointer);
    ctx.free_pointer(&mut pointer);

    assert!(pointer.cursor.is_none());
    assert_eq!(ctx.backend().cursor_count(), cursors);
}

#[test]
fn shutdown_releases_session_resources() {
    let ctx = context(Config::default());
    assert_eq!(ctx.backend().cursor_count(), 1);
    assert_eq!(ctx.backend().surface_count(), 1);

    let backend = ctx.shutdown();

    assert_eq!(backend.cursor_count(), 0);
    assert_eq!(backend.surface_count(), 0);
}
