use rdpgfx_backend::bitmap::Bitmap;
use rdpgfx_backend::native::Drawable;
use rdpgfx_backend::registry::BitmapClass as _;
use rdpgfx_backend::{BackendErrorKind, Config};
use rdpgfx_graphics::color_conversion::ColorDepth;
use rdpgfx_graphics::geometry::{InclusiveRectangle, InclusiveRectangleExt as _};
use rdpgfx_testsuite::fixtures::context;

fn remote_24bpp() -> Config {
    Config {
        color_depth: ColorDepth::Bpp24,
        ..Config::default()
    }
}

/// Pixel `i` reads as `0x2010ii`.
fn raw_24bpp(width: u16, height: u16) -> Vec<u8> {
    (0..usize::from(width) * usize::from(height))
        .flat_map(|i| [i as u8, 0x10, 0x20])
        .collect()
}

#[test]
fn paint_blits_at_destination_and_invalidates_it() {
    let mut ctx = context(remote_24bpp());
    let mut bitmap = Bitmap::new(4, 2, 24)
        .with_destination(10, 20, 13, 21)
        .with_data(raw_24bpp(4, 2));

    ctx.new_bitmap(&mut bitmap).unwrap();

    let surface = bitmap.surface.expect("native surface");
    let native = ctx.backend().surface(surface).expect("pixel surface");
    assert_eq!((native.width(), native.height()), (4, 2));
    assert_eq!(native.depth(), ColorDepth::Bpp32);
    assert_eq!(native.pixel(0, 0), Some(0xFF20_1000));
    assert_eq!(native.pixel(3, 1), Some(0xFF20_1007));

    ctx.paint_bitmap(&bitmap).unwrap();

    let primary = ctx.backend().primary();
    assert_eq!(primary.pixel(10, 20), Some(0xFF20_1000));
    assert_eq!(primary.pixel(13, 20), Some(0xFF20_1003));
    assert_eq!(primary.pixel(13, 21), Some(0xFF20_1007));
    assert_eq!(primary.pixel(9, 20), Some(0));
    assert_eq!(primary.pixel(14, 21), Some(0));
    assert_eq!(primary.pixel(10, 22), Some(0));

    assert_eq!(ctx.backend().window().pixel(13, 21), Some(0xFF20_1007));
    assert_eq!(
        ctx.backend().invalidated(),
        [InclusiveRectangle::from_extent(10, 20, 4, 2).unwrap()]
    );
}

#[test]
fn remote_app_paint_leaves_visible_window_alone() {
    let mut ctx = context(Config {
        remote_app: true,
        ..remote_24bpp()
    });
    let mut bitmap = Bitmap::new(4, 2, 24)
        .with_destination(10, 20, 13, 21)
        .with_data(raw_24bpp(4, 2));

    ctx.new_bitmap(&mut bitmap).unwrap();
    ctx.paint_bitmap(&bitmap).unwrap();

    assert_eq!(ctx.backend().primary().pixel(10, 20), Some(0xFF20_1000));
    assert_eq!(ctx.backend().window().pixel(10, 20), Some(0));
    assert_eq!(ctx.backend().invalidated().len(), 1);
}

#[test]
fn ephemeral_bitmap_keeps_converted_buffer_only() {
    let mut ctx = context(Config {
        color_depth: ColorDepth::Bpp16,
        ..Config::default()
    });
    let surfaces = ctx.backend().surface_count();

    // red, blue
    let mut bitmap = Bitmap::new(2, 1, 16)
        .with_destination(0, 0, 1, 0)
        .with_data(vec![0x00, 0xF8, 0x1F, 0x00])
        .ephemeral();

    ctx.new_bitmap(&mut bitmap).unwrap();

    assert!(bitmap.surface.is_none());
    assert_eq!(ctx.backend().surface_count(), surfaces);
    assert_eq!(bitmap.bpp, 32);
    assert_eq!(
        bitmap.data.as_deref(),
        Some(&[0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0xFF][..])
    );

    ctx.paint_bitmap(&bitmap).unwrap();

    assert_eq!(ctx.backend().primary().pixel(0, 0), Some(0xFFFF_0000));
    assert_eq!(ctx.backend().primary().pixel(1, 0), Some(0xFF00_00FF));
}

#[test]
fn paint_outside_of_desktop_is_still_invalidated() {
    let mut ctx = context(remote_24bpp());
    let mut bitmap = Bitmap::new(4, 2, 24)
        .with_destination(100, 100, 103, 101)
        .with_data(raw_24bpp(4, 2));

    ctx.new_bitmap(&mut bitmap).unwrap();
    ctx.paint_bitmap(&bitmap).unwrap();

    assert!(ctx.backend().primary().data().iter().all(|byte| *byte == 0));
    assert!(ctx.backend().window().data().iter().all(|byte| *byte == 0));
    assert_eq!(
        ctx.backend().invalidated(),
        [InclusiveRectangle::from_extent(100, 100, 4, 2).unwrap()]
    );
}

#[test]
fn paint_across_desktop_edge_is_clipped() {
    let mut ctx = context(remote_24bpp());
    let mut bitmap = Bitmap::new(4, 2, 24)
        .with_destination(62, 63, 65, 64)
        .with_data(raw_24bpp(4, 2));

    ctx.new_bitmap(&mut bitmap).unwrap();
    ctx.paint_bitmap(&bitmap).unwrap();

    let primary = ctx.backend().primary();
    assert_eq!(primary.pixel(62, 63), Some(0xFF20_1000));
    assert_eq!(primary.pixel(63, 63), Some(0xFF20_1001));
    assert_eq!(primary.pixel(61, 63), Some(0));
    assert_eq!(ctx.backend().window().pixel(63, 63), Some(0xFF20_1001));
    assert_eq!(
        ctx.backend().invalidated(),
        [InclusiveRectangle::from_extent(62, 63, 4, 2).unwrap()]
    );
}

#[test]
fn reused_bitmap_releases_previous_surface() {
    let mut ctx = context(Config::default());
    let baseline = ctx.backend().surface_count();

    let mut bitmap = Bitmap::new(4, 4, 32);
    ctx.new_bitmap(&mut bitmap).unwrap();
    let first = bitmap.surface.expect("native surface");
    ctx.set_bitmap_surface(Some(&bitmap), false).unwrap();

    ctx.new_bitmap(&mut bitmap).unwrap();

    assert_eq!(ctx.backend().surface_count(), baseline + 1);
    assert!(ctx.backend().surface(first).is_none());
    assert!(bitmap.surface.is_some_and(|surface| surface != first));
    assert!(ctx.surface_target().is_primary());
}

#[test]
fn conversion_failure_leaves_surface_blank() {
    let mut ctx = context(remote_24bpp());
    let mut bitmap = Bitmap::new(4, 2, 24).with_data(vec![0xFF; 5]);

    ctx.new_bitmap(&mut bitmap).unwrap();

    let surface = bitmap.surface.expect("native surface");
    let native = ctx.backend().surface(surface).expect("pixel surface");
    assert!(native.data().iter().all(|byte| *byte == 0));
    assert_eq!(bitmap.data.as_deref(), Some(&[0xFF; 5][..]));
}

#[test]
fn free_is_idempotent() {
    let mut ctx = context(Config::default());
    let baseline = ctx.backend().surface_count();

    let mut bitmap = Bitmap::new(4, 4, 32);
    ctx.new_bitmap(&mut bitmap).unwrap();
    assert_eq!(ctx.backend().surface_count(), baseline + 1);

    ctx.free_bitmap(&mut bitmap);
    ctx.free_bitmap(&mut bitmap);

    assert!(bitmap.surface.is_none());
    assert_eq!(ctx.backend().surface_count(), baseline);

    let mut never_materialized = Bitmap::new(4, 4, 32).ephemeral();
    ctx.free_bitmap(&mut never_materialized);
    assert_eq!(ctx.backend().surface_count(), baseline);
}

#[test]
fn paint_without_pixel_data_is_an_error() {
    let mut ctx = context(Config::default());
    let bitmap = Bitmap::new(2, 2, 32).with_destination(0, 0, 1, 1);

    let err = ctx.paint_bitmap(&bitmap).unwrap_err();

    assert!(matches!(err.kind(), BackendErrorKind::General));
    assert!(ctx.backend().invalidated().is_empty());
}

#[test]
fn paint_does_not_repair_mismatched_buffer() {
    let mut ctx = context(Config::default());
    let bitmap = Bitmap::new(2, 2, 32)
        .with_destination(0, 0, 1, 1)
        .with_data(vec![0; 3]);

    let err = ctx.paint_bitmap(&bitmap).unwrap_err();

    assert!(matches!(err.kind(), BackendErrorKind::Reason(_)));
    assert_eq!(bitmap.data.as_deref().map(<[u8]>::len), Some(3));
}

#[test]
fn surface_targeting() {
    let mut ctx = context(Config::default());
    assert!(ctx.surface_target().is_primary());

    let mut bitmap = Bitmap::new(8, 8, 32);
    ctx.new_bitmap(&mut bitmap).unwrap();
    let surface = bitmap.surface.expect("native surface");

    ctx.set_bitmap_surface(Some(&bitmap), false).unwrap();
    assert_eq!(ctx.surface_target().active(), Drawable::Surface(surface));

    ctx.set_bitmap_surface(None, true).unwrap();
    assert!(ctx.surface_target().is_primary());

    let ephemeral = Bitmap::new(8, 8, 32).ephemeral();
    assert!(ctx.set_bitmap_surface(Some(&ephemeral), false).is_err());
    assert!(ctx.surface_target().is_primary());

    ctx.set_bitmap_surface(Some(&bitmap), false).unwrap();
    ctx.free_bitmap(&mut bitmap);
    assert!(ctx.surface_target().is_primary());
}
