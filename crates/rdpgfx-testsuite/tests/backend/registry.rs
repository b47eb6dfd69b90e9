use core::fmt::Write as _;

use expect_test::expect;
use rdpgfx_backend::bitmap::Bitmap;
use rdpgfx_backend::registry::{BackendRegistry, ClassKind};
use rdpgfx_backend::Config;
use rdpgfx_testsuite::fixtures::context;

#[test]
fn three_classes_are_registered() {
    let registry = BackendRegistry::register(context(Config::default()));

    let mut summary = String::new();
    for descriptor in registry.descriptors() {
        writeln!(
            summary,
            "{:?} ({}): {:?}",
            descriptor.kind,
            descriptor.entry_points.len(),
            descriptor.entry_points
        )
        .unwrap();
    }

    expect![[r#"
        Bitmap (9): [New, Free, Paint, Decompress, SetSurface, RfxProcess, NscProcess, JpegProcess, BitmapProcess]
        Pointer (5): [New, Free, Set, SetNull, SetDefault]
        Glyph (5): [New, Free, Draw, BeginDraw, EndDraw]
    "#]]
    .assert_eq(&summary);
}

#[test]
fn descriptors_carry_object_sizes() {
    let registry = BackendRegistry::register(context(Config::default()));

    let bitmap = registry.descriptor(ClassKind::Bitmap).unwrap();

    assert_eq!(bitmap.object_size, size_of::<Bitmap>());
    assert!(registry.descriptors().iter().all(|descriptor| descriptor.object_size > 0));
}

#[test]
fn classes_drive_the_same_backend() {
    let mut registry = BackendRegistry::register(context(Config::default()));

    let mut bitmap = Bitmap::new(2, 2, 32)
        .with_destination(0, 0, 1, 1)
        .with_data(vec![0xFF; 16]);
    registry.bitmap().new_bitmap(&mut bitmap).unwrap();
    registry.bitmap().paint_bitmap(&bitmap).unwrap();

    registry.pointer().set_null_pointer();

    let ctx = registry.into_inner();
    assert_eq!(ctx.backend().invalidated().len(), 1);
    assert_eq!(ctx.backend().primary().pixel(1, 1), Some(0xFFFF_FFFF));
}
