use rdpgfx_graphics::color_conversion::{ColorConverter, ColorDepth, PixelFormatConverter as _};
use rstest::rstest;

const RED: [u8; 3] = [0xFF, 0x00, 0x00];
const GREEN: [u8; 3] = [0x00, 0xFF, 0x00];
const BLUE: [u8; 3] = [0x00, 0x00, 0xFF];

#[rstest]
#[case::red_32(0x00FF_0000, ColorDepth::Bpp32, RED)]
#[case::green_32(0x0000_FF00, ColorDepth::Bpp32, GREEN)]
#[case::blue_32(0x0000_00FF, ColorDepth::Bpp32, BLUE)]
#[case::red_24(0x00FF_0000, ColorDepth::Bpp24, RED)]
#[case::blue_24(0x0000_00FF, ColorDepth::Bpp24, BLUE)]
#[case::red_16(0xF800, ColorDepth::Bpp16, RED)]
#[case::green_16(0x07E0, ColorDepth::Bpp16, GREEN)]
#[case::blue_16(0x001F, ColorDepth::Bpp16, BLUE)]
#[case::red_15(0x7C00, ColorDepth::Bpp15, RED)]
#[case::green_15(0x03E0, ColorDepth::Bpp15, GREEN)]
#[case::blue_15(0x001F, ColorDepth::Bpp15, BLUE)]
#[case::red_8(0xE0, ColorDepth::Bpp8, RED)]
#[case::green_8(0x1C, ColorDepth::Bpp8, GREEN)]
#[case::blue_8(0x03, ColorDepth::Bpp8, BLUE)]
fn primaries_survive_conversion(
    #[case] color: u32,
    #[case] src: ColorDepth,
    #[case] expected: [u8; 3],
    #[values(ColorDepth::Bpp16, ColorDepth::Bpp24, ColorDepth::Bpp32)] dst: ColorDepth,
) {
    let converter = ColorConverter::default();

    let converted = converter.convert_color(color, src, dst).unwrap();

    assert_eq!(converter.color_to_rgb(converted, dst).unwrap(), expected);
}

#[rstest]
fn bgr_variant_swaps_red_and_blue(#[values(ColorDepth::Bpp16, ColorDepth::Bpp24, ColorDepth::Bpp32)] dst: ColorDepth) {
    let converter = ColorConverter::default();

    let converted = converter.convert_color_bgr(0xF800, ColorDepth::Bpp16, dst).unwrap();

    assert_eq!(converter.color_to_rgb(converted, dst).unwrap(), BLUE);
}

#[test]
fn inverted_converter_uses_bgr_order() {
    let converter = ColorConverter {
        invert: true,
        ..ColorConverter::default()
    };

    let converted = converter
        .convert_color(0x00FF_0000, ColorDepth::Bpp24, ColorDepth::Bpp24)
        .unwrap();

    assert_eq!(converted, 0x0000_00FF);
}

#[test]
fn image_conversion_packs_backend_pixels() {
    let converter = ColorConverter {
        alpha: true,
        ..ColorConverter::default()
    };
    // 15 bpp: white, black
    let src = [0xFF, 0x7F, 0x00, 0x00];

    let converted = converter
        .convert_image(&src, 2, 1, ColorDepth::Bpp15, ColorDepth::Bpp32)
        .unwrap();

    assert_eq!(converted, [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0xFF]);
}
