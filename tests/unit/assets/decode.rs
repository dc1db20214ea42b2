use image::Rgba;

use super::*;

#[test]
fn png_round_trip_is_lossless() {
    let img = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8 * 80, y as u8 * 120, 7, 200]));
    let bytes = encode_image(&img, OutputFormat::Png, DEFAULT_JPEG_QUALITY).unwrap();
    assert_eq!(decode_image(&bytes).unwrap(), img);
}

#[test]
fn jpeg_output_is_opaque_and_sized() {
    let img = RgbaImage::from_pixel(16, 8, Rgba([10, 200, 30, 0]));
    let bytes = encode_image(&img, OutputFormat::Jpeg, 90).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let back = decode_image(&bytes).unwrap();
    assert_eq!(back.dimensions(), (16, 8));
    assert!(back.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn encoding_is_deterministic() {
    let img = RgbaImage::from_fn(9, 9, |x, y| Rgba([(x * 28) as u8, (y * 28) as u8, 99, 255]));
    let a = encode_image(&img, OutputFormat::Jpeg, DEFAULT_JPEG_QUALITY).unwrap();
    let b = encode_image(&img, OutputFormat::Jpeg, DEFAULT_JPEG_QUALITY).unwrap();
    assert_eq!(a, b);
}

#[test]
fn decode_rejects_non_images() {
    assert!(decode_image(b"definitely not an image").is_err());
}
