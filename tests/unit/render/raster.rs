use super::*;

#[test]
fn validate_rejects_zero_size_and_short_buffers() {
    assert!(Raster::new(0, 4).validate().is_err());
    assert!(Raster::from_premul(2, 2, vec![0u8; 15]).is_err());
    assert!(Raster::from_premul(2, 2, vec![0u8; 16]).is_ok());
}

#[test]
fn decode_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let r = Raster::decode(&buf).unwrap();
    assert_eq!(r.dimensions(), (1, 1));
    assert_eq!(
        r.data,
        vec![
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn resized_keeps_solid_color() {
    let r = Raster::filled(40, 20, [10, 200, 30, 255]);
    let small = r.resized(10, 5).unwrap();
    assert_eq!(small.dimensions(), (10, 5));
    assert_eq!(small.pixel(4, 2), Some([10, 200, 30, 255]));
}

#[test]
fn draw_over_clips_to_bounds() {
    let mut dst = Raster::filled(4, 4, [0, 0, 0, 255]);
    let src = Raster::filled(2, 2, [255, 255, 255, 255]);
    dst.draw_over(&src, 3, 3);
    assert_eq!(dst.pixel(3, 3), Some([255, 255, 255, 255]));
    assert_eq!(dst.pixel(2, 2), Some([0, 0, 0, 255]));
    dst.draw_over(&src, -1, -1);
    assert_eq!(dst.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(dst.pixel(1, 1), Some([0, 0, 0, 255]));
}

#[test]
fn draw_masked_over_only_touches_masked_pixels() {
    let mut dst = Raster::new(2, 1);
    let src = Raster::filled(2, 1, [255, 0, 0, 255]);
    let mask = Raster::from_premul(2, 1, vec![0, 0, 0, 255, 0, 0, 0, 0]).unwrap();
    dst.draw_masked_over(&src, &mask).unwrap();
    assert_eq!(dst.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(dst.pixel(1, 0), Some([0, 0, 0, 0]));
}

#[test]
fn composite_rejects_size_mismatch() {
    let mut dst = Raster::new(2, 2);
    assert!(dst.composite(&Raster::new(3, 2), BlendMode::Normal).is_err());
}

#[test]
fn png_encoding_roundtrips_opaque_pixels() {
    let r = Raster::filled(3, 2, [1, 2, 3, 255]);
    let bytes = r.encode_png().unwrap();
    let back = Raster::decode(&bytes).unwrap();
    assert_eq!(back, r);
}
