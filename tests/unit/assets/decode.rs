use super::*;

#[test]
fn decode_image_premultiplies() {
    let png = Raster::from_straight_rgba(1, 1, vec![100, 50, 200, 128])
        .unwrap()
        .encode_png()
        .unwrap();
    let r = decode_image(&png).unwrap();
    assert_eq!(r.dimensions(), (1, 1));
    assert_eq!(r.pixel(0, 0).unwrap()[3], 128);
    assert!(r.pixel(0, 0).unwrap()[2] < 200);
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn data_url_split() {
    let url = encode_data_url("image/png", &[1, 2, 3]);
    assert!(url.starts_with("data:image/png;base64,"));
    let (mime, bytes) = decode_data_url(&url).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, vec![1, 2, 3]);
}

#[test]
fn data_url_errors() {
    assert!(decode_data_url("http://example.com/a.png").is_err());
    assert!(decode_data_url("data:image/png;base64").is_err());
    assert!(decode_data_url("data:text/plain,hello").is_err());
    assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    let text = encode_data_url("text/plain", b"hi");
    assert!(raster_from_data_url(&text).is_err());
}

#[test]
fn raster_survives_png_data_url() {
    let src = Raster::filled(3, 2, [10, 20, 30, 255]);
    let url = raster_to_png_data_url(&src).unwrap();
    assert_eq!(raster_from_data_url(&url).unwrap(), src);
}
