use std::io::Cursor;

use super::*;

#[test]
fn decode_png_drops_alpha_and_keeps_dimensions() {
    let src = image::RgbaImage::from_raw(2, 1, vec![10, 20, 30, 255, 40, 50, 60, 0]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(src)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let frame = Frame::decode(&buf).unwrap();
    assert_eq!((frame.width, frame.height), (2, 1));
    assert_eq!(frame.rgb8.as_slice(), &[10, 20, 30, 40, 50, 60]);
}

#[test]
fn decode_rejects_garbage() {
    assert!(matches!(
        Frame::decode(b"not an image"),
        Err(ThumbError::Decode(_))
    ));
}

#[test]
fn from_rgb8_checks_buffer_length() {
    assert!(Frame::from_rgb8(2, 2, vec![0; 12]).is_ok());
    assert!(Frame::from_rgb8(2, 2, vec![0; 11]).is_err());
    assert!(Frame::from_rgb8(0, 2, vec![]).is_err());
}

#[test]
fn image_file_provider_reads_from_disk() {
    let dir = std::path::PathBuf::from("target").join("frame_provider_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("frame.png");
    image::RgbImage::from_pixel(4, 3, image::Rgb([1, 2, 3]))
        .save(&path)
        .unwrap();

    let frame = ImageFileFrameProvider::new(&path)
        .get_selected_frame()
        .unwrap();
    assert_eq!((frame.width, frame.height), (4, 3));
    assert_eq!(&frame.rgb8[..3], &[1, 2, 3]);

    let missing = ImageFileFrameProvider::new(dir.join("missing.png"));
    assert!(matches!(
        missing.get_selected_frame(),
        Err(ThumbError::Other(_))
    ));
}
