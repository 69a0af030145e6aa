use super::*;

fn split_frame(width: u32, height: u32) -> Frame {
    let mut bytes = Vec::with_capacity((width * height * 3) as usize);
    for _y in 0..height {
        for x in 0..width {
            if x < width / 2 {
                bytes.extend_from_slice(&[255, 0, 0]);
            } else {
                bytes.extend_from_slice(&[0, 0, 255]);
            }
        }
    }
    Frame::from_rgb8(width, height, bytes).unwrap()
}

fn close(a: &[u8], b: &[u8]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(*y) <= 2)
}

#[test]
fn same_aspect_keeps_whole_frame() {
    let r = cover_rect(1920, 1080, Resolution::HD).unwrap();
    assert_eq!(
        r,
        PixelRect {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080
        }
    );
}

#[test]
fn wide_source_crops_sides() {
    let r = cover_rect(1920, 1080, Resolution::new(1000, 1000).unwrap()).unwrap();
    assert_eq!(
        r,
        PixelRect {
            x: 420,
            y: 0,
            width: 1080,
            height: 1080
        }
    );
}

#[test]
fn tall_source_crops_top_and_bottom() {
    let r = cover_rect(1080, 1920, Resolution::HD).unwrap();
    assert_eq!(r.width, 1080);
    assert_eq!(r.height, 608);
    assert_eq!(r.y, 656);
}

#[test]
fn output_has_exact_target_size() {
    let frame = Frame::solid(333, 211, [9, 9, 9]).unwrap();
    for target in [
        Resolution::HD,
        Resolution::new(64, 64).unwrap(),
        Resolution::new(90, 160).unwrap(),
    ] {
        let img = cover_crop(&frame, target).unwrap();
        assert_eq!(img.dimensions(), (target.width, target.height));
    }
}

#[test]
fn square_target_from_split_frame_does_not_stretch() {
    let frame = split_frame(200, 100);
    let img = cover_crop(&frame, Resolution::new(100, 100).unwrap()).unwrap();
    assert_eq!(img.dimensions(), (100, 100));
    // The crop is the central 100 columns, so the color edge stays in the middle.
    assert_eq!(img.get_pixel(10, 50).0, [255, 0, 0]);
    assert_eq!(img.get_pixel(89, 50).0, [0, 0, 255]);
}

#[test]
fn downscale_preserves_flat_regions() {
    let frame = split_frame(400, 200);
    let img = cover_crop(&frame, Resolution::new(200, 100).unwrap()).unwrap();
    assert!(close(&img.get_pixel(20, 50).0, &[255, 0, 0]));
    assert!(close(&img.get_pixel(180, 50).0, &[0, 0, 255]));
}

#[test]
fn zero_sized_targets_are_unsupported_not_a_panic() {
    for target in [
        Resolution {
            width: 0,
            height: 0,
        },
        Resolution {
            width: 0,
            height: 720,
        },
        Resolution {
            width: 1280,
            height: 0,
        },
    ] {
        assert!(matches!(
            cover_rect(10, 10, target),
            Err(ThumbError::UnsupportedResolution { .. })
        ));
    }

    let frame = Frame::solid(10, 10, [1, 2, 3]).unwrap();
    let err = cover_crop(
        &frame,
        Resolution {
            width: 0,
            height: 0,
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ThumbError::UnsupportedResolution {
            width: 0,
            height: 0,
            ..
        }
    ));
}

#[test]
fn empty_source_is_a_decode_error() {
    assert!(matches!(
        cover_rect(0, 10, Resolution::HD),
        Err(ThumbError::Decode(_))
    ));
}
