use super::*;

#[test]
fn resolution_parses_dimensions_and_presets() {
    assert_eq!("1280x720".parse::<Resolution>().unwrap(), Resolution::HD);
    assert_eq!(" 1920X1080 ".parse::<Resolution>().unwrap(), Resolution::FULL_HD);
    assert_eq!("720p".parse::<Resolution>().unwrap(), Resolution::HD);
    assert_eq!("1080P".parse::<Resolution>().unwrap(), Resolution::FULL_HD);
    assert_eq!(
        "1080x1080".parse::<Resolution>().unwrap(),
        Resolution::new(1080, 1080).unwrap()
    );
}

#[test]
fn resolution_rejects_malformed_and_zero_sizes() {
    assert!(matches!(
        "1280".parse::<Resolution>(),
        Err(ThumbError::Config(_))
    ));
    assert!(matches!(
        "axb".parse::<Resolution>(),
        Err(ThumbError::Config(_))
    ));
    assert!(matches!(
        "0x720".parse::<Resolution>(),
        Err(ThumbError::UnsupportedResolution { width: 0, .. })
    ));
    assert!(Resolution::new(1280, 0).is_err());
}

#[test]
fn resolution_orients_to_portrait_sources() {
    assert_eq!(
        Resolution::HD.oriented_like(1080, 1920),
        Resolution::new(720, 1280).unwrap()
    );
    assert_eq!(Resolution::HD.oriented_like(1920, 1080), Resolution::HD);
    assert_eq!(Resolution::HD.oriented_like(500, 500), Resolution::HD);
    let square = Resolution::new(800, 800).unwrap();
    assert_eq!(square.oriented_like(1080, 1920), square);
}

#[test]
fn resolution_display_matches_cli_format() {
    assert_eq!(Resolution::FULL_HD.to_string(), "1920x1080");
}

#[test]
fn rgb8_hex_roundtrips_through_serde() {
    let gold = Rgb8::from_hex("#FFD700").unwrap();
    assert_eq!(gold, Rgb8::new(255, 215, 0));
    let json = serde_json::to_string(&gold).unwrap();
    assert_eq!(json, "\"#ffd700\"");
    let back: Rgb8 = serde_json::from_str(&json).unwrap();
    assert_eq!(back, gold);
    assert!(Rgb8::from_hex("#12345").is_err());
    assert!(serde_json::from_str::<Rgb8>("\"zzzzzz\"").is_err());
}

#[test]
fn pixel_rect_clips_to_canvas() {
    let canvas = Resolution::new(100, 50).unwrap();
    let r = PixelRect::clipped(-10, 5, 120, 30, canvas);
    assert_eq!(
        r,
        PixelRect {
            x: 0,
            y: 5,
            width: 100,
            height: 25
        }
    );
    assert!(r.contains(0, 5));
    assert!(!r.contains(0, 30));
    assert_eq!(r.right(), 100);
}
