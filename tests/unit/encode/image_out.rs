use super::*;

fn gradient(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 77]))
}

fn test_dir(name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("image_out_test")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn png_is_lossless() {
    let img = gradient(37, 21);
    let bytes = encode_image(&img, OutputFormat::Png).unwrap();
    let back = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(back, img);
}

#[test]
fn jpeg_keeps_exact_dimensions() {
    let img = gradient(1280, 720);
    let bytes = encode_image(&img, OutputFormat::jpeg()).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let back = image::load_from_memory(&bytes).unwrap();
    assert_eq!((back.width(), back.height()), (1280, 720));
}

#[test]
fn parse_accepts_known_names_only() {
    assert_eq!(OutputFormat::parse("PNG", 95).unwrap(), OutputFormat::Png);
    assert_eq!(
        OutputFormat::parse("jpg", 80).unwrap(),
        OutputFormat::Jpeg { quality: 80 }
    );
    assert!(matches!(
        OutputFormat::parse("gif", 95),
        Err(ThumbError::Config(_))
    ));
    assert!(matches!(
        OutputFormat::parse("jpeg", 0),
        Err(ThumbError::Config(_))
    ));
}

#[test]
fn format_from_path_uses_extension() {
    assert_eq!(
        OutputFormat::from_path(Path::new("out/thumb.JPEG")),
        Some(OutputFormat::jpeg())
    );
    assert_eq!(
        OutputFormat::from_path(Path::new("thumb.png")),
        Some(OutputFormat::Png)
    );
    assert_eq!(OutputFormat::from_path(Path::new("thumb")), None);
    assert_eq!(OutputFormat::jpeg().extension(), "jpg");
}

#[test]
fn invalid_quality_is_rejected_before_encoding() {
    let img = gradient(4, 4);
    let err = encode_image(&img, OutputFormat::Jpeg { quality: 101 }).unwrap_err();
    assert!(matches!(err, ThumbError::Config(_)));
}

#[test]
fn write_atomic_creates_parents_and_leaves_no_temp_file() {
    let dir = test_dir("atomic");
    let path = dir.join("nested").join("thumb.png");
    write_atomic(b"first", &path).unwrap();
    write_atomic(b"second", &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"second");

    let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("thumb.png")]);
}

#[test]
fn failed_rename_cleans_up_temp_file() {
    let dir = test_dir("rename_fail");
    // A directory at the destination makes the rename fail after the temp file is written.
    let path = dir.join("taken");
    std::fs::create_dir_all(path.join("inner")).unwrap();

    let err = write_atomic(b"bytes", &path).unwrap_err();
    assert!(matches!(err, ThumbError::Other(_)));
    let names: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("taken")]);
}
