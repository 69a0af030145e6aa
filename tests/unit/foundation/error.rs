use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ThumbError::unsupported_resolution(0, 720, "zero width")
            .to_string()
            .contains("unsupported resolution 0x720")
    );
    assert!(
        ThumbError::font_load("Nope Sans", 700, "not installed")
            .to_string()
            .contains("font load error for family 'Nope Sans'")
    );
    assert!(ThumbError::decode("x").to_string().contains("decode error:"));
    assert!(ThumbError::encode("x").to_string().contains("encode error:"));
    assert!(ThumbError::config("x").to_string().contains("config error:"));
}

#[test]
fn layout_infeasible_reports_box_and_caption() {
    let err = ThumbError::LayoutInfeasible {
        style: "minimalist".to_string(),
        resolution: None,
        box_width: 640,
        box_height: 40,
        caption: "far too long".to_string(),
        reason: "3 lines need 120px".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("'minimalist'"));
    assert!(msg.contains("640x40"));
    assert!(msg.contains("\"far too long\""));
    assert!(!msg.contains(" at "));
}

#[test]
fn layout_infeasible_gains_the_canvas_once() {
    let err = ThumbError::LayoutInfeasible {
        style: "tech".to_string(),
        resolution: None,
        box_width: 1088,
        box_height: 16,
        caption: "words".to_string(),
        reason: "1 line(s) need 28px".to_string(),
    }
    .at_resolution(Resolution::new(1280, 40).unwrap());
    assert!(err.to_string().contains("'tech' at 1280x40 in 1088x16"));

    let err = err.at_resolution(Resolution::HD);
    assert!(matches!(
        err,
        ThumbError::LayoutInfeasible {
            resolution: Some(Resolution {
                width: 1280,
                height: 40
            }),
            ..
        }
    ));

    let other = ThumbError::config("x").at_resolution(Resolution::HD);
    assert!(matches!(other, ThumbError::Config(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ThumbError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
