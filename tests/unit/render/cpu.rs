use super::*;
use crate::assets::font::FontResolver;
use crate::layout::measure::{FixedAdvanceMeasure, FontMeasure};
use crate::layout::plan::{plan_layout, plan_layout_with_subtext};
use crate::style::registry::StyleRegistry;

const GRAY: [u8; 3] = [200, 200, 200];

fn preset(name: &str) -> Style {
    StyleRegistry::builtin().resolve(name).unwrap().clone()
}

fn fixed_plan(caption: &str, canvas: Resolution, style: &Style) -> LayoutPlan {
    let mut measure = FixedAdvanceMeasure::new(0.5);
    plan_layout(caption, canvas, style, &mut measure).unwrap()
}

#[test]
fn empty_caption_renders_base_frame_only() {
    let style = preset("youtube");
    let frame = Frame::solid(640, 360, GRAY).unwrap();
    let plan = fixed_plan("", Resolution::HD, &style);
    let img = render_thumbnail(&frame, &plan, &style, None).unwrap();
    assert_eq!(img.dimensions(), (1280, 720));
    assert!(img.pixels().all(|p| p.0 == GRAY));
}

#[test]
fn panel_darkens_only_its_rectangle() {
    let style = preset("minimalist");
    let frame = Frame::solid(1280, 720, GRAY).unwrap();
    let mut plan = fixed_plan("Short caption", Resolution::HD, &style);
    plan.lines.clear();
    plan.line_widths.clear();
    let panel = plan.panel_rect.unwrap();

    let img = render_thumbnail(&frame, &plan, &style, None).unwrap();
    let inside = img.get_pixel(panel.x + panel.width / 2, panel.y + panel.height / 2).0;
    assert!(inside[0] < 120 && inside[0] > 80, "inside = {inside:?}");
    assert_eq!(inside[0], inside[1]);
    assert_eq!(img.get_pixel(2, 2).0, GRAY);
    assert_eq!(img.get_pixel(panel.x + panel.width / 2, panel.y.saturating_sub(3)).0, GRAY);
    assert_eq!(img.get_pixel(panel.right() + 2, panel.y + 1).0, GRAY);
}

#[test]
fn text_without_a_font_is_a_font_error() {
    let style = preset("youtube");
    let frame = Frame::solid(64, 36, GRAY).unwrap();
    let plan = fixed_plan("Hello", Resolution::HD, &style);
    let err = render_thumbnail(&frame, &plan, &style, None).unwrap_err();
    assert!(matches!(err, ThumbError::FontLoad { .. }));
}

#[test]
fn oversized_and_zero_canvases_are_rejected() {
    let style = preset("youtube");
    let frame = Frame::solid(8, 8, GRAY).unwrap();
    let mut plan = fixed_plan("", Resolution::HD, &style);

    plan.canvas = Resolution {
        width: 70_000,
        height: 10,
    };
    let err = render_thumbnail(&frame, &plan, &style, None).unwrap_err();
    assert!(matches!(
        err,
        ThumbError::UnsupportedResolution { width: 70_000, .. }
    ));

    plan.canvas = Resolution {
        width: 0,
        height: 10,
    };
    let err = render_thumbnail(&frame, &plan, &style, None).unwrap_err();
    assert!(matches!(err, ThumbError::UnsupportedResolution { width: 0, .. }));
}

#[test]
fn caption_pixels_land_inside_the_text_block_when_a_font_is_installed() {
    let style = preset("youtube");
    let Ok(font) = FontResolver::system().resolve(&style.font_family, style.font_weight) else {
        eprintln!("skipping: {} is not installed", style.font_family);
        return;
    };
    let mut measure = FontMeasure::new(&font).unwrap();
    let plan = plan_layout(
        "Tutoriel Python pour débutants",
        Resolution::HD,
        &style,
        &mut measure,
    )
    .unwrap();
    let mut painter = TextPainter::new(&font).unwrap();
    let frame = Frame::solid(1920, 1080, [0, 0, 128]).unwrap();

    let img = render_thumbnail(&frame, &plan, &style, Some(&mut painter)).unwrap();
    assert_eq!(img.dimensions(), (1280, 720));

    let block = plan.text_block;
    let white = (block.y..block.bottom())
        .flat_map(|y| (block.x..block.right()).map(move |x| (x, y)))
        .filter(|&(x, y)| img.get_pixel(x, y).0 == [255, 255, 255])
        .count();
    assert!(white > 500, "only {white} white pixels in the text block");

    // Full-width panel leaves rows above it untouched.
    let panel = plan.panel_rect.unwrap();
    assert!(panel.y > 0);
    assert_eq!(img.get_pixel(640, 0).0, [0, 0, 128]);
}

#[test]
fn subtext_without_a_font_is_a_font_error() {
    let style = preset("tech");
    let frame = Frame::solid(64, 36, GRAY).unwrap();
    let mut measure = FixedAdvanceMeasure::new(0.5);
    let plan =
        plan_layout_with_subtext("", Some("Live now"), Resolution::HD, &style, &mut measure)
            .unwrap();
    let err = render_thumbnail(&frame, &plan, &style, None).unwrap_err();
    assert!(matches!(err, ThumbError::FontLoad { .. }));
}

#[test]
fn subtext_pixels_land_inside_its_block_when_a_font_is_installed() {
    let style = preset("youtube");
    let Ok(font) = FontResolver::system().resolve(&style.font_family, style.font_weight) else {
        eprintln!("skipping: {} is not installed", style.font_family);
        return;
    };
    let mut measure = FontMeasure::new(&font).unwrap();
    let plan = plan_layout_with_subtext(
        "Rust in production",
        Some("Part 2"),
        Resolution::HD,
        &style,
        &mut measure,
    )
    .unwrap();
    let mut painter = TextPainter::new(&font).unwrap();
    let frame = Frame::solid(1280, 720, [0, 0, 128]).unwrap();
    let img = render_thumbnail(&frame, &plan, &style, Some(&mut painter)).unwrap();

    let block = plan.subtext.as_ref().unwrap().block;
    let white = (block.y..block.bottom())
        .flat_map(|y| (block.x..block.right()).map(move |x| (x, y)))
        .filter(|&(x, y)| img.get_pixel(x, y).0 == [255, 255, 255])
        .count();
    assert!(white > 100, "only {white} white pixels in the subtext block");
}
