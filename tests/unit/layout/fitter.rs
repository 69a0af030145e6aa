use super::*;
use crate::layout::measure::FixedAdvanceMeasure;
use crate::style::registry::StyleRegistry;

const LONG_CAPTION: &str = "Learn how to build a fast thumbnail generator in Rust with clean layouts, readable captions and bold colors that grab attention on every screen size, from phones to televisions, without manual edits";

fn preset(name: &str) -> Style {
    StyleRegistry::builtin().resolve(name).unwrap().clone()
}

fn sized_style(min: u32, max: u32) -> Style {
    Style {
        min_font_size: min,
        max_font_size: max,
        ..preset("youtube")
    }
}

fn fit(caption: &str, text_box: TextBox, style: &Style) -> ThumbResult<FittedText> {
    let mut measure = FixedAdvanceMeasure::new(0.5);
    fit_text(caption, text_box, style, &mut measure)
}

#[test]
fn text_box_follows_style_fractions() {
    let style = preset("youtube");
    assert_eq!(
        TextBox::for_canvas(Resolution::HD, &style),
        TextBox {
            width: 1152,
            height: 324
        }
    );
}

#[test]
fn youtube_caption_fits_on_two_balanced_lines() {
    let style = preset("youtube");
    let text_box = TextBox::for_canvas(Resolution::HD, &style);
    let fitted = fit("Tutoriel Python pour débutants", text_box, &style).unwrap();

    assert_eq!(fitted.font_size, 140);
    assert_eq!(fitted.lines, vec!["Tutoriel Python", "pour débutants"]);
    assert_eq!(fitted.line_height, 161);
    assert!(fitted.block_height() <= text_box.height);
    assert!(fitted.warnings.is_empty());
}

#[test]
fn fitting_is_deterministic() {
    let style = preset("minimalist");
    let text_box = TextBox::for_canvas(Resolution::HD, &style);
    let a = fit(LONG_CAPTION, text_box, &style).unwrap();
    let b = fit(LONG_CAPTION, text_box, &style).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn lines_preserve_every_character_up_to_whitespace() {
    let style = preset("youtube");
    let text_box = TextBox::for_canvas(Resolution::HD, &style);
    for caption in [
        "  Maîtrisez   Python\ten 30 minutes \n",
        "one",
        LONG_CAPTION,
    ] {
        let fitted = fit(caption, text_box, &style).unwrap();
        assert!(!fitted.is_truncated());
        let normalized = caption.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(fitted.lines.join(" "), normalized);
        assert!(fitted.font_size >= style.min_font_size);
        assert!(fitted.font_size <= style.max_font_size);
        for w in &fitted.line_widths {
            assert!(*w <= text_box.width as f32);
        }
    }
}

#[test]
fn taller_boxes_never_shrink_the_font() {
    let style = preset("tech");
    let mut last = 0;
    for height in (40..=400).step_by(10) {
        let text_box = TextBox {
            width: 900,
            height,
        };
        let Ok(fitted) = fit("Rust async in ten minutes flat", text_box, &style) else {
            assert_eq!(last, 0, "infeasible after a feasible height {height}");
            continue;
        };
        assert!(fitted.font_size >= last, "height {height} shrank the font");
        last = fitted.font_size;
    }
    assert!(last > 0);
}

#[test]
fn single_character_fits_at_max_size() {
    let style = preset("youtube");
    let text_box = TextBox::for_canvas(Resolution::HD, &style);
    let fitted = fit("A", text_box, &style).unwrap();
    assert_eq!(fitted.font_size, style.max_font_size);
    assert_eq!(fitted.lines, vec!["A"]);
}

#[test]
fn overlong_word_is_truncated_at_min_size() {
    let style = sized_style(20, 40);
    let text_box = TextBox {
        width: 100,
        height: 100,
    };
    let fitted = fit("Supercalifragilistic", text_box, &style).unwrap();
    assert_eq!(fitted.font_size, 20);
    assert_eq!(fitted.lines, vec!["Supercali\u{2026}"]);
    assert_eq!(
        fitted.warnings,
        vec![LayoutWarning::TextTruncated {
            original: "Supercalifragilistic".to_string(),
            truncated: "Supercali\u{2026}".to_string(),
            font_size: 20,
        }]
    );
}

#[test]
fn overlong_word_in_too_short_box_is_infeasible() {
    let style = sized_style(20, 40);
    let err = fit(
        "Supercalifragilistic",
        TextBox {
            width: 100,
            height: 10,
        },
        &style,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ThumbError::LayoutInfeasible {
            box_width: 100,
            box_height: 10,
            ..
        }
    ));
}

#[test]
fn box_narrower_than_ellipsis_is_infeasible() {
    let style = sized_style(20, 40);
    let err = fit(
        "word",
        TextBox {
            width: 5,
            height: 100,
        },
        &style,
    )
    .unwrap_err();
    assert!(matches!(err, ThumbError::LayoutInfeasible { .. }));
}

#[test]
fn long_caption_wraps_near_min_size_in_minimalist() {
    assert!((190..=210).contains(&LONG_CAPTION.chars().count()));
    let style = preset("minimalist");
    let text_box = TextBox::for_canvas(Resolution::HD, &style);
    let fitted = fit(LONG_CAPTION, text_box, &style).unwrap();
    assert_eq!(fitted.font_size, 35);
    assert_eq!(fitted.lines.len(), 5);
    assert!(fitted.font_size < style.min_font_size * 2);
}

#[test]
fn long_caption_in_short_canvas_is_infeasible() {
    let style = preset("minimalist");
    let text_box = TextBox::for_canvas(Resolution::new(1280, 200).unwrap(), &style);
    let err = fit(LONG_CAPTION, text_box, &style).unwrap_err();
    match err {
        ThumbError::LayoutInfeasible {
            style, reason, ..
        } => {
            assert_eq!(style, "minimalist");
            assert!(reason.contains("4 line(s)"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn equal_line_counts_prefer_even_lines() {
    let style = sized_style(10, 10);
    let fitted = fit(
        "aaaa bbbb cccc dd",
        TextBox {
            width: 70,
            height: 100,
        },
        &style,
    )
    .unwrap();
    assert_eq!(fitted.lines, vec!["aaaa bbbb", "cccc dd"]);
}

#[test]
fn blank_caption_produces_no_lines() {
    let style = preset("bold");
    let fitted = fit(" \n\t ", TextBox::for_canvas(Resolution::HD, &style), &style).unwrap();
    assert!(fitted.lines.is_empty());
    assert_eq!(fitted.font_size, style.min_font_size);
    assert_eq!(fitted.block_height(), 0);
}

#[test]
fn explicit_size_range_truncates_only_at_its_own_minimum() {
    let style = preset("youtube");
    let sizes = SizeRange { min: 10, max: 20 };
    let fitted = fit_text_in(
        "supercalifragilistic",
        TextBox {
            width: 60,
            height: 100,
        },
        &style,
        sizes,
        &mut FixedAdvanceMeasure::new(0.5),
    )
    .unwrap();
    assert_eq!(fitted.font_size, 10);
    assert!(fitted.is_truncated());
    assert!(fitted.lines[0].ends_with(ELLIPSIS));
    assert_eq!(SizeRange::subtext(&style), SizeRange { min: 16, max: 72 });
}
