//! Ranch-brand SVG rendering on a fixed 280×280 canvas.

use serde::{Deserialize, Serialize};

use super::error::{EstimateError, Result};

pub const CANVAS_SIZE: f64 = 280.0;
pub const CENTER: f64 = CANVAS_SIZE / 2.0;
pub const FRAME_STROKE_WIDTH: f64 = 8.0;
pub const MARK_STROKE_WIDTH: f64 = 10.0;
pub const MAX_MARK_CHARS: usize = 3;
const INK: &str = "#2b1a10";

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameShape {
    #[default]
    None,
    Circle,
    Diamond,
    Shield,
    Rectangle,
    Horseshoe,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkModifier {
    #[default]
    None,
    /// Lying on its side.
    Lazy,
    Tumbling,
    Reversed,
    Bar,
    Rocking,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BrandSpec {
    pub mark: String,
    pub frame: FrameShape,
    pub modifier: MarkModifier,
}

/// Renders a standalone SVG document for the brand.
pub fn render_svg(spec: &BrandSpec) -> Result<String> {
    let mark = normalize_mark(&spec.mark)?;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#,
        size = CANVAS_SIZE
    );
    svg.push_str(&format!(
        r##"<rect width="{CANVAS_SIZE}" height="{CANVAS_SIZE}" fill="#f5ecd9"/>"##
    ));
    if let Some(frame) = frame_element(spec.frame) {
        svg.push_str(&frame);
    }
    svg.push_str(&mark_element(&mark, spec.modifier));
    if let Some(extra) = modifier_element(spec.modifier) {
        svg.push_str(&extra);
    }
    svg.push_str("</svg>");
    Ok(svg)
}

fn normalize_mark(mark: &str) -> Result<String> {
    let mark = mark.trim().to_ascii_uppercase();
    if mark.is_empty() {
        return Err(EstimateError::InvalidBrand("mark is empty".to_string()));
    }
    if mark.chars().count() > MAX_MARK_CHARS {
        return Err(EstimateError::InvalidBrand(format!(
            "mark has more than {MAX_MARK_CHARS} characters"
        )));
    }
    if !mark.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EstimateError::InvalidBrand(
            "mark may only contain letters and digits".to_string(),
        ));
    }
    Ok(mark)
}

fn stroke(width: f64) -> String {
    format!(r#"fill="none" stroke="{INK}" stroke-width="{width}" stroke-linejoin="round""#)
}

fn frame_element(frame: FrameShape) -> Option<String> {
    let s = stroke(FRAME_STROKE_WIDTH);
    let c = CENTER;
    let element = match frame {
        FrameShape::None => return None,
        FrameShape::Circle => format!(r#"<circle cx="{c}" cy="{c}" r="{}" {s}/>"#, c - 20.0),
        FrameShape::Diamond => format!(
            r#"<polygon points="{c},{} {},{c} {c},{} {},{c}" {s}/>"#,
            c - 120.0,
            c + 120.0,
            c + 120.0,
            c - 120.0
        ),
        FrameShape::Shield => format!(
            r#"<path d="M {l} {t} H {r} V {c} Q {r} {q} {c} {b} Q {l} {q} {l} {c} Z" {s}/>"#,
            l = c - 100.0,
            r = c + 100.0,
            t = c - 110.0,
            q = c + 90.0,
            b = c + 120.0
        ),
        FrameShape::Rectangle => format!(
            r#"<rect x="{}" y="{}" width="220" height="180" rx="6" {s}/>"#,
            c - 110.0,
            c - 90.0
        ),
        FrameShape::Horseshoe => format!(
            r#"<path d="M {} {y} A 110 110 0 1 1 {} {y}" stroke-linecap="round" {s}/>"#,
            c - 60.0,
            c + 60.0,
            y = c + 92.0
        ),
    };
    Some(element)
}

fn mark_element(mark: &str, modifier: MarkModifier) -> String {
    let font_size = match mark.chars().count() {
        1 => 120,
        2 => 96,
        _ => 72,
    };
    let c = CENTER;
    let transform = match modifier {
        MarkModifier::Lazy => format!(r#" transform="rotate(90 {c} {c})""#),
        MarkModifier::Tumbling => format!(r#" transform="rotate(45 {c} {c})""#),
        MarkModifier::Reversed => format!(r#" transform="translate({CANVAS_SIZE} 0) scale(-1 1)""#),
        MarkModifier::None | MarkModifier::Bar | MarkModifier::Rocking => String::new(),
    };
    format!(
        r#"<text x="{c}" y="{c}" text-anchor="middle" dominant-baseline="central" font-family="Georgia, serif" font-weight="bold" font-size="{font_size}" fill="{INK}"{transform}>{mark}</text>"#
    )
}

fn modifier_element(modifier: MarkModifier) -> Option<String> {
    let s = stroke(MARK_STROKE_WIDTH);
    let c = CENTER;
    match modifier {
        MarkModifier::Bar => Some(format!(
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke-linecap="round" {s}/>"#,
            c - 60.0,
            c + 60.0,
            y = c + 65.0
        )),
        MarkModifier::Rocking => Some(format!(
            r#"<path d="M {} {y} Q {c} {} {} {y}" stroke-linecap="round" {s}/>"#,
            c - 60.0,
            c + 100.0,
            c + 60.0,
            y = c + 60.0
        )),
        _ => None,
    }
}
