//! Title and subtitle drawing.
//!
//! Labels are laid out as an SVG `<text>` overlay the size of the canvas and
//! drawn by resvg on top of the shapes. Glyphs come from the bundled DejaVu
//! Sans faces, so output does not depend on the fonts installed on the host
//! and any text those faces cover (accents, Greek, Cyrillic, bullets) renders.
//!
//! A label's anchor is the left end of its baseline. Sizes are typographic
//! points scaled by the poster DPI.

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use poster_engine_core::error::PosterError;
use poster_engine_core::scene::{Label, LabelStyle, Poster};
use resvg::tiny_skia::Transform;
use tracing::trace;

use crate::raster::Raster;

/// Family name of the bundled faces.
pub const FONT_FAMILY: &str = "DejaVu Sans";

const SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const SANS_BOLD: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

fn fontdb() -> Arc<usvg::fontdb::Database> {
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_font_data(SANS.to_vec());
            db.load_font_data(SANS_BOLD.to_vec());
            Arc::new(db)
        })
        .clone()
}

/// Point size of a label style.
pub fn point_size(style: LabelStyle) -> f64 {
    match style {
        LabelStyle::Title => 16.0,
        LabelStyle::Subtitle => 11.0,
    }
}

/// Font size in pixels at `dpi`.
pub fn font_px(style: LabelStyle, dpi: u32) -> f64 {
    point_size(style) * f64::from(dpi) / 72.0
}

/// SVG document holding the poster's non-empty labels, or `None` when there
/// is nothing to draw.
pub fn labels_svg(poster: &Poster) -> Option<String> {
    let labels: Vec<&Label> = poster
        .labels()
        .iter()
        .filter(|l| !l.text.trim().is_empty())
        .collect();
    if labels.is_empty() {
        return None;
    }

    let (w, h) = (poster.width(), poster.height());
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    for label in labels {
        let anchor = poster.to_pixels(label.anchor);
        let weight = match label.style {
            LabelStyle::Title => "bold",
            LabelStyle::Subtitle => "normal",
        };
        // Writing to a String cannot fail.
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="{FONT_FAMILY}" font-size="{:.3}" font-weight="{weight}" fill="{}" xml:space="preserve">{}</text>"#,
            anchor.x,
            anchor.y,
            font_px(label.style, poster.dpi()),
            label.color.to_hex(),
            escape(&label.text),
        );
    }
    svg.push_str("</svg>");
    Some(svg)
}

/// Draws the poster's labels over `raster`.
pub fn draw_labels(poster: &Poster, raster: &mut Raster) -> Result<(), PosterError> {
    let Some(svg) = labels_svg(poster) else {
        return Ok(());
    };
    let opts = usvg::Options {
        fontdb: fontdb(),
        font_family: FONT_FAMILY.to_string(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| PosterError::Encoding(format!("label layout: {e}")))?;
    resvg::render(&tree, Transform::identity(), &mut raster.as_pixmap_mut());
    trace!(bytes = svg.len(), "labels drawn");
    Ok(())
}

/// XML-escapes `text` and drops control characters, which XML cannot carry.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
