use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::color::HexColor;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SafezoneError, SafezoneResult};
use crate::render::cpu::{image_paint, premul_bytes_to_pixmap};

/// Look of the empty state drawn when no visual is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderStyle {
    pub background: HexColor,
    pub text_color: HexColor,
    pub font_family: String,
    pub font_size_px: f32,
    /// Centered instructional text. Empty disables the text layer.
    pub label: String,
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self {
            background: HexColor::rgb(0xf0, 0xf0, 0xf0),
            text_color: HexColor::rgb(0xbb, 0xbb, 0xbb),
            font_family: "Arial, sans-serif".to_string(),
            font_size_px: 50.0,
            label: "Your Creative Here".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct TextKey {
    canvas: Canvas,
    style: PlaceholderStyle,
}

/// Rasterizes the placeholder label through usvg/resvg and keeps the last layer around.
///
/// The label is horizontally centered with its baseline on the vertical center, like a 2D
/// canvas `fillText` with `textAlign = "center"`.
#[derive(Default)]
pub(crate) struct PlaceholderText {
    fontdb: Option<Arc<usvg::fontdb::Database>>,
    cached: Option<(TextKey, vello_cpu::Image)>,
}

impl PlaceholderText {
    pub(crate) fn layer(
        &mut self,
        style: &PlaceholderStyle,
        canvas: Canvas,
    ) -> SafezoneResult<Option<vello_cpu::Image>> {
        if style.label.trim().is_empty() {
            return Ok(None);
        }
        let key = TextKey {
            canvas,
            style: style.clone(),
        };
        if let Some((k, img)) = &self.cached
            && *k == key
        {
            return Ok(Some(img.clone()));
        }

        let svg = placeholder_svg(style, canvas);
        let opts = usvg::Options {
            fontdb: self.fontdb(),
            font_resolver: fallback_font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
            .map_err(|e| SafezoneError::render(format!("placeholder svg: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| SafezoneError::render("failed to allocate placeholder pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        let layer = image_paint(premul_bytes_to_pixmap(
            pixmap.data(),
            canvas.width,
            canvas.height,
        )?);
        self.cached = Some((key, layer.clone()));
        Ok(Some(layer))
    }

    fn fontdb(&mut self) -> Arc<usvg::fontdb::Database> {
        self.fontdb
            .get_or_insert_with(|| {
                let mut db = usvg::fontdb::Database::new();
                db.load_system_fonts();
                tracing::debug!(faces = db.len(), "loaded system fonts for placeholder text");
                Arc::new(db)
            })
            .clone()
    }
}

fn placeholder_svg(style: &PlaceholderStyle, canvas: Canvas) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><text x="{cx}" y="{cy}" font-family="{family}" font-size="{size}" fill="{fill}" text-anchor="middle">{label}</text></svg>"#,
        w = canvas.width,
        h = canvas.height,
        cx = f64::from(canvas.width) / 2.0,
        cy = f64::from(canvas.height) / 2.0,
        family = escape_xml(&style.font_family),
        size = style.font_size_px,
        fill = style.text_color.to_hex(),
        label = escape_xml(&style.label),
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Requested families first, then generic families, then any face at all.
fn fallback_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Serif);

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style: usvg::fontdb::Style::Normal,
            };
            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/placeholder.rs"]
mod tests;
