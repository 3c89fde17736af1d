//! Static HTML and CSS generation.
//!
//! Every element becomes an absolutely positioned `.element-N` box whose
//! geometry is expressed as percentages of the viewport it was designed in.

use crate::error::{ExportError, ExportResult};
use kurbo::Size;
use layoutweb_core::elements::{Element, ElementId, ElementKind, Fill, ImageSource, svg_points};
use std::fmt::Write;

const EMPTY_HTML: &str = "<!-- No elements yet -->";
const EMPTY_CSS: &str = "/* No elements yet */";
const PLACEHOLDER_IMAGE: &str = "placeholder.jpg";

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>My Layout</title>
  <link rel="stylesheet" href="style.css">
</head>
<body>
  <div class="container">
"#;

const HTML_TAIL: &str = "  </div>\n</body>\n</html>";

const CSS_PRELUDE: &str = "* {
  margin: 0;
  padding: 0;
  box-sizing: border-box;
}

.container {
  position: relative;
  width: 100vw;
  min-height: 100vh;
  background: #ffffff;
  overflow: hidden;
}

";

/// An image payload referenced by the generated markup.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    /// File name under `images/`, e.g. `image-1.png`.
    pub file_name: String,
    pub element: ElementId,
    pub source: ImageSource,
}

/// Everything the markup exporter produces for one layout.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupExport {
    pub html: String,
    pub css: String,
    pub assets: Vec<ImageAsset>,
}

/// Converts an element sequence into an HTML document and its stylesheet.
#[derive(Debug, Clone, Copy)]
pub struct MarkupExporter {
    viewport: Size,
}

impl MarkupExporter {
    /// Exporter resolving percentages against `viewport`.
    pub fn new(viewport: Size) -> ExportResult<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(viewport.width) || !valid(viewport.height) {
            return Err(ExportError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self { viewport })
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn export(&self, elements: &[Element]) -> MarkupExport {
        let export = MarkupExport {
            html: self.html(elements),
            css: self.css(elements),
            assets: image_assets(elements),
        };
        log::info!(
            "exported markup for {} element(s), {} image asset(s)",
            elements.len(),
            export.assets.len()
        );
        export
    }

    /// The HTML document, elements in sequence order.
    pub fn html(&self, elements: &[Element]) -> String {
        if elements.is_empty() {
            return EMPTY_HTML.to_string();
        }

        let mut html = String::from(HTML_HEAD);
        let mut image_number = 0;
        for (i, element) in elements.iter().enumerate() {
            let class = format!("element-{}", i + 1);
            match element.kind() {
                ElementKind::Text => {
                    let content = element.text.as_ref().map_or("", |t| t.content.as_str());
                    let _ = writeln!(
                        html,
                        "    <div class=\"{class}\"><span class=\"text-content\">{}</span></div>",
                        escape_text(content)
                    );
                }
                kind if kind.is_polygon() => {
                    let points = svg_points(kind).unwrap_or_default();
                    let _ = write!(
                        html,
                        "    <div class=\"{class}\">\n      <svg viewBox=\"0 0 100 100\" preserveAspectRatio=\"none\">\n        <polygon points=\"{points}\" />\n      </svg>\n    </div>\n"
                    );
                }
                ElementKind::Image => {
                    let file_name = if has_source(element) {
                        image_number += 1;
                        image_file_name(image_number)
                    } else {
                        PLACEHOLDER_IMAGE.to_string()
                    };
                    let _ = write!(
                        html,
                        "    <div class=\"{class}\">\n      <img src=\"images/{file_name}\" alt=\"\">\n    </div>\n"
                    );
                }
                _ => {
                    let _ = writeln!(html, "    <div class=\"{class}\"></div>");
                }
            }
        }
        html.push_str(HTML_TAIL);
        html
    }

    /// The stylesheet, one rule group per element.
    pub fn css(&self, elements: &[Element]) -> String {
        if elements.is_empty() {
            return EMPTY_CSS.to_string();
        }

        let mut css = String::from(CSS_PRELUDE);
        for (i, element) in elements.iter().enumerate() {
            self.write_element_css(&mut css, i + 1, element);
            css.push_str("\n\n");
        }
        css.trim().to_string()
    }

    fn write_element_css(&self, css: &mut String, n: usize, element: &Element) {
        let Size { width: vw, height: vh } = self.viewport;
        let _ = write!(
            css,
            ".element-{n} {{\n  position: absolute;\n  left: {}%;\n  top: {}%;\n  width: {}%;\n  height: {}%;\n  z-index: {n};",
            percent(element.x, vw),
            percent(element.y, vh),
            percent(element.width, vw),
            percent(element.height, vh),
        );
        if element.rotation != 0 {
            let _ = write!(
                css,
                "\n  transform: rotate({}deg);\n  transform-origin: center;",
                element.rotation
            );
        }

        let background = element.fill.to_css();
        match element.kind() {
            kind if kind.is_polygon() => {
                let _ = write!(
                    css,
                    "\n  background: transparent;\n}}\n\n.element-{n} svg {{\n  position: absolute;\n  top: 0;\n  left: 0;\n  width: 100%;\n  height: 100%;\n}}\n\n.element-{n} polygon {{\n  fill: {};",
                    svg_fill(&element.fill)
                );
                if element.border_width > 0.0 {
                    let _ = write!(
                        css,
                        "\n  stroke: {};\n  stroke-width: {};",
                        element.border_color.to_css(),
                        element.border_width
                    );
                }
                css.push_str("\n}");
            }
            ElementKind::Circle | ElementKind::Oval => {
                let _ = write!(css, "\n  background: {background};\n  border-radius: 50%;");
                write_border(css, element);
                css.push_str("\n}");
            }
            ElementKind::RoundedRect => {
                let _ = write!(
                    css,
                    "\n  background: {background};\n  border-radius: {}px;",
                    element.corner_radius
                );
                write_border(css, element);
                css.push_str("\n}");
            }
            ElementKind::Line => {
                let _ = write!(css, "\n  background: {background};\n  border-radius: 2px;\n}}");
            }
            ElementKind::Text => {
                let text = element.text.clone().unwrap_or_default();
                let _ = write!(
                    css,
                    "\n  display: flex;\n  align-items: center;\n  justify-content: {};\n  padding: 5px;\n  overflow: hidden;\n}}\n\n.element-{n} .text-content {{\n  display: block;\n  width: 100%;\n  font-size: {}px;\n  color: {};\n  font-weight: {};\n  font-family: {}, sans-serif;\n  text-align: {};\n  word-wrap: break-word;\n  white-space: pre-wrap;\n  line-height: 1.2;\n}}",
                    text.text_align.justify_content(),
                    text.font_size,
                    text.font_color.to_css(),
                    text.font_weight.css(),
                    text.font_family,
                    text.text_align.css(),
                );
            }
            ElementKind::Image => {
                let _ = write!(
                    css,
                    "\n  overflow: hidden;\n  border-radius: {}px;",
                    element.corner_radius
                );
                write_border(css, element);
                let _ = write!(
                    css,
                    "\n}}\n\n.element-{n} img {{\n  width: 100%;\n  height: 100%;\n  object-fit: cover;\n}}"
                );
            }
            _ => {
                let _ = write!(css, "\n  background: {background};");
                if element.corner_radius > 0.0 {
                    let _ = write!(css, "\n  border-radius: {}px;", element.corner_radius);
                }
                write_border(css, element);
                css.push_str("\n}");
            }
        }
    }
}

fn write_border(css: &mut String, element: &Element) {
    if element.border_width > 0.0 {
        let _ = write!(
            css,
            "\n  border: {}px solid {};",
            element.border_width,
            element.border_color.to_css()
        );
    }
}

/// `value` as a percentage of `total`, four decimals.
fn percent(value: f64, total: f64) -> String {
    format!("{:.4}", value / total * 100.0)
}

/// SVG `fill` has no gradient syntax; gradients fall back to their start color.
fn svg_fill(fill: &Fill) -> String {
    match fill {
        Fill::LinearGradient { from, .. } => from.to_css(),
        other => other.to_css(),
    }
}

/// Escape text content for HTML, turning newlines into `<br>`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
    out
}

fn has_source(element: &Element) -> bool {
    element.image.as_ref().is_some_and(|source| !source.is_empty())
}

pub fn image_file_name(number: usize) -> String {
    format!("image-{}.png", number)
}

/// Image payloads in sequence order, numbered from 1. Sourceless images are skipped.
pub fn image_assets(elements: &[Element]) -> Vec<ImageAsset> {
    elements
        .iter()
        .filter(|element| element.kind() == ElementKind::Image && has_source(element))
        .enumerate()
        .filter_map(|(i, element)| {
            Some(ImageAsset {
                file_name: image_file_name(i + 1),
                element: element.id(),
                source: element.image.clone()?,
            })
        })
        .collect()
}
