//! Text payload carried by text elements.

use super::SerializableColor;
use serde::{Deserialize, Serialize};

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// CSS `font-weight` value.
    pub fn css(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, FontWeight::Bold)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
    Justify,
}

impl TextAlign {
    /// CSS `text-align` value.
    pub fn css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }

    /// Flexbox `justify-content` value for the wrapping box.
    pub fn justify_content(&self) -> &'static str {
        match self {
            TextAlign::Left => "flex-start",
            TextAlign::Right => "flex-end",
            TextAlign::Center | TextAlign::Justify => "center",
        }
    }
}

/// Content and typography of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub content: String,
    pub font_size: f64,
    pub font_color: SerializableColor,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default = "default_family")]
    pub font_family: String,
}

fn default_family() -> String {
    TextBlock::DEFAULT_FAMILY.to_string()
}

impl TextBlock {
    pub const DEFAULT_CONTENT: &'static str = "Double click to edit";
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;
    pub const DEFAULT_FAMILY: &'static str = "Arial";
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.2;
    /// Inner padding of the text box on every side.
    pub const PADDING: f64 = 5.0;

    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Smallest height a text box may take: one and a half lines.
    pub fn min_height(&self) -> f64 {
        self.font_size * 1.5
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * Self::LINE_HEIGHT
    }

    /// Lines as typed; a trailing newline opens an empty last line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

impl Default for TextBlock {
    fn default() -> Self {
        Self {
            content: Self::DEFAULT_CONTENT.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_color: SerializableColor::black(),
            font_weight: FontWeight::default(),
            text_align: TextAlign::default(),
            font_family: default_family(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let text = TextBlock::default();
        assert_eq!(text.content, "Double click to edit");
        assert_eq!(text.font_family, "Arial");
        assert_eq!(text.text_align, TextAlign::Center);
        assert!((text.min_height() - 36.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lines() {
        let text = TextBlock::new("Hello\nWorld\n");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Hello", "World", ""]);
    }

    #[test]
    fn test_alignment_css() {
        assert_eq!(TextAlign::Left.justify_content(), "flex-start");
        assert_eq!(TextAlign::Right.justify_content(), "flex-end");
        assert_eq!(TextAlign::Justify.css(), "justify");
    }
}
