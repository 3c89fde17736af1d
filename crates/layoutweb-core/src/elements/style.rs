//! Colors and fills.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    ///
    /// Anything else is rejected, so callers can keep their previous value.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            6 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Lowercase `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else if self.a == 0 && self.r == 0 && self.g == 0 && self.b == 0 {
            "transparent".to_string()
        } else {
            let alpha = f64::from(self.a) / 255.0;
            format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, alpha)
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Background of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Fill {
    /// Fully transparent.
    None,
    /// Single color.
    Solid { color: SerializableColor },
    /// Two-stop linear gradient. The angle follows CSS: 0 points up, 90 points right.
    LinearGradient {
        angle: i32,
        from: SerializableColor,
        to: SerializableColor,
    },
}

impl Default for Fill {
    fn default() -> Self {
        Fill::Solid {
            color: SerializableColor::black(),
        }
    }
}

impl Fill {
    pub fn solid(color: SerializableColor) -> Self {
        Fill::Solid { color }
    }

    /// Parse the CSS subset produced by the color picker:
    /// `transparent`, `#rrggbb[aa]` and `linear-gradient(<n>deg, #a, #b)`.
    pub fn parse(css: &str) -> Option<Self> {
        let css = css.trim();
        if css.eq_ignore_ascii_case("transparent") || css.eq_ignore_ascii_case("none") {
            return Some(Fill::None);
        }
        if let Some(color) = SerializableColor::from_hex(css) {
            return Some(Fill::Solid { color });
        }

        let args = css
            .strip_prefix("linear-gradient(")
            .and_then(|rest| rest.strip_suffix(')'))?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let [angle, from, to] = parts.as_slice() else {
            return None;
        };
        let angle: f64 = angle.strip_suffix("deg")?.trim().parse().ok()?;
        if !angle.is_finite() {
            return None;
        }
        Some(Fill::LinearGradient {
            angle: angle.round() as i32,
            from: SerializableColor::from_hex(from)?,
            to: SerializableColor::from_hex(to)?,
        })
    }

    /// CSS `background` value.
    pub fn to_css(&self) -> String {
        match self {
            Fill::None => "transparent".to_string(),
            Fill::Solid { color } => color.to_css(),
            Fill::LinearGradient { angle, from, to } => {
                format!("linear-gradient({}deg, {}, {})", angle, from.to_css(), to.to_css())
            }
        }
    }

    /// Whether drawing this fill would change any pixel.
    pub fn is_visible(&self) -> bool {
        match self {
            Fill::None => false,
            Fill::Solid { color } => !color.is_transparent(),
            Fill::LinearGradient { from, to, .. } => !(from.is_transparent() && to.is_transparent()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(
            SerializableColor::from_hex("#ff6b6b"),
            Some(SerializableColor::new(255, 107, 107, 255))
        );
        assert_eq!(
            SerializableColor::from_hex("#00000080"),
            Some(SerializableColor::new(0, 0, 0, 128))
        );
        assert_eq!(SerializableColor::from_hex("ff6b6b"), None);
        assert_eq!(SerializableColor::from_hex("#ff6b6"), None);
        assert_eq!(SerializableColor::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_css_output() {
        assert_eq!(SerializableColor::new(69, 183, 209, 255).to_css(), "#45b7d1");
        assert_eq!(SerializableColor::transparent().to_css(), "transparent");
    }

    #[test]
    fn test_fill_parse() {
        assert_eq!(Fill::parse("transparent"), Some(Fill::None));
        assert_eq!(
            Fill::parse("#000000"),
            Some(Fill::solid(SerializableColor::black()))
        );
        assert_eq!(
            Fill::parse("linear-gradient(90deg, #ff0000, #ffffff)"),
            Some(Fill::LinearGradient {
                angle: 90,
                from: SerializableColor::new(255, 0, 0, 255),
                to: SerializableColor::white(),
            })
        );
        assert_eq!(Fill::parse("linear-gradient(90deg, #ff0000)"), None);
        assert_eq!(Fill::parse("red"), None);
    }

    #[test]
    fn test_fill_visibility() {
        let clear = SerializableColor::new(0, 0, 0, 0);
        assert!(!Fill::None.is_visible());
        assert!(!Fill::solid(clear).is_visible());
        assert!(Fill::solid(SerializableColor::black()).is_visible());
        let half_clear = Fill::LinearGradient {
            angle: 0,
            from: clear,
            to: SerializableColor::white(),
        };
        assert!(half_clear.is_visible());
    }

    #[test]
    fn test_gradient_css_is_reparseable() {
        let fill = Fill::LinearGradient {
            angle: 135,
            from: SerializableColor::new(78, 205, 196, 255),
            to: SerializableColor::white(),
        };
        assert_eq!(Fill::parse(&fill.to_css()), Some(fill));
    }

    #[test]
    fn test_peniko_conversion() {
        let color = SerializableColor::new(10, 20, 30, 40);
        let peniko: Color = color.into();
        assert_eq!(SerializableColor::from(peniko), color);
    }
}
