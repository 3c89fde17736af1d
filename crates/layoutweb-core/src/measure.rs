//! Text height measurement.

use crate::elements::{FontWeight, TextBlock};

/// Measures the rendered height of wrapped text.
pub trait TextMeasurer {
    /// Height of `content` laid out at `width` (including the box padding),
    /// wrapping on words and honouring explicit newlines.
    fn measure(
        &self,
        content: &str,
        width: f64,
        font_size: f64,
        font_family: &str,
        weight: FontWeight,
    ) -> f64;
}

/// Height a text box needs for its content at `width`, never below 1.5 lines.
pub fn fitted_height(measurer: &dyn TextMeasurer, text: &TextBlock, width: f64) -> f64 {
    let measured = measurer.measure(
        &text.content,
        width,
        text.font_size,
        &text.font_family,
        text.font_weight,
    );
    let measured = if measured.is_finite() { measured } else { 0.0 };
    text.min_height().max(measured)
}

/// Greedy word wrap of a single line against a width predicate.
///
/// Words longer than the available width are broken per character.
pub fn wrap_line<F>(line: &str, max_width: f64, width_of: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if width_of(&candidate) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if width_of(word) <= max_width {
            current = word.to_string();
            continue;
        }
        for ch in word.chars() {
            current.push(ch);
            if width_of(&current) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }
    }
    lines.push(current);
    lines
}

/// Measurer based on average glyph advances, usable without any font data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxTextMeasurer {
    /// Average advance as a fraction of the font size.
    pub char_width: f64,
    /// Average advance for bold text.
    pub bold_char_width: f64,
}

impl Default for ApproxTextMeasurer {
    fn default() -> Self {
        Self {
            char_width: 0.55,
            bold_char_width: 0.6,
        }
    }
}

impl TextMeasurer for ApproxTextMeasurer {
    fn measure(
        &self,
        content: &str,
        width: f64,
        font_size: f64,
        _font_family: &str,
        weight: FontWeight,
    ) -> f64 {
        if !font_size.is_finite() || font_size <= 0.0 {
            return 0.0;
        }
        let advance = font_size
            * if weight.is_bold() {
                self.bold_char_width
            } else {
                self.char_width
            };
        let inner = (width - 2.0 * TextBlock::PADDING).max(advance);

        let line_count: usize = content
            .split('\n')
            .map(|line| wrap_line(line, inner, |s| s.chars().count() as f64 * advance).len())
            .sum();
        line_count as f64 * font_size * TextBlock::LINE_HEIGHT + 2.0 * TextBlock::PADDING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_count(s: &str) -> f64 {
        s.chars().count() as f64
    }

    #[test]
    fn test_wrap_line_on_words() {
        assert_eq!(
            wrap_line("aaa bbb ccc", 7.0, char_count),
            vec!["aaa bbb".to_string(), "ccc".to_string()]
        );
    }

    #[test]
    fn test_wrap_line_breaks_long_words() {
        assert_eq!(
            wrap_line("abcdefgh", 3.0, char_count),
            vec!["abc".to_string(), "def".to_string(), "gh".to_string()]
        );
    }

    #[test]
    fn test_wrap_empty_line() {
        assert_eq!(wrap_line("", 10.0, char_count), vec![String::new()]);
    }

    #[test]
    fn test_two_lines_narrow_box() {
        let text = TextBlock::new("Hello\nWorld");
        let height = fitted_height(&ApproxTextMeasurer::default(), &text, 80.0);
        assert!(height >= 57.6, "height was {height}");
    }

    #[test]
    fn test_trailing_newline_adds_line() {
        let measurer = ApproxTextMeasurer::default();
        let one = measurer.measure("Hi", 200.0, 24.0, "Arial", FontWeight::Normal);
        let two = measurer.measure("Hi\n", 200.0, 24.0, "Arial", FontWeight::Normal);
        assert!((two - one - 28.8).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        let measurer = ApproxTextMeasurer::default();
        assert_eq!(measurer.measure("x", 100.0, 0.0, "Arial", FontWeight::Normal), 0.0);
        let zero_width = measurer.measure("abc", 0.0, 24.0, "Arial", FontWeight::Bold);
        assert!(zero_width.is_finite());

        let text = TextBlock::new("");
        let height = fitted_height(&measurer, &text, f64::NAN);
        assert!((height - 38.8).abs() < 1e-9);
    }
}
