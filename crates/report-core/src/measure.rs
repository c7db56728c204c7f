//! Text measurement and word wrapping

use crate::style::{FontWeight, TextStyle, PT_TO_MM};

/// Measures rendered text width
pub trait TextMeasure: Send + Sync {
    /// Width of `text` in millimetres when set in `style`
    fn width(&self, text: &str, style: &TextStyle) -> f64;
}

/// Advance widths (1/1000 em) for printable ASCII, from the Helvetica AFM
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' to '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0' to '?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@' to 'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P' to '_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`' to 'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p' to '~'
];

/// Same table for Helvetica-Bold
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for anything outside printable ASCII
const FALLBACK_ADVANCE: u16 = 556;

/// Metrics of the standard Helvetica faces the PDF writer references
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    fn advance(c: char, weight: FontWeight) -> u16 {
        let table = match weight {
            FontWeight::Regular => &HELVETICA,
            FontWeight::Bold => &HELVETICA_BOLD,
        };
        match c {
            ' '..='~' => table[c as usize - 0x20],
            _ => FALLBACK_ADVANCE,
        }
    }
}

impl TextMeasure for Helvetica {
    fn width(&self, text: &str, style: &TextStyle) -> f64 {
        let units: u32 = text
            .chars()
            .map(|c| Self::advance(c, style.weight) as u32)
            .sum();
        units as f64 / 1000.0 * style.size * PT_TO_MM
    }
}

/// Greedy word wrap.
///
/// Breaks only at whitespace. A word wider than `max_width` gets a line of
/// its own and is never split. Newlines in `text` always start a new line;
/// blank input lines come back as empty strings.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    style: &TextStyle,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let space = measure.width(" ", style);
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in source_line.split_whitespace() {
            let word_width = measure.width(word, style);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_width;
            }
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::ColorRole;
    use pretty_assertions::assert_eq;

    /// Every character is 1mm wide
    struct Monospace;

    impl TextMeasure for Monospace {
        fn width(&self, text: &str, _style: &TextStyle) -> f64 {
            text.chars().count() as f64
        }
    }

    fn body() -> TextStyle {
        TextStyle::new(11.0, ColorRole::Body)
    }

    #[test]
    fn test_helvetica_space_width() {
        // 278/1000 em at 10pt
        let style = TextStyle::new(10.0, ColorRole::Body);
        let width = Helvetica.width(" ", &style);
        assert!((width - 0.278 * 10.0 * PT_TO_MM).abs() < 1e-9);
    }

    #[test]
    fn test_bold_is_wider_for_lowercase() {
        let regular = body();
        let bold = body().bold();
        assert!(Helvetica.width("findings", &bold) > Helvetica.width("findings", &regular));
    }

    #[test]
    fn test_non_ascii_uses_fallback_width() {
        let style = TextStyle::new(10.0, ColorRole::Body);
        assert_eq!(Helvetica.width("é", &style), Helvetica.width("0", &style));
    }

    #[test]
    fn test_wrap_breaks_at_word_boundaries() {
        let lines = wrap_text("aaa bbb ccc ddd", 7.0, &body(), &Monospace);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_wrap_long_word_sits_alone() {
        let lines = wrap_text("a pneumonoultramicroscopic b", 6.0, &body(), &Monospace);
        assert_eq!(lines, vec!["a", "pneumonoultramicroscopic", "b"]);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap_text("first\n\nsecond", 80.0, &body(), &Monospace);
        assert_eq!(lines, vec!["first", "", "second"]);
    }

    #[test]
    fn test_wrap_collapses_runs_of_spaces() {
        let lines = wrap_text("a    b", 80.0, &body(), &Monospace);
        assert_eq!(lines, vec!["a b"]);
    }
}
