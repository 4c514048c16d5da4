//! Static font-metric tables for the screenplay typefaces the writers understand.
//!
//! Character widths are in em units (relative to font size), taken from the
//! standard AFM metrics. All tables cover ASCII 0x20..=0x7E (95 printable
//! characters). Index = (char as usize) - 32.

use std::path::Path;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    /// Adobe Courier, the screenplay default.
    Courier,
    /// Courier Prime. Same advance widths as Courier.
    CourierPrime,
    /// Proportional fallback for draft printouts.
    Helvetica,
}

impl FontFamily {
    /// Resolves a built-in font name ("Courier", "Courier-Bold", "Courier Prime",
    /// "Helvetica"). Returns `None` for anything else, including file paths.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "courier" | "courier bold" | "courier oblique" | "courier new" => {
                Some(FontFamily::Courier)
            }
            "courier prime" | "courierprime" => Some(FontFamily::CourierPrime),
            "helvetica" | "helvetica bold" | "arial" => Some(FontFamily::Helvetica),
            _ => None,
        }
    }

    /// Picks metrics for a font file by its name. Screenplay fonts are
    /// monospaced, so unrecognized files measure as Courier.
    pub fn for_font_file(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if stem.contains("helvetica") || stem.contains("arial") {
            FontFamily::Helvetica
        } else if stem.contains("prime") {
            FontFamily::CourierPrime
        } else {
            FontFamily::Courier
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: FontFamily,
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

/// Absorbs float noise when a line fills the column exactly.
const FIT_TOLERANCE_EM: f32 = 1e-4;

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Greedy word wrap at `max_width_em`. Words wider than a full line are
    /// broken between characters. Always returns at least one line, so a
    /// whitespace-only string occupies one (empty) line.
    pub fn wrap(&self, text: &str, max_width_em: f32) -> Vec<String> {
        let limit = max_width_em + FIT_TOLERANCE_EM;
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.measure_str(word);

            if !current.is_empty() && current_width + self.space_width + word_w <= limit {
                current.push(' ');
                current.push_str(word);
                current_width += self.space_width + word_w;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_w <= limit {
                current.push_str(word);
                current_width = word_w;
            } else {
                // Overlong word: hard-break it, keeping the tail as the open line.
                for c in word.chars() {
                    let cw = self.char_width(c);
                    if !current.is_empty() && current_width + cw > limit {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(c);
                    current_width += cw;
                }
            }
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Courier: every glyph advances 600/1000 em.
static COURIER_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Courier,
    widths: [0.60; 95],
    average_char_width: 0.60,
    space_width: 0.60,
};

static COURIER_PRIME_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::CourierPrime,
    widths: [0.60; 95],
    average_char_width: 0.60,
    space_width: 0.60,
};

/// Helvetica: standard 14 AFM advance widths.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Helvetica,
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0     1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :     ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A     B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N     O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [     \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a     b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n     o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {     |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.53,
    space_width: 0.278,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Courier => &COURIER_TABLE,
        FontFamily::CourierPrime => &COURIER_PRIME_TABLE,
        FontFamily::Helvetica => &HELVETICA_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(FontFamily::Courier).measure_str(""), 0.0);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let metrics = get_metrics(FontFamily::Courier);
        let wide = metrics.measure_str("WWWW");
        let narrow = metrics.measure_str("iiii");
        assert!((wide - narrow).abs() < 1e-6);
        assert!((wide - 2.4).abs() < 1e-4, "4 chars at 0.6em, got {wide}");
    }

    #[test]
    fn test_helvetica_ascii_characters() {
        let metrics = get_metrics(FontFamily::Helvetica);
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = metrics.measure_str("Rust");
        assert!((width - 2.056).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let metrics = get_metrics(FontFamily::Helvetica);
        assert!((metrics.measure_str("é") - metrics.average_char_width).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let metrics = get_metrics(FontFamily::Courier);
        assert_eq!(metrics.wrap("Hello there.", 30.0), vec!["Hello there."]);
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        let metrics = get_metrics(FontFamily::Courier);
        // 10 chars per line at 6em.
        let lines = metrics.wrap("aaaa bbbb cccc", 6.0);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_wrap_exact_fit_stays_on_one_line() {
        let metrics = get_metrics(FontFamily::Courier);
        // "aaaa bbbb" is 9 chars = 5.4em.
        assert_eq!(metrics.wrap("aaaa bbbb", 5.4).len(), 1);
    }

    #[test]
    fn test_wrap_hard_breaks_overlong_word() {
        let metrics = get_metrics(FontFamily::Courier);
        let lines = metrics.wrap("abcdefghij", 2.4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_blank_text_occupies_one_line() {
        let metrics = get_metrics(FontFamily::Courier);
        assert_eq!(metrics.wrap(" ", 10.0), vec![String::new()]);
        assert_eq!(metrics.wrap("", 10.0).len(), 1);
    }

    #[test]
    fn test_font_name_resolution() {
        assert_eq!(FontFamily::from_name("Courier"), Some(FontFamily::Courier));
        assert_eq!(FontFamily::from_name("courier-bold"), Some(FontFamily::Courier));
        assert_eq!(FontFamily::from_name("Courier Prime"), Some(FontFamily::CourierPrime));
        assert_eq!(FontFamily::from_name("fonts/Foo.ttf"), None);
    }

    #[test]
    fn test_font_file_metrics_by_stem() {
        assert_eq!(
            FontFamily::for_font_file(Path::new("/fonts/CourierPrime-Regular.ttf")),
            FontFamily::CourierPrime
        );
        assert_eq!(
            FontFamily::for_font_file(Path::new("/fonts/Anything.otf")),
            FontFamily::Courier
        );
    }
}
