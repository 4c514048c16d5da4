//! Line classification for Fountain-style screenplay text.
//!
//! Classification is context-sensitive: whether a line is dialogue depends on
//! the first line of its paragraph being a character cue. The layout pass
//! re-classifies every line at the moment it visits it, so implementations
//! only ever see the raw line slice and an index.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::script::element::{CharacterCue, Element, ElementKind};

static SCENE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(int\.?/ext|i/e|int|ext|est)[.\s]").unwrap());

static TRANSITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z0-9 .'\-]+ TO:|FADE OUT\.?|FADE TO BLACK\.?|CUT TO BLACK\.?)$").unwrap()
});

/// Labels one raw line. Implementations must be pure: the same slice and
/// index always produce the same element.
pub trait LineClassifier: Send + Sync {
    fn classify(&self, lines: &[&str], idx: usize) -> Element;
}

/// Default classifier following the Fountain plain-text screenplay rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct FountainClassifier;

impl LineClassifier for FountainClassifier {
    fn classify(&self, lines: &[&str], idx: usize) -> Element {
        let raw = lines[idx];
        let kind = self.kind_of(lines, idx);
        Element::new(kind, raw)
    }
}

impl FountainClassifier {
    fn kind_of(&self, lines: &[&str], idx: usize) -> ElementKind {
        let raw = lines[idx];
        let t = raw.trim();

        if t.is_empty() || is_markup(t) {
            return ElementKind::Unknown;
        }

        if let Some(kind) = forced_kind(t) {
            return kind;
        }
        if SCENE_RE.is_match(t) {
            return ElementKind::Scene;
        }
        if TRANSITION_RE.is_match(t) {
            return ElementKind::Transition;
        }

        if self.in_dialogue(lines, idx) {
            if t.starts_with('(') && t.ends_with(')') {
                return ElementKind::Parenthetical;
            }
            if raw.starts_with([' ', '\t']) {
                return ElementKind::Action;
            }
            return ElementKind::Dialogue;
        }

        if is_cue_position(lines, idx) && looks_like_cue(t) {
            return ElementKind::Character;
        }
        ElementKind::Action
    }

    /// True when the paragraph containing `idx` opens with a character cue.
    fn in_dialogue(&self, lines: &[&str], idx: usize) -> bool {
        if idx == 0 || is_blank(lines[idx - 1]) {
            return false;
        }
        let mut start = idx - 1;
        while start > 0 && !is_blank(lines[start - 1]) {
            start -= 1;
        }
        // `start` has a blank (or nothing) above it, so this cannot recurse again.
        self.kind_of(lines, start) == ElementKind::Character
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Notes, sections, synopses, boneyard and page-break markers.
fn is_markup(t: &str) -> bool {
    t.starts_with("[[") || t.starts_with("/*") || t.starts_with('#') || t.starts_with('=')
}

fn forced_kind(t: &str) -> Option<ElementKind> {
    let first = t.chars().next()?;
    match first {
        '!' => Some(ElementKind::Action),
        '@' => Some(ElementKind::Character),
        '~' => Some(ElementKind::Lyrics),
        '.' if !t.starts_with("..") => Some(ElementKind::Scene),
        '>' if t.ends_with('<') => Some(ElementKind::Action),
        '>' => Some(ElementKind::Transition),
        _ => None,
    }
}

/// A cue needs a blank line (or the start of input) above and text below.
fn is_cue_position(lines: &[&str], idx: usize) -> bool {
    let above_clear = idx == 0 || is_blank(lines[idx - 1]);
    let below_filled = lines.get(idx + 1).is_some_and(|next| !is_blank(next));
    above_clear && below_filled
}

fn looks_like_cue(t: &str) -> bool {
    let cue = CharacterCue::parse(t);
    let name = cue.name.split('(').next().unwrap_or_default();
    name.chars().any(|c| c.is_ascii_uppercase()) && !name.chars().any(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<ElementKind> {
        let lines: Vec<&str> = text.lines().collect();
        (0..lines.len())
            .map(|i| FountainClassifier.classify(&lines, i).kind())
            .collect()
    }

    #[test]
    fn test_scene_heading_variants() {
        for heading in [
            "INT. HOUSE - DAY",
            "EXT. PARK",
            "int/ext car - night",
            "I/E TRAIN",
            ".MONTAGE",
        ] {
            assert_eq!(kinds(heading), vec![ElementKind::Scene], "{heading}");
        }
    }

    #[test]
    fn test_dialogue_block_shape() {
        let text = "\nJOHN\n(quietly)\nI know.\n  beat\nI always knew.";
        assert_eq!(
            kinds(text),
            vec![
                ElementKind::Unknown,
                ElementKind::Character,
                ElementKind::Parenthetical,
                ElementKind::Dialogue,
                ElementKind::Action,
                ElementKind::Dialogue,
            ]
        );
    }

    #[test]
    fn test_caps_line_without_following_text_is_action() {
        assert_eq!(kinds("BOOM!\n\nThe wall falls."), vec![
            ElementKind::Action,
            ElementKind::Unknown,
            ElementKind::Action,
        ]);
    }

    #[test]
    fn test_caps_line_inside_paragraph_is_not_a_cue() {
        let text = "She reads the sign.\nNO ENTRY\nThen leaves.";
        assert_eq!(kinds(text), vec![ElementKind::Action; 3]);
    }

    #[test]
    fn test_transitions() {
        assert_eq!(kinds("CUT TO:"), vec![ElementKind::Transition]);
        assert_eq!(kinds("FADE OUT."), vec![ElementKind::Transition]);
        assert_eq!(kinds(">Burn to white."), vec![ElementKind::Transition]);
        assert_eq!(kinds(">THE END<"), vec![ElementKind::Action]);
    }

    #[test]
    fn test_dual_and_extension_cues() {
        let text = "MARY (V.O.) ^\nHello.";
        assert_eq!(kinds(text), vec![ElementKind::Character, ElementKind::Dialogue]);
        let text = "@McCLANE\nYippee.";
        assert_eq!(kinds(text), vec![ElementKind::Character, ElementKind::Dialogue]);
    }

    #[test]
    fn test_forced_lyrics_and_markup() {
        assert_eq!(kinds("~La la la"), vec![ElementKind::Lyrics]);
        assert_eq!(kinds("[[note to self]]"), vec![ElementKind::Unknown]);
        assert_eq!(kinds("# ACT ONE"), vec![ElementKind::Unknown]);
        assert_eq!(kinds("==="), vec![ElementKind::Unknown]);
    }

    #[test]
    fn test_classification_is_repeatable() {
        let lines = vec!["", "JOHN", "Hi there."];
        let first = FountainClassifier.classify(&lines, 2);
        let second = FountainClassifier.classify(&lines, 2);
        assert_eq!(first, second);
        assert_eq!(first, Element::Dialogue("Hi there.".into()));
    }
}
