//! Classified script elements.

use serde::{Deserialize, Serialize};

/// The category a classifier assigns to a raw script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Scene,
    Action,
    Character,
    Parenthetical,
    Dialogue,
    Transition,
    Lyrics,
    Unknown,
}

/// One classified line. Carries the original text untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    Scene(String),
    Action(String),
    Character(String),
    Parenthetical(String),
    Dialogue(String),
    Transition(String),
    Lyrics(String),
    Unknown(String),
}

impl Element {
    pub fn new(kind: ElementKind, text: impl Into<String>) -> Self {
        let text = text.into();
        match kind {
            ElementKind::Scene => Element::Scene(text),
            ElementKind::Action => Element::Action(text),
            ElementKind::Character => Element::Character(text),
            ElementKind::Parenthetical => Element::Parenthetical(text),
            ElementKind::Dialogue => Element::Dialogue(text),
            ElementKind::Transition => Element::Transition(text),
            ElementKind::Lyrics => Element::Lyrics(text),
            ElementKind::Unknown => Element::Unknown(text),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Scene(_) => ElementKind::Scene,
            Element::Action(_) => ElementKind::Action,
            Element::Character(_) => ElementKind::Character,
            Element::Parenthetical(_) => ElementKind::Parenthetical,
            Element::Dialogue(_) => ElementKind::Dialogue,
            Element::Transition(_) => ElementKind::Transition,
            Element::Lyrics(_) => ElementKind::Lyrics,
            Element::Unknown(_) => ElementKind::Unknown,
        }
    }

    /// The original line text.
    pub fn text(&self) -> &str {
        match self {
            Element::Scene(t)
            | Element::Action(t)
            | Element::Character(t)
            | Element::Parenthetical(t)
            | Element::Dialogue(t)
            | Element::Transition(t)
            | Element::Lyrics(t)
            | Element::Unknown(t) => t,
        }
    }

    /// Text as it is printed: trimmed, with forced-element markers removed.
    pub fn display_text(&self) -> String {
        let trimmed = self.text().trim();
        let shown = match self {
            Element::Scene(_) => strip_forced(trimmed, '.'),
            Element::Action(_) => strip_forced(trimmed, '!'),
            Element::Character(_) => return CharacterCue::parse(trimmed).name,
            Element::Transition(_) => strip_forced(trimmed, '>'),
            Element::Lyrics(_) => strip_forced(trimmed, '~'),
            Element::Parenthetical(_) | Element::Dialogue(_) | Element::Unknown(_) => trimmed,
        };
        shown.trim().to_string()
    }

    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

fn strip_forced(text: &str, marker: char) -> &str {
    text.strip_prefix(marker).unwrap_or(text)
}

/// A parsed character cue: the printed name and whether it carries the dual
/// dialogue caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCue {
    pub name: String,
    pub dual: bool,
}

impl CharacterCue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (body, dual) = match trimmed.strip_suffix('^') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };
        let body = body.strip_prefix('@').unwrap_or(body);
        CharacterCue {
            name: body.trim().to_string(),
            dual,
        }
    }
}
