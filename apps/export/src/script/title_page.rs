//! Title page detection.
//!
//! A script may open with a block of `Key: Value` lines. The block only counts
//! as a title page when one of its keys is `Title`; otherwise the whole input
//! is script body.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static KEY_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9 _\-]*):[ \t]*(.*)$").unwrap());

/// Ordered `Key: Value` pairs from the title block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMetadata {
    pub entries: Vec<(String, String)>,
}

impl TitleMetadata {
    /// Case-insensitive lookup; the first matching key wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.get("Title")
    }

    pub fn credit(&self) -> Option<&str> {
        self.get("Credit")
    }

    pub fn author(&self) -> Option<&str> {
        self.get("Author").or_else(|| self.get("Authors"))
    }

    pub fn source(&self) -> Option<&str> {
        self.get("Source")
    }

    pub fn draft_date(&self) -> Option<&str> {
        self.get("Draft date")
    }

    pub fn contact(&self) -> Option<&str> {
        self.get("Contact")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of scanning the head of a script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePage {
    /// Number of leading lines that belong to the title block. The terminating
    /// blank or non-matching line is not counted.
    pub consumed: usize,
    pub metadata: TitleMetadata,
}

impl TitlePage {
    pub fn is_present(&self) -> bool {
        self.consumed > 0
    }
}

/// Scans `lines` from the start for a title block.
pub fn parse_title_page(lines: &[&str]) -> TitlePage {
    let mut entries = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        let Some(caps) = KEY_VALUE_RE.captures(line) else {
            break;
        };
        entries.push((caps[1].trim().to_string(), caps[2].trim().to_string()));
    }

    let metadata = TitleMetadata { entries };
    if metadata.title().is_none() {
        return TitlePage::default();
    }

    TitlePage {
        consumed: metadata.entries.len(),
        metadata,
    }
}
