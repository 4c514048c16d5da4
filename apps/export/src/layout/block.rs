//! Dialogue block collection.

use crate::script::{Element, ElementKind, LineClassifier};

/// One line under a character cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLine {
    /// `Dialogue` or `Parenthetical`.
    pub kind: ElementKind,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueBlock {
    pub lines: Vec<BlockLine>,
}

impl DialogueBlock {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A gathered block and the index of the first line it did not take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    pub block: DialogueBlock,
    pub next_index: usize,
}

pub struct BlockCollector<'c, C: LineClassifier + ?Sized> {
    classifier: &'c C,
}

impl<'c, C: LineClassifier + ?Sized> BlockCollector<'c, C> {
    pub fn new(classifier: &'c C) -> Self {
        BlockCollector { classifier }
    }

    /// Gathers lines from `start` until a blank line or a line outside the
    /// dialogue set. Indented action lines are absorbed as dialogue.
    pub fn collect(&self, lines: &[&str], start: usize) -> Collected {
        let mut block = DialogueBlock::default();
        let mut idx = start;

        while idx < lines.len() {
            if lines[idx].trim().is_empty() {
                break;
            }
            let element = self.classifier.classify(lines, idx);
            let kind = match &element {
                Element::Dialogue(_) => ElementKind::Dialogue,
                Element::Parenthetical(_) => ElementKind::Parenthetical,
                Element::Action(raw) if raw.starts_with([' ', '\t']) => ElementKind::Dialogue,
                _ => break,
            };
            block.lines.push(BlockLine {
                kind,
                text: element.display_text(),
            });
            idx += 1;
        }

        Collected {
            block,
            next_index: idx,
        }
    }
}
