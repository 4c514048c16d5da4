pub mod classifier;
pub mod element;
pub mod title_page;

pub use classifier::{FountainClassifier, LineClassifier};
pub use element::{CharacterCue, Element, ElementKind};
pub use title_page::{parse_title_page, TitleMetadata, TitlePage};
