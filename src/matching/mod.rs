pub mod event_matcher;
pub mod vocabulary;

pub use event_matcher::{normalize, EventMatcher};
pub use vocabulary::Vocabulary;
