//! docqa-text
//!
//! Text normalization and term analysis shared by chunking and the
//! term-weighting model. Tokenization runs on tantivy's analyzer pipeline.
pub mod analyzer;
pub mod clean;

pub use analyzer::{TermAnalyzer, ENGLISH_STOP_WORDS};
pub use clean::TextCleaner;
