//! Corpus-fitted TF-IDF vectorizer.
//!
//! `TfidfVectorizer::fit` must see the whole chunk corpus because IDF weights
//! depend on corpus-wide document frequencies; the resulting `TfidfModel` is
//! immutable and transforms any text into a fixed-length, L2-normalized vector.
pub mod norm;
pub mod tfidf;

pub use norm::{cosine, l2_normalize};
pub use tfidf::{TfidfModel, TfidfVectorizer};
