use std::fmt;

use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "also", "am", "among", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either", "else", "etc",
    "ever", "every", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "may", "me", "might", "more", "most", "much", "must", "my", "myself", "neither", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out",
    "over", "own", "per", "same", "shall", "she", "should", "since", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "thus", "to", "too", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "were",
    "what", "when", "where", "whether", "which", "while", "who", "whom", "whose", "why", "will", "with",
    "within", "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Lowercasing, stop-word-removing tokenizer that also emits word n-grams.
///
/// N-grams are formed over the token sequence after stop words are removed,
/// so "cats are mammals" yields the bigram "cats mammals".
#[derive(Clone)]
pub struct TermAnalyzer {
    analyzer: TextAnalyzer,
}

impl TermAnalyzer {
    pub fn english() -> Self {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(StopWordFilter::remove(ENGLISH_STOP_WORDS.iter().map(|s| (*s).to_string())))
            .build();
        Self { analyzer }
    }

    pub fn tokens(&self, text: &str) -> Vec<String> {
        // token_stream needs &mut; clones share the underlying tokenizer config.
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut out = Vec::new();
        while stream.advance() {
            out.push(stream.token().text.clone());
        }
        out
    }

    /// Unigrams followed by every n-gram up to `ngram_max`, space-joined.
    pub fn terms(&self, text: &str, ngram_max: usize) -> Vec<String> {
        let tokens = self.tokens(text);
        let mut terms = tokens.clone();
        for n in 2..=ngram_max {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}

impl Default for TermAnalyzer {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Debug for TermAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermAnalyzer").field("stop_words", &ENGLISH_STOP_WORDS.len()).finish()
    }
}
