use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::hash::Hasher;
use twox_hash::XxHash64;

use docqa_core::config::EmbeddingSettings;
use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_text::TermAnalyzer;

use crate::norm::l2_normalize;

#[derive(Debug, Clone, Copy, Default)]
struct TermStats {
    count: u64,
    df: usize,
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    settings: EmbeddingSettings,
    analyzer: TermAnalyzer,
}

impl TfidfVectorizer {
    pub fn new(settings: EmbeddingSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings, analyzer: TermAnalyzer::english() })
    }

    /// Learn vocabulary and IDF weights from the complete corpus.
    ///
    /// Terms are ranked by total corpus frequency (ties alphabetical) and the
    /// top `max_features` survive. `max_df` pruning is skipped for a
    /// single-document corpus, where every term would otherwise be dropped.
    pub fn fit<S: AsRef<str>>(&self, corpus: &[S]) -> Result<TfidfModel> {
        if corpus.is_empty() {
            return Err(Error::processing("Cannot fit the term-weighting model on an empty corpus"));
        }
        let n = corpus.len();
        let ngram_max = self.settings.ngram_max;

        let mut stats: BTreeMap<String, TermStats> = BTreeMap::new();
        for doc in corpus {
            let terms = self.analyzer.terms(doc.as_ref(), ngram_max);
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &terms {
                let first_in_doc = seen.insert(term.as_str());
                let entry = stats.entry(term.clone()).or_default();
                entry.count += 1;
                if first_in_doc {
                    entry.df += 1;
                }
            }
        }

        let min_df = self.settings.min_df;
        let max_doc_count = if n > 1 { self.settings.max_df * n as f64 } else { f64::INFINITY };
        let mut kept: Vec<(&String, &TermStats)> = stats
            .iter()
            .filter(|(_, s)| s.df >= min_df && (s.df as f64) <= max_doc_count)
            .collect();
        if kept.is_empty() && !stats.is_empty() {
            tracing::warn!(terms = stats.len(), documents = n, "max_df pruned every term; keeping the unpruned vocabulary");
            kept = stats.iter().filter(|(_, s)| s.df >= min_df).collect();
        }

        kept.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        kept.truncate(self.settings.max_features);
        kept.sort_by(|a, b| a.0.cmp(b.0));

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (column, (term, s)) in kept.into_iter().enumerate() {
            vocabulary.insert(term.clone(), column);
            idf.push(smooth_idf(n, s.df));
        }

        if vocabulary.is_empty() {
            tracing::warn!(documents = n, "corpus produced an empty vocabulary; all vectors will be zero");
        }
        tracing::debug!(documents = n, candidates = stats.len(), vocabulary = vocabulary.len(), "fitted tf-idf model");

        Ok(TfidfModel {
            dimension: self.settings.dimension,
            ngram_max,
            vocabulary,
            idf,
            document_count: n,
            analyzer: self.analyzer.clone(),
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn smooth_idf(n: usize, df: usize) -> f32 {
    (((1 + n) as f64 / (1 + df) as f64).ln() + 1.0) as f32
}

/// Fitted vocabulary and per-term weights. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfModel {
    dimension: usize,
    ngram_max: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
    document_count: usize,
    #[serde(skip)]
    analyzer: TermAnalyzer,
}

impl TfidfModel {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|&col| self.idf[col])
    }

    /// Term counts weighted by IDF, L2-normalized, zero-padded to `dimension`.
    /// Out-of-vocabulary terms are ignored.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        for term in self.analyzer.terms(text, self.ngram_max) {
            if let Some(&col) = self.vocabulary.get(&term) {
                v[col] += 1.0;
            }
        }
        for (x, w) in v.iter_mut().zip(&self.idf) {
            *x *= w;
        }
        l2_normalize(&mut v);
        v
    }

    /// Stable identifier of the fitted model (`tfidf:d<dim>:<hash>`).
    pub fn model_id(&self) -> String {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write_usize(self.dimension);
        hasher.write_usize(self.ngram_max);
        for (term, &col) in &self.vocabulary {
            hasher.write(term.as_bytes());
            hasher.write_u8(0xff);
            hasher.write_u32(self.idf[col].to_bits());
        }
        format!("tfidf:d{}:{:016x}", self.dimension, hasher.finish())
    }

    pub fn approximate_memory_bytes(&self) -> usize {
        let terms: usize = self.vocabulary.keys().map(|t| t.len() + std::mem::size_of::<usize>() * 2).sum();
        terms + self.idf.len() * std::mem::size_of::<f32>()
    }

    /// Checks the invariants a deserialized model must hold.
    pub fn validate(&self) -> Result<()> {
        if self.idf.len() != self.vocabulary.len() || self.vocabulary.len() > self.dimension {
            return Err(Error::Snapshot(format!(
                "model has {} terms, {} weights and dimension {}",
                self.vocabulary.len(),
                self.idf.len(),
                self.dimension
            )));
        }
        if self.vocabulary.values().any(|&col| col >= self.idf.len()) {
            return Err(Error::Snapshot("model vocabulary points past its weight table".into()));
        }
        Ok(())
    }
}

impl Embedder for TfidfModel {
    fn dim(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        self.transform(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer() -> TfidfVectorizer {
        TfidfVectorizer::new(EmbeddingSettings::default()).expect("valid settings")
    }

    #[test]
    fn single_document_keeps_its_terms() {
        let model = vectorizer().fit(&["Cats are mammals. Dogs are also mammals."]).expect("fit");
        // cats, dogs, mammals + cats mammals, mammals dogs, dogs mammals
        assert_eq!(model.vocabulary_size(), 6);
        assert_eq!(model.document_count(), 1);
        assert!(model.idf("dogs").is_some());
        assert!(model.idf("are").is_none(), "stop words never enter the vocabulary");
    }

    #[test]
    fn rare_terms_weigh_more() {
        let corpus = ["solar panel wiring", "solar battery storage", "solar inverter sizing"];
        let settings = EmbeddingSettings { max_df: 1.0, ..EmbeddingSettings::default() };
        let model = TfidfVectorizer::new(settings).expect("settings").fit(&corpus).expect("fit");
        let common = model.idf("solar").expect("solar kept");
        let rare = model.idf("battery").expect("battery kept");
        assert!(rare > common);
        assert!((common - 1.0).abs() < 1e-6, "a term in every document gets idf 1");
    }

    #[test]
    fn max_df_drops_ubiquitous_terms() {
        let corpus = ["solar panel wiring", "solar battery storage", "solar inverter sizing"];
        let model = vectorizer().fit(&corpus).expect("fit");
        assert!(model.idf("solar").is_none());
        assert!(model.idf("panel").is_some());
    }

    #[test]
    fn max_features_caps_vocabulary_by_frequency() {
        let settings = EmbeddingSettings { dimension: 8, max_features: 2, ngram_max: 1, ..EmbeddingSettings::default() };
        let corpus = ["apple apple apple banana", "banana banana cherry", "durian"];
        let model = TfidfVectorizer::new(settings).expect("settings").fit(&corpus).expect("fit");
        assert_eq!(model.vocabulary_size(), 2);
        assert!(model.idf("banana").is_some() && model.idf("apple").is_some());
        assert_eq!(model.dimension(), 8);
    }

    #[test]
    fn transform_is_deterministic_and_fixed_length() {
        let model = vectorizer().fit(&["rainwater harvesting basics", "greywater filtration guide"]).expect("fit");
        let a = model.transform("harvesting rainwater");
        let b = model.transform("harvesting rainwater");
        assert_eq!(a.len(), 384);
        assert_eq!(a.iter().map(|x| x.to_bits()).collect::<Vec<_>>(), b.iter().map(|x| x.to_bits()).collect::<Vec<_>>());
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn out_of_vocabulary_query_is_zero() {
        let model = vectorizer().fit(&["rainwater harvesting basics"]).expect("fit");
        assert!(model.transform("quantum chromodynamics").iter().all(|&x| x == 0.0));
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let empty: [&str; 0] = [];
        assert_eq!(vectorizer().fit(&empty).err().map(|e| e.kind()), Some("processing"));
    }

    #[test]
    fn model_survives_serde_round_trip() {
        let model = vectorizer().fit(&["rainwater harvesting basics", "greywater filtration guide"]).expect("fit");
        let json = serde_json::to_string(&model).expect("serialize");
        let restored: TfidfModel = serde_json::from_str(&json).expect("deserialize");
        restored.validate().expect("valid");
        assert_eq!(restored.model_id(), model.model_id());
        assert_eq!(restored.transform("greywater guide"), model.transform("greywater guide"));
    }
}
