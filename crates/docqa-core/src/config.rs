use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment
            .merge(Env::raw().only(&["GOOGLE_API_KEY"]).map(|_| "generation.api_key".into()))
            .merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    /// The fully merged, validated settings tree.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> Result<()> {
        match env {
            "prod" | "production" => {
                let generation: GenerationSettings = self.get("generation")?;
                if generation.provider == GenerationProvider::Gemini && generation.api_key.is_empty() {
                    return Err(Error::InvalidConfig(
                        "generation.api_key (or GOOGLE_API_KEY) is required in production".into(),
                    ));
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            other => tracing::debug!(env = other, "unknown RUST_ENV, using base config only"),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub ingest: IngestSettings,
    pub storage: StorageSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.embedding.validate()?;
        self.retrieval.validate()?;
        if self.generation.timeout_secs == 0 {
            return Err(Error::InvalidConfig("generation.timeout_secs must be positive".into()));
        }
        if self.ingest.max_file_bytes == 0 {
            return Err(Error::InvalidConfig("ingest.max_file_bytes must be positive".into()));
        }
        Ok(())
    }
}

/// Term-weighting model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Fixed length of every produced vector; vocabularies smaller than this are zero-padded.
    pub dimension: usize,
    pub max_features: usize,
    pub ngram_max: usize,
    /// Terms present in more than this fraction of chunks are dropped.
    pub max_df: f64,
    pub min_df: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { dimension: 384, max_features: 384, ngram_max: 2, max_df: 0.95, min_df: 1 }
    }
}

impl EmbeddingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 || self.max_features == 0 {
            return Err(Error::InvalidConfig("embedding.dimension and embedding.max_features must be positive".into()));
        }
        if self.max_features > self.dimension {
            return Err(Error::InvalidConfig(format!(
                "embedding.max_features ({}) exceeds embedding.dimension ({})",
                self.max_features, self.dimension
            )));
        }
        if !(1..=3).contains(&self.ngram_max) {
            return Err(Error::InvalidConfig("embedding.ngram_max must be between 1 and 3".into()));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::InvalidConfig("embedding.max_df must be in (0, 1]".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub preview_chars: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { default_top_k: 5, max_top_k: 20, preview_chars: 200 }
    }
}

impl RetrievalSettings {
    pub fn validate(&self) -> Result<()> {
        if self.default_top_k == 0 || self.default_top_k > self.max_top_k {
            return Err(Error::InvalidConfig(format!(
                "retrieval.default_top_k must be in 1..={} (got {})",
                self.max_top_k, self.default_top_k
            )));
        }
        if self.preview_chars == 0 {
            return Err(Error::InvalidConfig("retrieval.preview_chars must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    Gemini,
    OpenAi,
    Extractive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub provider: GenerationProvider,
    /// Base URL; empty selects the provider's public endpoint.
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::Gemini,
            endpoint: String::new(),
            model: "gemini-1.5-flash".to_string(),
            api_key: String::new(),
            temperature: 0.2,
            max_output_tokens: 1024,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub max_file_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: 50 * 1024 * 1024,
            allowed_extensions: vec!["pdf".into(), "txt".into(), "docx".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub snapshot_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { snapshot_path: "storage/indexes/docqa.snapshot.json".to_string() }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
