use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_K1: f32 = 1.5;
pub const DEFAULT_B: f32 = 0.75;
/// Standard RRF smoothing constant (Cormack, Clarke and Buettcher, SIGIR 2009).
///
/// Smaller values put more emphasis on the very top of each list.
pub const DEFAULT_RRF_K: usize = 60;
pub const DEFAULT_SIGNAL_WEIGHT: f32 = 0.5;
/// Weight used for a sparse or late-interaction list when none is configured
pub const DEFAULT_OPTIONAL_SIGNAL_WEIGHT: f32 = 0.25;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// BM25 scoring constants
    pub bm25: Bm25Config,

    /// Hybrid fusion configuration
    pub fusion: FusionConfig,

    /// Tool server limits
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Term frequency saturation
    pub k1: f32,
    /// Document length normalization, in [0, 1]
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self {
            k1: DEFAULT_K1,
            b: DEFAULT_B,
        }
    }
}

impl Bm25Config {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::Config(format!("BM25 k1 must be >= 0, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::Config(format!("BM25 b must be within [0, 1], got {}", self.b)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionStrategy {
    /// Weighted reciprocal rank fusion
    #[default]
    Rrf,
    /// Weighted sum of min-max normalized scores
    Linear,
}

impl FromStr for FusionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rrf" => Ok(FusionStrategy::Rrf),
            "linear" => Ok(FusionStrategy::Linear),
            other => Err(Error::Config(format!("Unknown fusion strategy: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    pub vector_weight: f32,
    pub keyword_weight: f32,
    pub sparse_weight: Option<f32>,
    pub late_weight: Option<f32>,
    /// RRF smoothing constant
    pub rrf_k: usize,
    pub strategy: FusionStrategy,
    /// Keyword candidates fetched per requested result
    pub keyword_candidate_factor: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            vector_weight: DEFAULT_SIGNAL_WEIGHT,
            keyword_weight: DEFAULT_SIGNAL_WEIGHT,
            sparse_weight: None,
            late_weight: None,
            rrf_k: DEFAULT_RRF_K,
            strategy: FusionStrategy::Rrf,
            keyword_candidate_factor: 3,
        }
    }
}

impl FusionConfig {
    pub fn sparse_weight_or_default(&self) -> f32 {
        self.sparse_weight.unwrap_or(DEFAULT_OPTIONAL_SIGNAL_WEIGHT)
    }

    pub fn late_weight_or_default(&self) -> f32 {
        self.late_weight.unwrap_or(DEFAULT_OPTIONAL_SIGNAL_WEIGHT)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("vector", Some(self.vector_weight)),
            ("keyword", Some(self.keyword_weight)),
            ("sparse", self.sparse_weight),
            ("late", self.late_weight),
        ];
        for (name, weight) in weights {
            if let Some(w) = weight {
                if !w.is_finite() || w < 0.0 {
                    return Err(Error::Config(format!(
                        "{name} weight must be a non-negative number, got {w}"
                    )));
                }
            }
        }
        if self.rrf_k == 0 {
            return Err(Error::Config("RRF k must be greater than 0".to_string()));
        }
        if self.keyword_candidate_factor == 0 {
            return Err(Error::Config(
                "Keyword candidate factor must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub default_top_k: usize,
    pub max_top_k: usize,
    /// JSON file of `{id?, content}` documents indexed at start-up
    pub seed_documents: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            max_top_k: 50,
            seed_documents: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from defaults overridden by `lookup(VAR_NAME)`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(k1) = parse_var(&lookup, "BM25_K1")? {
            config.bm25.k1 = k1;
        }
        if let Some(b) = parse_var(&lookup, "BM25_B")? {
            config.bm25.b = b;
        }

        if let Some(rrf_k) = parse_var(&lookup, "RRF_K")? {
            config.fusion.rrf_k = rrf_k;
        }
        if let Some(weight) = parse_var(&lookup, "VECTOR_WEIGHT")? {
            config.fusion.vector_weight = weight;
        }
        if let Some(weight) = parse_var(&lookup, "KEYWORD_WEIGHT")? {
            config.fusion.keyword_weight = weight;
        }
        config.fusion.sparse_weight = parse_var(&lookup, "SPARSE_WEIGHT")?;
        config.fusion.late_weight = parse_var(&lookup, "LATE_WEIGHT")?;
        if let Some(strategy) = parse_var(&lookup, "FUSION_STRATEGY")? {
            config.fusion.strategy = strategy;
        }
        if let Some(factor) = parse_var(&lookup, "KEYWORD_CANDIDATE_FACTOR")? {
            config.fusion.keyword_candidate_factor = factor;
        }

        if let Some(top_k) = parse_var(&lookup, "DEFAULT_TOP_K")? {
            config.server.default_top_k = top_k;
        }
        if let Some(max) = parse_var(&lookup, "MAX_TOP_K")? {
            config.server.max_top_k = max;
        }
        if let Some(path) = lookup("SEED_DOCUMENTS").filter(|p| !p.trim().is_empty()) {
            config.server.seed_documents = Some(PathBuf::from(path.trim()));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.bm25.validate()?;
        self.fusion.validate()?;
        if self.server.max_top_k == 0 {
            return Err(Error::Config("MAX_TOP_K must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {key} ('{raw}'): {e}"))),
    }
}
