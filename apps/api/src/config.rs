use anyhow::{bail, Context, Result};

const DEFAULT_EMBEDDING_API_URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_HASH_DIMENSION: usize = 384;
const DEFAULT_HTTP_DIMENSION: usize = 1536;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Deterministic feature hashing, no network.
    Hash,
    /// OpenAI-compatible embeddings endpoint.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    Embedding,
    Llm,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is malformed or a selected backend is missing its key.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_api_url: String,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    /// 0 disables the embedding cache.
    pub embedding_cache_size: usize,
    pub classifier_backend: ClassifierBackend,
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let embedding_backend = match lookup("EMBEDDING_BACKEND").as_deref() {
            None | Some("hash") => EmbeddingBackend::Hash,
            Some("http") => EmbeddingBackend::Http,
            Some(other) => bail!("EMBEDDING_BACKEND must be 'hash' or 'http', got '{other}'"),
        };

        let classifier_backend = match lookup("CLASSIFIER_BACKEND").as_deref() {
            None | Some("embedding") => ClassifierBackend::Embedding,
            Some("llm") => ClassifierBackend::Llm,
            Some(other) => bail!("CLASSIFIER_BACKEND must be 'embedding' or 'llm', got '{other}'"),
        };

        let embedding_api_key = lookup("EMBEDDING_API_KEY");
        if embedding_backend == EmbeddingBackend::Http && embedding_api_key.is_none() {
            bail!("Required environment variable 'EMBEDDING_API_KEY' is not set (EMBEDDING_BACKEND=http)");
        }

        let anthropic_api_key = lookup("ANTHROPIC_API_KEY");
        if classifier_backend == ClassifierBackend::Llm && anthropic_api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set (CLASSIFIER_BACKEND=llm)");
        }

        let default_dimension = match embedding_backend {
            EmbeddingBackend::Hash => DEFAULT_HASH_DIMENSION,
            EmbeddingBackend::Http => DEFAULT_HTTP_DIMENSION,
        };

        let embedding_dimension: usize =
            parse_or(&lookup, "EMBEDDING_DIMENSION", default_dimension)
                .context("EMBEDDING_DIMENSION must be a positive integer")?;
        if embedding_dimension == 0 {
            bail!("EMBEDDING_DIMENSION must be a positive integer");
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            embedding_backend,
            embedding_api_url: lookup("EMBEDDING_API_URL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_API_URL.to_string()),
            embedding_api_key,
            embedding_model: lookup("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension,
            embedding_cache_size: parse_or(&lookup, "EMBEDDING_CACHE_SIZE", 0)
                .context("EMBEDDING_CACHE_SIZE must be a non-negative integer")?,
            classifier_backend,
            anthropic_api_key,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for '{key}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_need_no_keys() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.embedding_backend, EmbeddingBackend::Hash);
        assert_eq!(config.embedding_dimension, 384);
        assert_eq!(config.embedding_cache_size, 0);
        assert_eq!(config.classifier_backend, ClassifierBackend::Embedding);
    }

    #[test]
    fn test_http_backend_requires_api_key() {
        assert!(config_from(&[("EMBEDDING_BACKEND", "http")]).is_err());

        let config =
            config_from(&[("EMBEDDING_BACKEND", "http"), ("EMBEDDING_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.embedding_backend, EmbeddingBackend::Http);
        assert_eq!(config.embedding_dimension, 1536);
        assert_eq!(config.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn test_llm_classifier_requires_anthropic_key() {
        assert!(config_from(&[("CLASSIFIER_BACKEND", "llm")]).is_err());
        let config =
            config_from(&[("CLASSIFIER_BACKEND", "llm"), ("ANTHROPIC_API_KEY", "key")]).unwrap();
        assert_eq!(config.classifier_backend, ClassifierBackend::Llm);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(config_from(&[("EMBEDDING_BACKEND", "bert")]).is_err());
        assert!(config_from(&[("CLASSIFIER_BACKEND", "svm")]).is_err());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("EMBEDDING_CACHE_SIZE", "-1")]).is_err());
        assert!(config_from(&[("EMBEDDING_DIMENSION", "0")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("EMBEDDING_DIMENSION", "64"),
            ("EMBEDDING_CACHE_SIZE", "500"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.embedding_dimension, 64);
        assert_eq!(config.embedding_cache_size, 500);
    }
}
