// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO PROVEDOR E DO PIPELINE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Todas as configurações vêm de variáveis de ambiente (ou .env carregado
// pelo binário). A presença de `OPENAI_API_KEY` liga o modo com embeddings;
// sem ela o pipeline roda em modo somente-aleatório.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::path::PathBuf;
use std::time::Duration;

use crate::fingerprint::DEFAULT_MAX_CHARS;
use crate::ranker::DEFAULT_TOP_K;
use crate::utils::pacing::DEFAULT_CALL_SPACING;

/// URL base padrão da API de embeddings
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Erros de configuração (sempre fatais, antes de qualquer chamada à API)
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("OPENAI_EMBEDDING_MODEL environment variable is required when OPENAI_API_KEY is set")]
    MissingModel,

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Configuração do provedor de embeddings
#[derive(Clone)]
pub struct EmbeddingConfig {
    pub api_key: String,
    /// URL base (sem `/embeddings`)
    pub base_url: String,
    /// Modelo de embeddings (obrigatório)
    pub model: String,
    /// Timeout por requisição
    pub timeout: Duration,
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Configuração da execução de geração
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Arquivo do cache de embeddings
    pub cache_path: PathBuf,
    /// Diretório onde os artefatos do índice são escritos
    pub output_dir: PathBuf,
    /// Número de vizinhos por documento
    pub top_k: usize,
    /// Intervalo mínimo entre chamadas ao provedor
    pub call_spacing: Duration,
    /// Truncamento do texto normalizado
    pub max_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("embeddings_store/cache.json"),
            output_dir: PathBuf::from("public/js"),
            top_k: DEFAULT_TOP_K,
            call_spacing: DEFAULT_CALL_SPACING,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Lê uma variável, tratando string vazia como ausente
fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match non_empty(lookup, key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

/// Monta a configuração do provedor a partir de uma fonte de variáveis.
///
/// - Sem `OPENAI_API_KEY` → `Ok(None)` (modo somente-aleatório)
/// - Com chave mas sem `OPENAI_EMBEDDING_MODEL` → [`ConfigError::MissingModel`]
/// - URL base: `OPENAI_BASE_URL`, depois `OPENAI_ENDPOINT`, depois o padrão
pub fn embedding_config_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<EmbeddingConfig>, ConfigError> {
    let Some(api_key) = non_empty(&lookup, "OPENAI_API_KEY") else {
        return Ok(None);
    };

    let model = non_empty(&lookup, "OPENAI_EMBEDDING_MODEL").ok_or(ConfigError::MissingModel)?;

    let base_url = non_empty(&lookup, "OPENAI_BASE_URL")
        .or_else(|| non_empty(&lookup, "OPENAI_ENDPOINT"))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout_secs = parse_number::<u64>(&lookup, "RECOMMENDER_REQUEST_TIMEOUT_SECS")?.unwrap_or(60);

    Ok(Some(EmbeddingConfig {
        api_key,
        base_url: base_url.trim_end_matches('/').to_string(),
        model,
        timeout: Duration::from_secs(timeout_secs),
    }))
}

/// Monta a configuração do pipeline a partir de uma fonte de variáveis.
///
/// Variáveis suportadas:
/// - `RECOMMENDER_CACHE_PATH` (padrão: `embeddings_store/cache.json`)
/// - `RECOMMENDER_OUTPUT_DIR` (padrão: `public/js`)
/// - `RECOMMENDER_TOP_K` (padrão: 5)
/// - `RECOMMENDER_CALL_DELAY_MS` (padrão: 200)
/// - `RECOMMENDER_MAX_CHARS` (padrão: 30000)
pub fn pipeline_config_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PipelineConfig, ConfigError> {
    let mut config = PipelineConfig::default();

    if let Some(path) = non_empty(&lookup, "RECOMMENDER_CACHE_PATH") {
        config.cache_path = PathBuf::from(path);
    }
    if let Some(dir) = non_empty(&lookup, "RECOMMENDER_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    if let Some(k) = parse_number::<usize>(&lookup, "RECOMMENDER_TOP_K")? {
        if k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RECOMMENDER_TOP_K".into(),
                value: "0".into(),
            });
        }
        config.top_k = k;
    }
    if let Some(ms) = parse_number::<u64>(&lookup, "RECOMMENDER_CALL_DELAY_MS")? {
        config.call_spacing = Duration::from_millis(ms);
    }
    if let Some(max) = parse_number::<usize>(&lookup, "RECOMMENDER_MAX_CHARS")? {
        config.max_chars = max;
    }

    Ok(config)
}

/// Carrega a configuração do provedor das variáveis de ambiente
pub fn load_embedding_config() -> Result<Option<EmbeddingConfig>, ConfigError> {
    let config = embedding_config_from(|key| std::env::var(key).ok())?;
    match &config {
        Some(c) => log::info!("📦 Embeddings: modelo={} base={}", c.model, c.base_url),
        None => log::info!("📦 OPENAI_API_KEY ausente: modo somente-aleatório"),
    }
    Ok(config)
}

/// Carrega a configuração do pipeline das variáveis de ambiente
pub fn load_pipeline_config() -> Result<PipelineConfig, ConfigError> {
    let config = pipeline_config_from(|key| std::env::var(key).ok())?;
    log::info!(
        "📦 Pipeline: cache={:?} saída={:?} top_k={} intervalo={}ms",
        config.cache_path,
        config.output_dir,
        config.top_k,
        config.call_spacing.as_millis()
    );
    Ok(config)
}
