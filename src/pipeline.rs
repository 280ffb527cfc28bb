// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PIPELINE DE GERAÇÃO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Uma execução por build do site:
//
//   carrega cache → embeda corpus → salva cache → ranqueia → grava índice
//
// O cache é salvo antes do ranking: uma queda depois disso não perde
// os embeddings pagos. O índice só é gravado com o cálculo completo.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::EmbeddingCache;
use crate::config::{
    embedding_config_from, load_embedding_config, load_pipeline_config, pipeline_config_from,
    ConfigError, EmbeddingConfig, PipelineConfig,
};
use crate::corpus::{Corpus, CorpusError};
use crate::embedder::{CorpusEmbedder, EmbeddingReport};
use crate::embedding::{EmbeddingProvider, OpenAiEmbeddingClient, ProviderError};
use crate::index::{ArtifactSummary, IndexError, IndexWriter, RecommendationIndex, RecommendationIndexBuilder};
use crate::ranker::SimilarityRanker;
use crate::utils::{CallSpacing, StageTimer, StageTiming};

/// Erros fatais de uma execução
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Embedding client error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Index write error: {0}")]
    Index(#[from] IndexError),
}

/// Resumo de uma execução
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Identificador da execução (aparece nos logs)
    pub run_id: Uuid,
    pub documents: usize,
    pub embeddings: EmbeddingReport,
    /// Documentos com ao menos um vizinho
    pub ranked: usize,
    /// Cache gravado nesta execução
    pub cache_saved: bool,
    /// Sem provedor configurado
    pub random_only: bool,
    pub data_files: usize,
    /// Duração de cada etapa, na ordem de execução
    pub stages: Vec<StageTiming>,
}

impl GenerationReport {
    /// Soma das etapas cronometradas
    pub fn elapsed_ms(&self) -> u64 {
        self.stages.iter().map(|s| s.elapsed_ms).sum()
    }
}

/// Resultado completo: índice em memória + resumo
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub index: RecommendationIndex,
    pub artifacts: ArtifactSummary,
    pub report: GenerationReport,
}

/// Pipeline de geração com dependências explícitas
pub struct GenerationPipeline<'p> {
    provider: Option<&'p dyn EmbeddingProvider>,
    spacing: CallSpacing,
    cache_path: PathBuf,
    output_dir: PathBuf,
    top_k: usize,
    max_chars: usize,
}

impl<'p> GenerationPipeline<'p> {
    /// `provider = None` roda em modo somente-aleatório
    pub fn new(config: &PipelineConfig, provider: Option<&'p dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            spacing: CallSpacing::new(config.call_spacing),
            cache_path: config.cache_path.clone(),
            output_dir: config.output_dir.clone(),
            top_k: config.top_k,
            max_chars: config.max_chars,
        }
    }

    /// Substitui a política de espaçamento (ex.: `CallSpacing::disabled()` em testes)
    pub fn with_spacing(mut self, spacing: CallSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Executa a geração completa
    pub async fn run(&self, corpus: &Corpus) -> Result<GenerationOutput, PipelineError> {
        let run_id = Uuid::new_v4();
        let mut stages = Vec::with_capacity(3);
        log::info!(
            "🚀 Execução {}: {} documentos, top-{}",
            run_id,
            corpus.len(),
            self.top_k
        );

        // 1. Embeddings (cache + provedor)
        let mut cache = EmbeddingCache::load_or_default(&self.cache_path);
        let timer = StageTimer::start("Embeddings");
        let outcome = CorpusEmbedder::new(self.provider, self.spacing.clone())
            .with_max_chars(self.max_chars)
            .embed_corpus(corpus, &mut cache)
            .await;
        stages.push(timer.finish());

        // 2. Cache: falha ao salvar não impede o índice
        let cache_saved = match cache.flush() {
            Ok(saved) => saved,
            Err(e) => {
                log::error!("❌ Não foi possível salvar o cache: {}", e);
                false
            }
        };

        // 3. Ranking
        let timer = StageTimer::start("Ranking");
        let index = RecommendationIndexBuilder::new(SimilarityRanker::new(self.top_k))
            .build(corpus, &outcome.vectors);
        stages.push(timer.finish());

        // 4. Artefatos
        let timer = StageTimer::start("Escrita");
        let artifacts = IndexWriter::new(&self.output_dir).write(&index)?;
        stages.push(timer.finish());

        let report = GenerationReport {
            run_id,
            documents: corpus.len(),
            embeddings: outcome.report,
            ranked: index.ranked_count(),
            cache_saved,
            random_only: self.provider.is_none(),
            data_files: artifacts.data_files,
            stages,
        };

        log::info!(
            "✅ Execução {} concluída em {}ms: {}/{} documentos com recomendações",
            run_id,
            report.elapsed_ms(),
            report.ranked,
            report.documents
        );

        Ok(GenerationOutput {
            index,
            artifacts,
            report,
        })
    }
}

/// Execução completa a partir de variáveis de configuração.
///
/// Lê a configuração via `lookup`, carrega o manifesto do corpus e cria o
/// cliente de embeddings quando `OPENAI_API_KEY` está presente. Qualquer
/// falha antes da geração vira [`PipelineError`].
pub async fn generate_with(
    corpus_path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<GenerationOutput, PipelineError> {
    let config = pipeline_config_from(&lookup)?;
    let embedding = embedding_config_from(&lookup)?;
    generate(corpus_path, &config, embedding.as_ref()).await
}

/// [`generate_with`] lendo as variáveis de ambiente do processo
pub async fn generate_from_env(corpus_path: &Path) -> Result<GenerationOutput, PipelineError> {
    let config = load_pipeline_config()?;
    let embedding = load_embedding_config()?;
    generate(corpus_path, &config, embedding.as_ref()).await
}

async fn generate(
    corpus_path: &Path,
    config: &PipelineConfig,
    embedding: Option<&EmbeddingConfig>,
) -> Result<GenerationOutput, PipelineError> {
    let corpus = Corpus::load(corpus_path)?;
    let client = embedding.map(OpenAiEmbeddingClient::new).transpose()?;
    let provider = client.as_ref().map(|c| c as &dyn EmbeddingProvider);

    GenerationPipeline::new(config, provider).run(&corpus).await
}
