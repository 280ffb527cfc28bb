//! # Post Recommender
//!
//! Gera recomendações de "posts relacionados" para um site estático a partir
//! da similaridade de conteúdo, e seleciona no cliente o que exibir.
//!
//! ## Como funciona
//!
//! Em tempo de build:
//! 1. Cada documento vira um texto normalizado (`Title: ...` + corpo sem
//!    front-matter) e ganha um fingerprint SHA-256
//! 2. O cache de embeddings evita chamadas à API para conteúdo inalterado
//! 3. Documentos novos ou alterados são embedados (uma chamada por vez,
//!    com intervalo mínimo entre chamadas)
//! 4. Cada documento recebe os top-K vizinhos por similaridade cosseno
//! 5. O índice é gravado como arquivos JSON estáticos
//!
//! Na página:
//! - O seletor combina vizinhos pré-calculados com descoberta aleatória
//! - Qualquer fonte ausente degrada para o que estiver disponível
//!
//! ## Arquitetura
//!
//! ### 1. Geração (`pipeline`)
//! - [`fingerprint`]: normalização e hash do conteúdo
//! - [`cache`]: cache persistido `path → {hash, embedding, model}`
//! - [`embedding`]: provedores (OpenAI-compatible e mock)
//! - [`embedder`]: orquestra cache + provedor + espaçamento
//! - [`ranker`]: top-K por similaridade (Rayon + SIMD)
//! - [`index`]: montagem e escrita dos artefatos
//!
//! ### 2. Cliente (`selector`, `source`)
//! - [`selector`]: vizinhos + preenchimento aleatório (Fisher–Yates)
//! - [`source`]: leitura dos artefatos por HTTP ou disco
//!
//! ## Modos de operação
//!
//! | `OPENAI_API_KEY` | Resultado |
//! |------------------|-----------|
//! | definida | embeddings + vizinhos por similaridade |
//! | ausente | somente cache; demais documentos com recomendações aleatórias |
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use post_recommender::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let corpus = Corpus::load("corpus.json".as_ref())?;
//!     let config = PipelineConfig::default();
//!     let output = GenerationPipeline::new(&config, None).run(&corpus).await?;
//!     println!("{} documentos indexados", output.report.documents);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o sistema.
///
/// - [`types::Document`]: documento do corpus
/// - [`types::PostData`]: entrada do índice com vizinhos
/// - [`types::IndexSummary`]: entrada do índice leve
/// - [`types::Recommendation`]: item exibido pelo cliente
pub mod types;

/// Fingerprint de conteúdo (normalização + SHA-256).
pub mod fingerprint;

/// Cache persistido de embeddings por documento.
pub mod cache;

/// Provedores de embeddings.
///
/// - [`embedding::OpenAiEmbeddingClient`]: endpoints compatíveis com OpenAI
/// - [`embedding::MockEmbeddingProvider`]: vetores roteirizados para testes
pub mod embedding;

/// Embedding do corpus inteiro com cache e espaçamento de chamadas.
pub mod embedder;

/// Ranking top-K por similaridade cosseno.
pub mod ranker;

/// Montagem e escrita do índice de recomendações.
///
/// Artefatos gravados:
/// - `posts-data.json`: índice completo
/// - `posts-data/index.json`: índice leve do corpus
/// - `posts-data/{arquivo}.json`: dados por documento
pub mod index;

/// Corpus de documentos de uma execução.
pub mod corpus;

/// Pipeline de geração (build do site).
pub mod pipeline;

/// Seleção de recomendações no cliente.
pub mod selector;

/// Leitura dos artefatos pelo cliente (HTTP ou disco).
pub mod source;

/// Configuração via variáveis de ambiente.
pub mod config;

/// Otimizações de performance (SIMD).
pub mod performance;

/// Utilitários: espaçamento de chamadas, caminhos, escrita atômica e timing.
pub mod utils;

/// Re-exports convenientes
pub mod prelude {
    pub use crate::cache::{CacheError, CacheLookup, CacheStats, EmbeddingCache};
    pub use crate::config::{
        load_embedding_config, load_pipeline_config, ConfigError, EmbeddingConfig, PipelineConfig,
    };
    pub use crate::corpus::{Corpus, CorpusError};
    pub use crate::embedder::{CorpusEmbedder, EmbeddingOutcome, EmbeddingReport};
    pub use crate::embedding::{
        EmbeddingProvider, MockEmbeddingProvider, OpenAiEmbeddingClient, ProviderError,
    };
    pub use crate::fingerprint::{fingerprint, Fingerprint};
    pub use crate::index::{
        IndexError, IndexWriter, RecommendationIndex, RecommendationIndexBuilder,
    };
    pub use crate::pipeline::{
        generate_from_env, generate_with, GenerationOutput, GenerationPipeline, GenerationReport,
        PipelineError,
    };
    pub use crate::ranker::SimilarityRanker;
    pub use crate::selector::{
        ClientSelector, FixedSource, RandomSource, RngSource, Selection, SelectionConfig,
    };
    pub use crate::source::{
        recommend, FileRecommendationSource, HttpRecommendationSource, RecommendationSource,
    };
    pub use crate::types::*;
    pub use crate::utils::CallSpacing;
}

/// Versão do crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
