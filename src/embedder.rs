// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EMBEDDER DO CORPUS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Produz um vetor por documento, na ordem do corpus:
//
//   cache válido?  ──sim──▶ reutiliza
//        │não
//   provedor?      ──não──▶ ausente (modo aleatório)
//        │sim
//   espera o espaçamento ─▶ chama a API ─▶ grava no cache
//                                  │falha
//                                  └──▶ ausente + log (nunca aborta)
//
// Uma chamada por vez: o espaçamento serializa os pedidos.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};

use crate::cache::{CacheLookup, EmbeddingCache};
use crate::corpus::Corpus;
use crate::embedding::EmbeddingProvider;
use crate::fingerprint::{prepare, DEFAULT_MAX_CHARS};
use crate::types::EmbeddingVector;
use crate::utils::CallSpacing;

/// Contadores de uma passada de embedding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingReport {
    /// Reutilizados do cache
    pub cached: usize,
    /// Gerados pelo provedor nesta execução
    pub generated: usize,
    /// Chamadas ao provedor que falharam
    pub failed: usize,
    /// Sem cache e sem provedor
    pub skipped: usize,
}

impl EmbeddingReport {
    /// Documentos que terminaram com vetor
    pub fn with_vector(&self) -> usize {
        self.cached + self.generated
    }
}

/// Vetores por documento (ordem do corpus) + contadores
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingOutcome {
    pub vectors: Vec<Option<EmbeddingVector>>,
    pub report: EmbeddingReport,
}

/// Orquestra cache, provedor e espaçamento de chamadas
pub struct CorpusEmbedder<'p> {
    provider: Option<&'p dyn EmbeddingProvider>,
    spacing: CallSpacing,
    max_chars: usize,
}

impl<'p> CorpusEmbedder<'p> {
    pub fn new(provider: Option<&'p dyn EmbeddingProvider>, spacing: CallSpacing) -> Self {
        Self {
            provider,
            spacing,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    /// Limite de caracteres do texto normalizado
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Embeda o corpus inteiro, consultando e atualizando o cache.
    ///
    /// Não persiste o cache: quem chama decide quando fazer `flush`.
    pub async fn embed_corpus(&mut self, corpus: &Corpus, cache: &mut EmbeddingCache) -> EmbeddingOutcome {
        let mut outcome = EmbeddingOutcome {
            vectors: Vec::with_capacity(corpus.len()),
            report: EmbeddingReport::default(),
        };

        let model = self.provider.map(|p| p.model());
        if self.provider.is_none() {
            log::warn!(
                "⚠️ Sem provedor de embeddings: apenas o cache será usado, \
                 os demais documentos terão recomendações aleatórias"
            );
        }

        for doc in corpus {
            let prepared = prepare(&doc.title, &doc.raw, self.max_chars);

            match cache.lookup(&doc.path, &prepared.fingerprint, model) {
                CacheLookup::Hit(vector) => {
                    log::debug!("🗂️  Cache hit: {}", doc.display_title());
                    outcome.report.cached += 1;
                    outcome.vectors.push(Some(vector));
                    continue;
                }
                CacheLookup::Stale => {
                    log::debug!("♻️  Conteúdo alterado: {}", doc.display_title());
                }
                CacheLookup::Missing => {}
            }

            let Some(provider) = self.provider else {
                outcome.report.skipped += 1;
                outcome.vectors.push(None);
                continue;
            };

            self.spacing.wait_turn().await;
            match provider.embed(&prepared.text).await {
                Ok(vector) => {
                    log::info!("🧮 Embedding gerado: {} ({} dims)", doc.display_title(), vector.len());
                    cache.put(&doc.path, prepared.fingerprint, vector.clone(), Some(provider.model()));
                    outcome.report.generated += 1;
                    outcome.vectors.push(Some(vector));
                }
                Err(e) => {
                    log::error!("❌ Falha no embedding de \"{}\": {}", doc.display_title(), e);
                    outcome.report.failed += 1;
                    outcome.vectors.push(None);
                }
            }
        }

        log::info!(
            "📊 Embeddings: {} do cache, {} gerados, {} falhas, {} sem vetor",
            outcome.report.cached,
            outcome.report.generated,
            outcome.report.failed,
            outcome.report.skipped
        );
        outcome
    }
}
