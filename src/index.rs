// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ÍNDICE DE RECOMENDAÇÕES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Monta um registro por documento (metadados + top-K vizinhos) e grava os
// artefatos estáticos consumidos pelo cliente:
//
//   {saída}/posts-data.json            índice completo, ordenado por data desc
//   {saída}/posts-data/index.json      índice leve (somente metadados)
//   {saída}/posts-data/{arquivo}.json  dados por documento
//
// Artefato derivado: sempre reconstruível, nunca editado à mão.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::corpus::Corpus;
use crate::ranker::{Candidate, SimilarityRanker};
use crate::types::{EmbeddingVector, IndexSummary, NeighborRecord, PostData};
use crate::utils::{data_file_name, write_atomic};

/// Arquivo do índice completo
pub const FULL_INDEX_FILE: &str = "posts-data.json";
/// Diretório dos arquivos por documento
pub const DATA_DIR: &str = "posts-data";
/// Arquivo do índice leve dentro de [`DATA_DIR`]
pub const SUMMARY_INDEX_FILE: &str = "index.json";

/// Erros de escrita dos artefatos
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Index serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Índice completo, ordenado por data decrescente
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationIndex {
    entries: Vec<PostData>,
}

impl RecommendationIndex {
    pub fn entries(&self) -> &[PostData] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<PostData> {
        self.entries
    }

    /// Registro de um documento pelo caminho
    pub fn get(&self, path: &str) -> Option<&PostData> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Índice leve do corpus (mesma ordem)
    pub fn summaries(&self) -> Vec<IndexSummary> {
        self.entries.iter().map(PostData::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Documentos que receberam ao menos um vizinho
    pub fn ranked_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.recommendations.is_empty())
            .count()
    }
}

/// Monta o índice a partir do corpus e dos vetores por documento
#[derive(Debug, Clone, Default)]
pub struct RecommendationIndexBuilder {
    ranker: SimilarityRanker,
}

impl RecommendationIndexBuilder {
    pub fn new(ranker: SimilarityRanker) -> Self {
        Self { ranker }
    }

    /// `vectors[i]` é o vetor do i-ésimo documento do corpus (ausente = sem vizinhos)
    pub fn build(&self, corpus: &Corpus, vectors: &[Option<EmbeddingVector>]) -> RecommendationIndex {
        let docs = corpus.documents();
        let vector_of = |i: usize| vectors.get(i).and_then(|v| v.as_deref());

        // Somente documentos com vetor participam como candidatos
        let (owners, candidates): (Vec<usize>, Vec<Candidate<'_>>) = docs
            .iter()
            .enumerate()
            .filter_map(|(i, doc)| {
                vector_of(i).map(|vector| {
                    (
                        i,
                        Candidate {
                            path: doc.path.as_str(),
                            vector,
                        },
                    )
                })
            })
            .unzip();

        let mut entries: Vec<PostData> = docs
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let recommendations = match vector_of(i) {
                    Some(target) => self
                        .ranker
                        .rank(&doc.path, target, &candidates)
                        .into_iter()
                        .map(|ranked| {
                            let neighbor = &docs[owners[ranked.index]];
                            NeighborRecord {
                                title: neighbor.display_title().to_string(),
                                path: neighbor.path.clone(),
                                date: neighbor.date,
                                similarity: ranked.similarity,
                            }
                        })
                        .collect(),
                    None => Vec::new(),
                };

                PostData {
                    title: doc.display_title().to_string(),
                    path: doc.path.clone(),
                    date: doc.date,
                    categories: doc.categories.clone(),
                    tags: doc.tags.clone(),
                    recommendations,
                }
            })
            .collect();

        entries.sort_by(|a, b| b.date.cmp(&a.date));
        RecommendationIndex { entries }
    }
}

/// Resumo dos artefatos gravados
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactSummary {
    pub full_index: PathBuf,
    pub summary_index: PathBuf,
    pub data_files: usize,
    /// Documentos sem arquivo próprio (nome colidiu com outro)
    pub skipped: Vec<String>,
}

/// Grava os artefatos do índice em um diretório de saída
#[derive(Debug, Clone)]
pub struct IndexWriter {
    output_dir: PathBuf,
}

impl IndexWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Grava índice completo, índice leve e um arquivo por documento
    pub fn write(&self, index: &RecommendationIndex) -> Result<ArtifactSummary, IndexError> {
        let full_index = self.output_dir.join(FULL_INDEX_FILE);
        write_json(&full_index, index.entries())?;

        let data_dir = self.output_dir.join(DATA_DIR);
        let summary_index = data_dir.join(SUMMARY_INDEX_FILE);
        write_json(&summary_index, &index.summaries())?;

        let mut used: HashSet<String> = HashSet::from([SUMMARY_INDEX_FILE.to_string()]);
        let mut summary = ArtifactSummary {
            full_index,
            summary_index,
            ..Default::default()
        };

        // Mais recentes primeiro: em colisão de nome, o mais novo fica
        for entry in index.entries() {
            let file_name = data_file_name(&entry.path);
            if !used.insert(file_name.clone()) {
                log::warn!(
                    "⚠️ Arquivo de dados {} já usado; {} fica sem dados próprios",
                    file_name,
                    entry.path
                );
                summary.skipped.push(entry.path.clone());
                continue;
            }
            write_json(&data_dir.join(&file_name), entry)?;
            summary.data_files += 1;
        }

        log::info!(
            "📝 Índice gravado: {} documentos, {} arquivos de dados em {:?}",
            index.len(),
            summary.data_files,
            self.output_dir
        );
        Ok(summary)
    }
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IndexError> {
    let json = serde_json::to_vec(value)?;
    write_atomic(path, &json).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })
}
