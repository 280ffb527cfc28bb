// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CORPUS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Conjunto ordenado de documentos de uma execução. É passado explicitamente
// ao pipeline; o framework de publicação exporta um manifesto JSON
// (array de documentos) que o binário carrega aqui.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::types::Document;

/// Erros de carga do corpus
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("Failed to read corpus manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid corpus manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate document path: {0}")]
    DuplicatePath(String),

    #[error("Document with empty path at position {0}")]
    EmptyPath(usize),
}

/// Corpus imutável durante a execução
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Valida e cria o corpus (caminhos únicos e não vazios)
    pub fn new(documents: Vec<Document>) -> Result<Self, CorpusError> {
        let mut seen = HashSet::new();
        for (position, doc) in documents.iter().enumerate() {
            if doc.path.trim().is_empty() {
                return Err(CorpusError::EmptyPath(position));
            }
            if !seen.insert(doc.path.as_str()) {
                return Err(CorpusError::DuplicatePath(doc.path.clone()));
            }
        }
        Ok(Self { documents })
    }

    /// Lê um manifesto JSON (array de documentos)
    pub fn from_json_str(json: &str) -> Result<Self, CorpusError> {
        let documents: Vec<Document> = serde_json::from_str(json)?;
        Self::new(documents)
    }

    /// Lê o manifesto do disco
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::from_json_str(&content)?;
        log::info!("📚 Corpus carregado: {} documentos de {:?}", corpus.len(), path);
        Ok(corpus)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
