// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CACHE DE EMBEDDINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Mapa persistido `path → {hash, embedding, model}`. Uma entrada só é
// reutilizada quando o hash gravado bate com o fingerprint atual do
// documento (e o modelo, quando conhecido dos dois lados, é o mesmo).
//
// - Arquivo ausente → cache vazio
// - Arquivo ilegível / JSON inválido → cache vazio + warning (recuperável)
// - Entradas malformadas → descartadas individualmente
// - `flush` só escreve se algo mudou, sempre de forma atômica
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::fingerprint::Fingerprint;
use crate::types::EmbeddingVector;
use crate::utils::write_atomic;

/// Erros do cache de embeddings
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt cache file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Entrada persistida do cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Fingerprint do conteúdo que gerou o embedding
    pub hash: Fingerprint,
    /// Vetor de embedding
    pub embedding: EmbeddingVector,
    /// Modelo que gerou o vetor (ausente em arquivos antigos)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CacheEntry {
    /// A entrada ainda vale para este fingerprint/modelo?
    pub fn is_valid_for(&self, fingerprint: &Fingerprint, model: Option<&str>) -> bool {
        if let (Some(stored), Some(current)) = (self.model.as_deref(), model) {
            if stored != current {
                return false;
            }
        }
        &self.hash == fingerprint
    }

    fn validate(&self) -> Result<(), String> {
        if self.hash.as_str().is_empty() {
            return Err("empty hash".into());
        }
        if self.embedding.is_empty() {
            return Err("empty embedding".into());
        }
        if self.embedding.iter().any(|x| !x.is_finite()) {
            return Err("non-finite embedding value".into());
        }
        Ok(())
    }
}

/// Resultado de uma consulta ao cache
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Entrada válida, vetor reutilizável
    Hit(EmbeddingVector),
    /// Entrada existe mas o conteúdo (ou modelo) mudou
    Stale,
    /// Nenhuma entrada para o caminho
    Missing,
}

/// Estatísticas de uso do cache durante uma execução
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub stale: u64,
    pub misses: u64,
    /// Entradas descartadas na carga por estarem malformadas
    pub quarantined: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Taxa de hit (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.stale + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Cache persistido de embeddings por documento
#[derive(Debug)]
pub struct EmbeddingCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
    dirty: bool,
    stats: CacheStats,
}

impl EmbeddingCache {
    /// Cache vazio associado a um arquivo
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            dirty: false,
            stats: CacheStats::default(),
        }
    }

    /// Carrega o cache do disco.
    ///
    /// Arquivo ausente não é erro. Entradas malformadas são descartadas;
    /// um arquivo que não é um objeto JSON é [`CacheError::Corrupt`].
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let mut cache = Self::empty(path.clone());

        if !path.exists() {
            log::info!("🗂️  Cache não encontrado em {:?}, iniciando vazio", path);
            return Ok(cache);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;

        let raw: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| CacheError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let object = match raw {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(CacheError::Corrupt {
                    path,
                    reason: format!("expected a JSON object, found {}", json_kind(&other)),
                })
            }
        };

        for (doc_path, value) in object {
            let parsed = serde_json::from_value::<CacheEntry>(value)
                .map_err(|e| e.to_string())
                .and_then(|entry| entry.validate().map(|_| entry));

            match parsed {
                Ok(entry) => {
                    cache.entries.insert(doc_path, entry);
                }
                Err(reason) => {
                    cache.stats.quarantined += 1;
                    log::warn!("⚠️ Entrada de cache descartada ({}): {}", doc_path, reason);
                }
            }
        }

        log::info!(
            "🗂️  Cache carregado: {} entradas ({} descartadas)",
            cache.entries.len(),
            cache.stats.quarantined
        );
        Ok(cache)
    }

    /// Carrega o cache; qualquer falha vira cache vazio com warning
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(path.clone()) {
            Ok(cache) => cache,
            Err(e) => {
                log::warn!("⚠️ {}. Iniciando com cache vazio (todos os embeddings serão regenerados)", e);
                Self::empty(path)
            }
        }
    }

    /// Caminho do arquivo de cache
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entrada bruta de um documento
    pub fn get(&self, doc_path: &str) -> Option<&CacheEntry> {
        self.entries.get(doc_path)
    }

    /// Consulta aplicando a regra de validade e atualizando as estatísticas
    pub fn lookup(
        &mut self,
        doc_path: &str,
        fingerprint: &Fingerprint,
        model: Option<&str>,
    ) -> CacheLookup {
        match self.entries.get(doc_path) {
            Some(entry) if entry.is_valid_for(fingerprint, model) => {
                self.stats.hits += 1;
                CacheLookup::Hit(entry.embedding.clone())
            }
            Some(_) => {
                self.stats.stale += 1;
                CacheLookup::Stale
            }
            None => {
                self.stats.misses += 1;
                CacheLookup::Missing
            }
        }
    }

    /// Grava (ou sobrescreve) a entrada de um documento
    pub fn put(
        &mut self,
        doc_path: &str,
        fingerprint: Fingerprint,
        embedding: EmbeddingVector,
        model: Option<&str>,
    ) {
        self.entries.insert(
            doc_path.to_string(),
            CacheEntry {
                hash: fingerprint,
                embedding,
                model: model.map(String::from),
            },
        );
        self.dirty = true;
    }

    /// Houve alteração desde a carga/último flush?
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retorna estatísticas do cache
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    /// Persiste todas as entradas de forma atômica.
    ///
    /// Retorna `false` sem tocar no disco quando nada mudou.
    pub fn flush(&mut self) -> Result<bool, CacheError> {
        if !self.dirty {
            log::debug!("🗂️  Cache inalterado, nada a escrever");
            return Ok(false);
        }

        let json = serde_json::to_vec_pretty(&self.entries)?;
        write_atomic(&self.path, &json).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })?;

        self.dirty = false;
        log::info!("💾 Cache salvo: {} entradas em {:?}", self.entries.len(), self.path);
        Ok(true)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
