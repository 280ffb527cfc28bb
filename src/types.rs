// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vetor de embedding (dimensão definida pelo provedor)
pub type EmbeddingVector = Vec<f32>;

/// Título usado quando o documento não tem título
pub const UNTITLED: &str = "(untitled)";

/// Documento do corpus
///
/// Fornecido inteiro pelo framework de publicação e imutável
/// durante uma execução do pipeline. A identidade é o `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Caminho único (chave de identidade)
    pub path: String,
    /// Título (vazio vira [`UNTITLED`] na saída)
    #[serde(default)]
    pub title: String,
    /// Data de publicação
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
    /// Categorias em ordem
    #[serde(default)]
    pub categories: Vec<String>,
    /// Tags em ordem
    #[serde(default)]
    pub tags: Vec<String>,
    /// Conteúdo bruto (pode conter front-matter)
    #[serde(default)]
    pub raw: String,
}

impl Document {
    /// Cria um documento sem categorias/tags
    pub fn new(path: &str, title: &str, date: DateTime<Utc>, raw: &str) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            date,
            categories: Vec::new(),
            tags: Vec::new(),
            raw: raw.to_string(),
        }
    }

    /// Título para exibição
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }
}

/// Vizinho pré-calculado de um documento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborRecord {
    /// Título do vizinho
    pub title: String,
    /// Caminho do vizinho
    pub path: String,
    /// Data do vizinho
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
    /// Similaridade cosseno em [-1, 1]
    pub similarity: f32,
}

/// Entrada do índice de recomendações (um por documento)
///
/// É também o conteúdo de cada arquivo de dados por documento
/// consumido pelo seletor do cliente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    pub title: String,
    pub path: String,
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Vizinhos em ordem decrescente de similaridade (no máximo K)
    #[serde(default)]
    pub recommendations: Vec<NeighborRecord>,
}

impl PostData {
    /// Versão leve (sem vizinhos) para o índice do corpus
    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            title: self.title.clone(),
            path: self.path.clone(),
            date: self.date,
            categories: self.categories.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Entrada do índice leve do corpus (somente metadados)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub title: String,
    pub path: String,
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Item exibido pelo seletor do cliente
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub path: String,
    pub date: DateTime<Utc>,
    /// Similaridade quando veio do índice pré-calculado
    pub similarity: Option<f32>,
}

impl From<&NeighborRecord> for Recommendation {
    fn from(neighbor: &NeighborRecord) -> Self {
        Self {
            title: neighbor.title.clone(),
            path: neighbor.path.clone(),
            date: neighbor.date,
            similarity: Some(neighbor.similarity),
        }
    }
}

impl From<&IndexSummary> for Recommendation {
    fn from(summary: &IndexSummary) -> Self {
        Self {
            title: summary.title.clone(),
            path: summary.path.clone(),
            date: summary.date,
            similarity: None,
        }
    }
}

/// Datas ISO-8601 em UTC com milissegundos (`2024-01-02T03:04:05.000Z`).
///
/// Na leitura aceita RFC 3339 com qualquer offset, `YYYY-MM-DD HH:MM:SS`
/// e `YYYY-MM-DD` (interpretados como UTC).
pub mod iso_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }

    /// Formata como o `toISOString` dos navegadores
    pub fn format(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Interpreta uma data nos formatos aceitos
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}
