// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FONTES DE RECOMENDAÇÃO (LADO DO CLIENTE)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// O cliente busca dois artefatos estáticos em paralelo:
//   - o arquivo de dados da página atual  (/js/posts-data/{arquivo}.json)
//   - o índice leve do corpus             (/js/posts-data/index.json)
//
// Falha em qualquer um vira "ausente": o seletor degrada para o que
// estiver disponível. 404 é esperado (documento novo) e não gera warning.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::index::{DATA_DIR, SUMMARY_INDEX_FILE};
use crate::selector::{ClientSelector, RandomSource, Selection};
use crate::types::{IndexSummary, PostData};
use crate::utils::data_file_name;

/// Prefixo padrão dos arquivos de dados no site publicado
pub const DEFAULT_DATA_BASE_PATH: &str = "/js/posts-data/";
/// Caminho padrão do índice leve no site publicado
pub const DEFAULT_INDEX_PATH: &str = "/js/posts-data/index.json";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Erros de construção de uma fonte
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Invalid site URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Superfície de leitura do cliente
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Dados pré-calculados da página atual
    async fn load_post_data(&self, current_path: &str) -> Option<PostData>;

    /// Índice leve do corpus
    async fn load_index(&self) -> Option<Vec<IndexSummary>>;
}

/// Busca os dois artefatos em paralelo e seleciona
pub async fn recommend<S, R>(source: &S, selector: &mut ClientSelector<R>, current_path: &str) -> Selection
where
    S: RecommendationSource + ?Sized,
    R: RandomSource,
{
    let (post_data, index) = futures::join!(source.load_post_data(current_path), source.load_index());
    selector.select(current_path, post_data.as_ref(), index.as_deref())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Lê os artefatos do site publicado
#[derive(Debug, Clone)]
pub struct HttpRecommendationSource {
    client: reqwest::Client,
    site_root: Url,
    data_base_path: String,
    index_path: String,
}

impl HttpRecommendationSource {
    pub fn new(site_root: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self {
            client,
            site_root: Url::parse(site_root)?,
            data_base_path: DEFAULT_DATA_BASE_PATH.to_string(),
            index_path: DEFAULT_INDEX_PATH.to_string(),
        })
    }

    /// Caminhos customizados para os artefatos
    pub fn with_paths(mut self, data_base_path: &str, index_path: &str) -> Self {
        self.data_base_path = data_base_path.to_string();
        self.index_path = index_path.to_string();
        self
    }

    /// URL do arquivo de dados de uma página
    pub fn data_url(&self, current_path: &str) -> Result<Url, url::ParseError> {
        let page = self.site_relative(current_path);
        self.artifact_url(&format!("{}{}", self.data_base_path, data_file_name(page)))
    }

    pub fn index_url(&self) -> Result<Url, url::ParseError> {
        self.artifact_url(&self.index_path)
    }

    /// Prefixo do site sem barra final (`""` na raiz, `/blog` em subdiretório)
    fn base_path(&self) -> &str {
        self.site_root.path().trim_end_matches('/')
    }

    /// Artefatos ficam sob o caminho do site, nunca na raiz do host
    fn artifact_url(&self, relative: &str) -> Result<Url, url::ParseError> {
        let path = format!("{}/{}", self.base_path(), relative.trim_start_matches('/'));
        self.site_root.join(&path)
    }

    /// Remove o prefixo do site do caminho da página (`/blog/2024/a/` → `/2024/a/`)
    fn site_relative<'a>(&self, current_path: &'a str) -> &'a str {
        let base = self.base_path();
        if base.is_empty() {
            return current_path;
        }
        match current_path.strip_prefix(base) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => current_path,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Option<T> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("⚠️ Falha ao buscar {}: {}", url, e.without_url());
                return None;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            log::debug!("📭 Não encontrado: {}", url);
            return None;
        }
        if !status.is_success() {
            log::warn!("⚠️ {} respondeu {}", url, status.as_u16());
            return None;
        }

        match response.json::<T>().await {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("⚠️ JSON inválido em {}: {}", url, e.without_url());
                None
            }
        }
    }
}

#[async_trait]
impl RecommendationSource for HttpRecommendationSource {
    async fn load_post_data(&self, current_path: &str) -> Option<PostData> {
        match self.data_url(current_path) {
            Ok(url) => self.fetch_json(url).await,
            Err(e) => {
                log::warn!("⚠️ Caminho inválido {}: {}", current_path, e);
                None
            }
        }
    }

    async fn load_index(&self) -> Option<Vec<IndexSummary>> {
        match self.index_url() {
            Ok(url) => self.fetch_json(url).await,
            Err(e) => {
                log::warn!("⚠️ Caminho do índice inválido: {}", e);
                None
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ARQUIVOS LOCAIS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Lê os artefatos direto do diretório de saída da geração
#[derive(Debug, Clone)]
pub struct FileRecommendationSource {
    data_dir: PathBuf,
}

impl FileRecommendationSource {
    /// `output_dir` é o mesmo diretório passado ao `IndexWriter`
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: output_dir.as_ref().join(DATA_DIR),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, path: PathBuf) -> Option<T> {
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("📭 Não encontrado: {:?}", path);
                return None;
            }
            Err(e) => {
                log::warn!("⚠️ Falha ao ler {:?}: {}", path, e);
                return None;
            }
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| log::warn!("⚠️ JSON inválido em {:?}: {}", path, e))
            .ok()
    }
}

#[async_trait]
impl RecommendationSource for FileRecommendationSource {
    async fn load_post_data(&self, current_path: &str) -> Option<PostData> {
        self.read_json(self.data_dir.join(data_file_name(current_path))).await
    }

    async fn load_index(&self) -> Option<Vec<IndexSummary>> {
        self.read_json(self.data_dir.join(SUMMARY_INDEX_FILE)).await
    }
}
