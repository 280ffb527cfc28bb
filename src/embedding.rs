// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROVEDOR DE EMBEDDINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações para transformar texto normalizado em vetor.
// - OpenAI-compatible: `POST {base}/embeddings`
// - Mock para testes
//
// O corpo da resposta nunca entra em erros ou logs: pode ecoar o conteúdo
// enviado na requisição.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::config::EmbeddingConfig;
use crate::types::EmbeddingVector;

/// Erros do provedor de embeddings
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API request failed with status {0}")]
    Status(u16),

    #[error("Invalid API response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            // Sem URL: pode carregar parâmetros da requisição
            Self::Network(err.without_url().to_string())
        }
    }
}

/// Trait principal para provedores de embedding
///
/// O limite de taxa NÃO é responsabilidade do provedor: o orquestrador
/// espaça as chamadas (ver [`crate::utils::CallSpacing`]).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identificador do modelo que gera os vetores
    fn model(&self) -> &str;

    /// Gera o embedding de um texto
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ProviderError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO OPENAI-COMPATIBLE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Option<Vec<f32>>,
}

/// Cliente para endpoints de embeddings compatíveis com OpenAI
pub struct OpenAiEmbeddingClient {
    api_key: String,
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiEmbeddingClient {
    /// Cria o cliente a partir da configuração de embeddings
    pub fn new(config: &EmbeddingConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            client,
        })
    }

    /// URL completa do endpoint de embeddings
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&EmbeddingRequest {
                input: text,
                model: &self.model,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_embedding_response(&body)
    }
}

/// Valida o payload de sucesso: exige `data[0].embedding` numérico e não vazio
pub fn parse_embedding_response(body: &[u8]) -> Result<EmbeddingVector, ProviderError> {
    let parsed: EmbeddingResponse = serde_json::from_slice(body).map_err(|e| {
        ProviderError::MalformedResponse(format!(
            "unparsable payload (line {}, column {})",
            e.line(),
            e.column()
        ))
    })?;

    let embedding = parsed
        .data
        .into_iter()
        .next()
        .and_then(|d| d.embedding)
        .ok_or_else(|| ProviderError::MalformedResponse("missing embedding data".into()))?;

    if embedding.is_empty() {
        return Err(ProviderError::MalformedResponse("empty embedding".into()));
    }
    // Valores fora do alcance de f32 chegam como inf
    if embedding.iter().any(|x| !x.is_finite()) {
        return Err(ProviderError::MalformedResponse("non-finite embedding value".into()));
    }
    Ok(embedding)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

type EmbedFn = dyn Fn(&str) -> Option<EmbeddingVector> + Send + Sync;

/// Provedor mock: vetores vêm de uma função; `None` simula falha da API.
///
/// Registra quantas chamadas e quais textos recebeu.
pub struct MockEmbeddingProvider {
    model: String,
    embed_fn: Box<EmbedFn>,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl std::fmt::Debug for MockEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEmbeddingProvider")
            .field("model", &self.model)
            .field("calls", &self.call_count())
            .finish()
    }
}

impl MockEmbeddingProvider {
    pub fn new<F>(embed_fn: F) -> Self
    where
        F: Fn(&str) -> Option<EmbeddingVector> + Send + Sync + 'static,
    {
        Self {
            model: "mock-embedding".into(),
            embed_fn: Box::new(embed_fn),
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Sempre retorna o mesmo vetor
    pub fn fixed(vector: EmbeddingVector) -> Self {
        Self::new(move |_| Some(vector.clone()))
    }

    /// Sempre falha
    pub fn failing() -> Self {
        Self::new(|_| None)
    }

    /// Vetor escolhido pelo título (o texto normalizado começa com `Title: {título}`)
    pub fn by_title(table: Vec<(&str, EmbeddingVector)>) -> Self {
        let table: Vec<(String, EmbeddingVector)> = table
            .into_iter()
            .map(|(title, v)| (format!("Title: {}\n", title), v))
            .collect();
        Self::new(move |text| {
            table
                .iter()
                .find(|(prefix, _)| text.starts_with(prefix.as_str()))
                .map(|(_, v)| v.clone())
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    /// Número de chamadas recebidas
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Textos recebidos, em ordem
    pub fn received_texts(&self) -> Vec<String> {
        self.texts.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut texts) = self.texts.lock() {
            texts.push(text.to_string());
        }
        (self.embed_fn)(text).ok_or(ProviderError::Status(500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_response() {
        let body = br#"{"object":"list","data":[{"index":0,"embedding":[0.1,-0.2,0.3]}],"model":"m"}"#;
        let v = parse_embedding_response(body).unwrap();
        assert_eq!(v, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_parse_missing_data() {
        let err = parse_embedding_response(br#"{"data":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));

        let err = parse_embedding_response(br#"{"error":{"message":"secret echo"}}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
        assert!(!err.to_string().contains("secret echo"));
    }

    #[test]
    fn test_parse_non_numeric_embedding() {
        let err = parse_embedding_response(br#"{"data":[{"embedding":["a","b"]}]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_rejects_out_of_range_values() {
        let err = parse_embedding_response(br#"{"data":[{"embedding":[0.1,1e39,0.3]}]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_parse_invalid_json_hides_body() {
        let err = parse_embedding_response(b"<html>private stuff</html>").unwrap_err();
        assert!(!err.to_string().contains("private stuff"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slashes() {
        let config = EmbeddingConfig {
            api_key: "key".into(),
            base_url: "https://example.com/v1//".into(),
            model: "text-embedding-3-small".into(),
            timeout: std::time::Duration::from_secs(5),
        };
        let client = OpenAiEmbeddingClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "https://example.com/v1/embeddings");
        assert_eq!(client.model(), "text-embedding-3-small");
    }

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let provider = MockEmbeddingProvider::by_title(vec![("A", vec![1.0, 0.0])]);

        assert_eq!(provider.embed("Title: A\n\nbody").await.unwrap(), vec![1.0, 0.0]);
        assert!(provider.embed("Title: B\n\nbody").await.is_err());
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.received_texts().len(), 2);
    }
}
