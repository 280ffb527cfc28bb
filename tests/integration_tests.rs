//! # Testes de Integração
//!
//! Validam o fluxo completo do sistema:
//! - Geração: corpus → embeddings → ranking → artefatos em disco
//! - Cache: reaproveitamento entre execuções e invalidação por conteúdo
//! - Cliente: leitura dos artefatos gerados e seleção das recomendações
//! - Degradação: falhas do provedor e modo somente-aleatório

use chrono::{TimeZone, Utc};
use post_recommender::prelude::*;
use std::collections::HashSet;
use std::path::Path;

fn doc(path: &str, title: &str, day: u32, body: &str) -> Document {
    Document::new(path, title, Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(), body)
}

fn three_doc_corpus() -> Corpus {
    Corpus::new(vec![
        doc("2024/05/01/a/", "A", 1, "---\nlayout: post\n---\nsobre rust"),
        doc("2024/05/02/b/", "B", 2, "sobre rust e async"),
        doc("2024/05/03/c/", "C", 3, "sobre jardinagem"),
    ])
    .unwrap()
}

/// Vetores com sim(A,B)=0.9, sim(A,C)=0.2, sim(B,C)=0.1
fn three_doc_provider() -> MockEmbeddingProvider {
    let b_y = (1.0f32 - 0.81).sqrt();
    let c_y = (0.1 - 0.18) / b_y;
    let c_z = (1.0 - 0.04 - c_y * c_y).sqrt();
    MockEmbeddingProvider::by_title(vec![
        ("A", vec![1.0, 0.0, 0.0]),
        ("B", vec![0.9, b_y, 0.0]),
        ("C", vec![0.2, c_y, c_z]),
    ])
}

fn config(dir: &Path, top_k: usize) -> PipelineConfig {
    PipelineConfig {
        cache_path: dir.join("embeddings_store").join("cache.json"),
        output_dir: dir.join("public").join("js"),
        top_k,
        ..Default::default()
    }
}

async fn run(dir: &Path, top_k: usize, corpus: &Corpus, provider: Option<&dyn EmbeddingProvider>) -> GenerationOutput {
    GenerationPipeline::new(&config(dir, top_k), provider)
        .with_spacing(CallSpacing::disabled())
        .run(corpus)
        .await
        .expect("generation should succeed")
}

fn neighbor_paths(data: &PostData) -> Vec<&str> {
    data.recommendations.iter().map(|r| r.path.as_str()).collect()
}

// ============================================================================
// TESTE 1: Ranking de ponta a ponta
// ============================================================================

#[tokio::test]
async fn test_three_document_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let provider = three_doc_provider();

    let output = run(dir.path(), 2, &three_doc_corpus(), Some(&provider)).await;
    let index = &output.index;

    assert_eq!(neighbor_paths(index.get("2024/05/01/a/").unwrap()), vec!["2024/05/02/b/", "2024/05/03/c/"]);
    assert_eq!(neighbor_paths(index.get("2024/05/02/b/").unwrap()), vec!["2024/05/01/a/", "2024/05/03/c/"]);
    assert_eq!(neighbor_paths(index.get("2024/05/03/c/").unwrap()), vec!["2024/05/01/a/", "2024/05/02/b/"]);

    let a = index.get("2024/05/01/a/").unwrap();
    assert!((a.recommendations[0].similarity - 0.9).abs() < 1e-4);
    assert!((a.recommendations[1].similarity - 0.2).abs() < 1e-4);

    // Ordem do índice: data decrescente
    let order: Vec<&str> = index.entries().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(order, vec!["2024/05/03/c/", "2024/05/02/b/", "2024/05/01/a/"]);

    // Front-matter não entra no texto enviado ao provedor
    assert!(provider.received_texts().iter().all(|t| !t.contains("layout")));
}

#[tokio::test]
async fn test_artifacts_round_trip_through_file_source() {
    let dir = tempfile::tempdir().unwrap();
    let provider = three_doc_provider();
    let output = run(dir.path(), 2, &three_doc_corpus(), Some(&provider)).await;

    let full: Vec<PostData> = serde_json::from_slice(&std::fs::read(&output.artifacts.full_index).unwrap()).unwrap();
    assert_eq!(full, output.index.entries());

    let source = FileRecommendationSource::new(dir.path().join("public").join("js"));
    let data = source.load_post_data("/2024/05/01/a/").await.unwrap();
    assert_eq!(neighbor_paths(&data), vec!["2024/05/02/b/", "2024/05/03/c/"]);
    assert_eq!(source.load_index().await.unwrap().len(), 3);

    let mut selector = ClientSelector::new(SelectionConfig { count: 2 }, RngSource::seeded(5));
    let selection = recommend(&source, &mut selector, "/2024/05/01/a/").await;
    let paths: Vec<&str> = selection.items().iter().map(|r| r.path.as_str()).collect();

    // Um vizinho pré-calculado + um espaço de descoberta
    assert_eq!(paths, vec!["2024/05/02/b/", "2024/05/03/c/"]);
}

// ============================================================================
// TESTE 2: Seleção no cliente com índice desatualizado
// ============================================================================

fn summary(path: &str) -> IndexSummary {
    IndexSummary {
        title: path.trim_matches('/').to_uppercase(),
        path: path.to_string(),
        date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        categories: vec![],
        tags: vec![],
    }
}

#[test]
fn test_client_selection_with_single_neighbor() {
    let index: Vec<IndexSummary> = ["a/", "b/", "c/", "d/", "e/", "f/"].iter().map(|p| summary(p)).collect();
    let data = PostData {
        title: "A".into(),
        path: "a/".into(),
        date: index[0].date,
        categories: vec![],
        tags: vec![],
        recommendations: vec![NeighborRecord {
            title: "B".into(),
            path: "b/".into(),
            date: index[1].date,
            similarity: 0.87,
        }],
    };

    for seed in 0..50 {
        let mut selector = ClientSelector::new(SelectionConfig::default(), RngSource::seeded(seed));
        let selection = selector.select("/a/", Some(&data), Some(&index));
        let paths: Vec<&str> = selection.items().iter().map(|r| r.path.as_str()).collect();

        assert_eq!(paths.len(), 5);
        assert_eq!(paths[0], "b/");
        let rest: HashSet<&str> = paths[1..].iter().copied().collect();
        assert_eq!(rest, HashSet::from(["c/", "d/", "e/", "f/"]), "seed {}", seed);
        assert!(!paths.contains(&"a/"));
    }
}

// ============================================================================
// TESTE 3: Cache entre execuções
// ============================================================================

#[tokio::test]
async fn test_second_run_uses_cache_only() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = three_doc_corpus();

    let first = three_doc_provider();
    let output = run(dir.path(), 2, &corpus, Some(&first)).await;
    assert_eq!(first.call_count(), 3);
    assert!(output.report.cache_saved);

    let second = three_doc_provider();
    let output = run(dir.path(), 2, &corpus, Some(&second)).await;
    assert_eq!(second.call_count(), 0);
    assert_eq!(output.report.embeddings.cached, 3);
    assert!(!output.report.cache_saved);
    assert_eq!(neighbor_paths(output.index.get("2024/05/01/a/").unwrap()), vec!["2024/05/02/b/", "2024/05/03/c/"]);
}

#[tokio::test]
async fn test_changed_content_invalidates_cache_entry() {
    let dir = tempfile::tempdir().unwrap();
    let provider = three_doc_provider();
    run(dir.path(), 2, &three_doc_corpus(), Some(&provider)).await;

    let edited = Corpus::new(vec![
        doc("2024/05/01/a/", "A", 1, "---\nlayout: post\n---\nsobre rust"),
        doc("2024/05/02/b/", "B", 2, "reescrito: agora sobre jardinagem"),
        doc("2024/05/03/c/", "C", 3, "sobre jardinagem"),
    ])
    .unwrap();

    let provider = MockEmbeddingProvider::by_title(vec![("B", vec![0.2, 0.1, 0.97])]);
    let output = run(dir.path(), 2, &edited, Some(&provider)).await;

    assert_eq!(provider.call_count(), 1);
    assert_eq!(output.report.embeddings.generated, 1);
    assert_eq!(output.report.embeddings.cached, 2);

    let cache = EmbeddingCache::load(dir.path().join("embeddings_store").join("cache.json")).unwrap();
    let entry = cache.get("2024/05/02/b/").unwrap();
    assert_eq!(entry.hash, fingerprint("B", "reescrito: agora sobre jardinagem"));
    assert_eq!(entry.embedding, vec![0.2, 0.1, 0.97]);

    // B agora está mais perto de C
    assert_eq!(output.index.get("2024/05/02/b/").unwrap().recommendations[0].path, "2024/05/03/c/");
}

// ============================================================================
// TESTE 4: Degradação
// ============================================================================

#[tokio::test]
async fn test_provider_failure_isolated_to_one_document() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockEmbeddingProvider::by_title(vec![("A", vec![1.0, 0.0]), ("B", vec![0.9, 0.1])]);

    let output = run(dir.path(), 5, &three_doc_corpus(), Some(&provider)).await;

    assert_eq!(output.report.embeddings.failed, 1);
    assert!(output.index.get("2024/05/03/c/").unwrap().recommendations.is_empty());
    assert_eq!(neighbor_paths(output.index.get("2024/05/01/a/").unwrap()), vec!["2024/05/02/b/"]);

    // Documento sem vetor ainda tem arquivo de dados
    assert_eq!(output.artifacts.data_files, 3);

    let cache = EmbeddingCache::load(dir.path().join("embeddings_store").join("cache.json")).unwrap();
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_random_only_mode_end_to_end() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), 5, &three_doc_corpus(), None).await;
    assert!(output.report.random_only);
    assert_eq!(output.report.ranked, 0);

    let source = FileRecommendationSource::new(dir.path().join("public").join("js"));
    let mut selector = ClientSelector::new(SelectionConfig::default(), RngSource::seeded(9));
    let selection = recommend(&source, &mut selector, "/2024/05/02/b/").await;

    let paths: HashSet<&str> = selection.items().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, HashSet::from(["2024/05/01/a/", "2024/05/03/c/"]));
    assert!(selection.items().iter().all(|r| r.similarity.is_none()));
}

#[tokio::test]
async fn test_random_only_selection_draws_full_count() {
    let dir = tempfile::tempdir().unwrap();
    let docs: Vec<Document> = (1..=8)
        .map(|day| {
            let path = format!("2024/05/{:02}/p{}/", day, day);
            let title = format!("Post {}", day);
            doc(&path, &title, day, "texto qualquer")
        })
        .collect();
    let corpus = Corpus::new(docs).unwrap();

    let output = run(dir.path(), 5, &corpus, None).await;
    assert!(output.report.random_only);
    assert_eq!(output.artifacts.data_files, 8);

    let source = FileRecommendationSource::new(dir.path().join("public").join("js"));
    let current = "/2024/05/04/p4/";
    let mut seen: HashSet<String> = HashSet::new();

    for seed in 0..20 {
        let mut selector = ClientSelector::new(SelectionConfig::default(), RngSource::seeded(seed));
        let selection = recommend(&source, &mut selector, current).await;
        let items = selection.items();

        assert_eq!(items.len(), 5, "seed {}", seed);
        let paths: HashSet<&str> = items.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths.len(), 5, "seed {}", seed);
        assert!(!paths.contains("2024/05/04/p4/"));
        assert!(items.iter().all(|r| r.similarity.is_none()));
        seen.extend(paths.into_iter().map(String::from));
    }

    // Ao longo das sementes, todo documento exceto o atual aparece
    assert_eq!(seen.len(), 7);
}

#[tokio::test]
async fn test_corrupt_cache_file_is_regenerated() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("embeddings_store");
    std::fs::create_dir_all(&cache_dir).unwrap();
    std::fs::write(cache_dir.join("cache.json"), b"[1, 2, 3]").unwrap();

    let provider = three_doc_provider();
    let output = run(dir.path(), 2, &three_doc_corpus(), Some(&provider)).await;

    assert_eq!(provider.call_count(), 3);
    assert!(output.report.cache_saved);
    assert_eq!(EmbeddingCache::load(cache_dir.join("cache.json")).unwrap().len(), 3);
}
