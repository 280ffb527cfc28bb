//! Benchmarks do ranking por similaridade.
//!
//! Testa performance de:
//! - Similaridade cosseno (scalar vs AVX2)
//! - Ranking top-K de um documento contra o corpus
//! - Montagem do índice completo (n² comparações)
//!
//! Executar: `cargo bench --bench ranking_bench`

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use post_recommender::corpus::Corpus;
use post_recommender::index::RecommendationIndexBuilder;
use post_recommender::performance::simd::{cosine_similarity, cosine_similarity_scalar};
use post_recommender::ranker::{Candidate, SimilarityRanker};
use post_recommender::types::Document;
use rand::Rng;

/// Gera vetor de embeddings aleatórios
fn generate_random_embedding(dim: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn generate_embeddings(count: usize, dim: usize) -> Vec<Vec<f32>> {
    (0..count).map(|_| generate_random_embedding(dim)).collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Similaridade Cosseno
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_cosine_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosine_similarity");

    for size in [256, 1536, 3072].iter() {
        let a = generate_random_embedding(*size);
        let b = generate_random_embedding(*size);

        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("scalar", size), size, |bencher, _| {
            bencher.iter(|| black_box(cosine_similarity_scalar(&a, &b)))
        });

        group.bench_with_input(BenchmarkId::new("auto", size), size, |bencher, _| {
            bencher.iter(|| black_box(cosine_similarity(&a, &b)))
        });
    }

    group.finish();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Top-K de um documento
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_rank_one(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_one");
    let ranker = SimilarityRanker::default();
    let target = generate_random_embedding(1536);

    for count in [100, 1000, 5000].iter() {
        let vectors = generate_embeddings(*count, 1536);
        let paths: Vec<String> = (0..*count).map(|i| format!("post-{}/", i)).collect();
        let candidates: Vec<Candidate<'_>> = paths
            .iter()
            .zip(vectors.iter())
            .map(|(path, vector)| Candidate { path, vector })
            .collect();

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |bencher, _| {
            bencher.iter(|| black_box(ranker.rank("target/", &target, &candidates)))
        });
    }

    group.finish();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Índice completo
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");
    group.sample_size(10);
    let builder = RecommendationIndexBuilder::default();

    for count in [100, 500].iter() {
        let documents: Vec<Document> = (0..*count)
            .map(|i| {
                let date = Utc.timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0).unwrap();
                Document::new(&format!("post-{}/", i), &format!("Post {}", i), date, "")
            })
            .collect();
        let corpus = Corpus::new(documents).unwrap();
        let vectors: Vec<Option<Vec<f32>>> = generate_embeddings(*count, 1536).into_iter().map(Some).collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |bencher, _| {
            bencher.iter(|| black_box(builder.build(&corpus, &vectors)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cosine_similarity, bench_rank_one, bench_build_index);
criterion_main!(benches);
