//! Módulo de otimizações de performance.
//!
//! O ranking compara todos os documentos contra todos os outros, então a
//! similaridade cosseno é executada n² vezes por geração. Este módulo
//! concentra o kernel vetorial usado pelo [`crate::ranker`].
//!
//! ## Técnicas Utilizadas
//!
//! - **SIMD (AVX2 + FMA)**: Processa 8 floats por instrução
//! - **Fallback escalar**: CPUs sem AVX2 e outras arquiteturas

/// Operações vetoriais otimizadas com SIMD.
///
/// - [`cosine_similarity`]: Similaridade entre dois vetores (`None` se indefinida)
/// - [`simd::cosine_similarity_scalar`]: Versão escalar (referência nos benchmarks)
pub mod simd;

pub use simd::cosine_similarity;
