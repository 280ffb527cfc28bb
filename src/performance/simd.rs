// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SIMD - SINGLE INSTRUCTION, MULTIPLE DATA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Similaridade cosseno entre embeddings de documentos. O ranking compara
// todos os pares do corpus (O(n²)), então o kernel usa AVX2 + FMA quando a
// CPU suporta e cai para a versão escalar caso contrário.
//
// Similaridade indefinida (dimensões diferentes, vetor vazio ou norma zero)
// é `None`: o candidato é excluído do ranking.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Produto escalar e normas ao quadrado em uma passada
#[derive(Debug, Clone, Copy, PartialEq)]
struct Moments {
    dot: f32,
    norm_a: f32,
    norm_b: f32,
}

impl Moments {
    fn cosine(self) -> Option<f32> {
        if self.norm_a <= 0.0 || self.norm_b <= 0.0 {
            return None;
        }
        let similarity = self.dot / (self.norm_a.sqrt() * self.norm_b.sqrt());
        if similarity.is_finite() {
            // Erro de arredondamento pode passar de 1.0
            Some(similarity.clamp(-1.0, 1.0))
        } else {
            None
        }
    }
}

fn moments_scalar(a: &[f32], b: &[f32]) -> Moments {
    let mut m = Moments {
        dot: 0.0,
        norm_a: 0.0,
        norm_b: 0.0,
    };
    for (x, y) in a.iter().zip(b.iter()) {
        m.dot += x * y;
        m.norm_a += x * x;
        m.norm_b += y * y;
    }
    m
}

/// Similaridade cosseno - implementação escalar (fallback)
///
/// # Fórmula
/// ```text
/// cos(θ) = (A · B) / (||A|| × ||B||)
/// ```
pub fn cosine_similarity_scalar(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    moments_scalar(a, b).cosine()
}

/// Acumula produto escalar e normas com AVX2 (8 floats por instrução).
///
/// # Safety
///
/// O caller deve garantir que a CPU suporta AVX2 e FMA e que
/// `a.len() == b.len()`.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn moments_avx2(a: &[f32], b: &[f32]) -> Moments {
    let len = a.len();

    let mut dot_acc = _mm256_setzero_ps();
    let mut norm_a_acc = _mm256_setzero_ps();
    let mut norm_b_acc = _mm256_setzero_ps();

    let chunks = len / 8;
    for i in 0..chunks {
        let offset = i * 8;
        let va = _mm256_loadu_ps(a.as_ptr().add(offset));
        let vb = _mm256_loadu_ps(b.as_ptr().add(offset));

        // FMA: a*b + acc em 1 instrução
        dot_acc = _mm256_fmadd_ps(va, vb, dot_acc);
        norm_a_acc = _mm256_fmadd_ps(va, va, norm_a_acc);
        norm_b_acc = _mm256_fmadd_ps(vb, vb, norm_b_acc);
    }

    let tail = moments_scalar(&a[chunks * 8..], &b[chunks * 8..]);

    Moments {
        dot: hsum_avx2(dot_acc) + tail.dot,
        norm_a: hsum_avx2(norm_a_acc) + tail.norm_a,
        norm_b: hsum_avx2(norm_b_acc) + tail.norm_b,
    }
}

/// Soma horizontal de 8 floats em um registro AVX2
#[cfg(target_arch = "x86_64")]
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn hsum_avx2(v: __m256) -> f32 {
    let sum1 = _mm256_hadd_ps(v, v);
    let sum2 = _mm256_hadd_ps(sum1, sum1);
    let low = _mm256_castps256_ps128(sum2);
    let high = _mm256_extractf128_ps(sum2, 1);
    _mm_cvtss_f32(_mm_add_ss(low, high))
}

/// Similaridade cosseno com a melhor implementação disponível.
///
/// Retorna `None` quando a similaridade é indefinida; caso contrário
/// o valor está em `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            return unsafe { moments_avx2(a, b) }.cosine();
        }
    }

    moments_scalar(a, b).cosine()
}
