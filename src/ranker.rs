// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RANKING POR SIMILARIDADE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Top-K vizinhos de um documento por similaridade cosseno decrescente.
// - O próprio documento (mesmo path) nunca é candidato
// - Similaridade indefinida exclui o candidato
// - Empates mantêm a ordem do corpus (ordenação estável)
// - Menos de K candidatos válidos: retorna todos, sem preenchimento
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use rayon::prelude::*;

use crate::performance::cosine_similarity;

/// Número padrão de vizinhos por documento
pub const DEFAULT_TOP_K: usize = 5;

/// Candidato ao ranking: caminho + vetor
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub path: &'a str,
    pub vector: &'a [f32],
}

/// Vizinho ranqueado; `index` aponta para a fatia de candidatos
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedNeighbor {
    pub index: usize,
    pub similarity: f32,
}

/// Ranqueador top-K por similaridade cosseno
#[derive(Debug, Clone)]
pub struct SimilarityRanker {
    k: usize,
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl SimilarityRanker {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Ranqueia `candidates` contra o vetor do documento `target_path`.
    ///
    /// As similaridades são calculadas em paralelo (Rayon); a coleta
    /// preserva a ordem dos candidatos antes da ordenação estável.
    pub fn rank(
        &self,
        target_path: &str,
        target: &[f32],
        candidates: &[Candidate<'_>],
    ) -> Vec<RankedNeighbor> {
        let mut scored: Vec<RankedNeighbor> = candidates
            .par_iter()
            .enumerate()
            .filter(|(_, c)| c.path != target_path)
            .filter_map(|(index, c)| {
                cosine_similarity(target, c.vector).map(|similarity| RankedNeighbor {
                    index,
                    similarity,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(self.k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates<'a>(items: &'a [(&'a str, Vec<f32>)]) -> Vec<Candidate<'a>> {
        items
            .iter()
            .map(|(path, v)| Candidate {
                path,
                vector: v.as_slice(),
            })
            .collect()
    }

    #[test]
    fn test_orders_by_descending_similarity() {
        let items = vec![
            ("far", vec![0.0, 1.0]),
            ("near", vec![1.0, 0.1]),
            ("mid", vec![1.0, 1.0]),
        ];
        let ranked = SimilarityRanker::new(5).rank("target", &[1.0, 0.0], &candidates(&items));

        let order: Vec<&str> = ranked.iter().map(|r| items[r.index].0).collect();
        assert_eq!(order, vec!["near", "mid", "far"]);
        assert!(ranked.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_excludes_self_and_undefined() {
        let items = vec![
            ("target", vec![1.0, 0.0]),
            ("zero", vec![0.0, 0.0]),
            ("wrong-dim", vec![1.0, 0.0, 0.0]),
            ("ok", vec![1.0, 1.0]),
        ];
        let ranked = SimilarityRanker::default().rank("target", &[1.0, 0.0], &candidates(&items));

        assert_eq!(ranked.len(), 1);
        assert_eq!(items[ranked[0].index].0, "ok");
    }

    #[test]
    fn test_truncates_to_k_without_padding() {
        let items: Vec<(&str, Vec<f32>)> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .enumerate()
            .map(|(i, p)| (*p, vec![1.0, i as f32]))
            .collect();

        let ranked = SimilarityRanker::new(5).rank("x", &[1.0, 0.0], &candidates(&items));
        assert_eq!(ranked.len(), 5);

        let ranked = SimilarityRanker::new(5).rank("x", &[1.0, 0.0], &candidates(&items[..3]));
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let items = vec![
            ("first", vec![2.0, 0.0]),
            ("second", vec![1.0, 0.0]),
            ("third", vec![3.0, 0.0]),
        ];
        let ranked = SimilarityRanker::new(5).rank("x", &[1.0, 0.0], &candidates(&items));
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }
}
