// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SELETOR DO CLIENTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Escolhe até N recomendações para a página atual:
//
// 1. Vizinhos pré-calculados → até N-1 em ordem (um espaço fica para
//    descoberta aleatória); sem índice do corpus → até N
// 2. Completa com documentos aleatórios do índice, sem repetir o
//    documento atual nem os já escolhidos
// 3. Sem vizinhos → N documentos aleatórios do índice
// 4. Nada disponível → `Selection::Empty`
//
// A aleatoriedade vem de um `RandomSource` injetado.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::{IndexSummary, PostData, Recommendation};
use crate::utils::{is_current_document, root_relative};

/// Quantidade padrão de recomendações exibidas
pub const DEFAULT_SELECTION_COUNT: usize = 5;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FONTES DE ALEATORIEDADE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Fonte de índices aleatórios uniformes
pub trait RandomSource {
    /// Inteiro uniforme em `[0, bound)`; `bound == 0` retorna 0
    fn next_index(&mut self, bound: usize) -> usize;

    /// Embaralha `items` (Fisher–Yates sobre [`RandomSource::next_index`])
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        fisher_yates(items, self);
    }
}

/// Adaptador de qualquer `rand::Rng`
#[derive(Debug, Clone)]
pub struct RngSource<R = StdRng> {
    rng: R,
}

impl RngSource<StdRng> {
    /// Semente do sistema operacional (uso normal)
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Semente fixa (reprodutível)
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }

    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        items.shuffle(&mut self.rng);
    }
}

/// Repete uma sequência roteirizada (cada valor é reduzido módulo `bound`)
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    script: Vec<usize>,
    cursor: usize,
}

impl FixedSource {
    pub fn new(script: Vec<usize>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl RandomSource for FixedSource {
    fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 || self.script.is_empty() {
            return 0;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value % bound
    }
}

/// Fisher–Yates: toda permutação é igualmente provável
pub fn fisher_yates<T>(items: &mut [T], random: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = random.next_index(i + 1);
        items.swap(i, j);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SELEÇÃO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuração do seletor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Número máximo de recomendações (N)
    pub count: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_SELECTION_COUNT,
        }
    }
}

/// Resultado da seleção
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Populated(Vec<Recommendation>),
    /// Nenhuma fonte disponível: o widget fica vazio
    Empty,
}

impl Selection {
    fn from_items(items: Vec<Recommendation>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Populated(items)
        }
    }

    pub fn items(&self) -> &[Recommendation] {
        match self {
            Self::Populated(items) => items,
            Self::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn into_items(self) -> Vec<Recommendation> {
        match self {
            Self::Populated(items) => items,
            Self::Empty => Vec::new(),
        }
    }
}

/// Seletor de recomendações do lado do cliente
#[derive(Debug, Clone)]
pub struct ClientSelector<R: RandomSource = RngSource> {
    config: SelectionConfig,
    random: R,
}

impl Default for ClientSelector<RngSource> {
    fn default() -> Self {
        Self::new(SelectionConfig::default(), RngSource::from_entropy())
    }
}

impl<R: RandomSource> ClientSelector<R> {
    pub fn new(config: SelectionConfig, random: R) -> Self {
        Self { config, random }
    }

    pub fn config(&self) -> SelectionConfig {
        self.config
    }

    /// Seleciona as recomendações para `current_path`.
    ///
    /// `post_data` é o arquivo de dados da página atual (se carregou) e
    /// `index` o índice leve do corpus (se carregou).
    pub fn select(
        &mut self,
        current_path: &str,
        post_data: Option<&PostData>,
        index: Option<&[IndexSummary]>,
    ) -> Selection {
        let count = self.config.count;
        let index = index.filter(|entries| !entries.is_empty());

        let neighbors: Vec<Recommendation> = post_data
            .map(|data| {
                data.recommendations
                    .iter()
                    .filter(|r| !is_current_document(current_path, &r.path))
                    .map(Recommendation::from)
                    .collect()
            })
            .unwrap_or_default();

        let mut selected: Vec<Recommendation> = if neighbors.is_empty() {
            Vec::new()
        } else {
            let take = if index.is_some() {
                count.saturating_sub(1)
            } else {
                count
            };
            neighbors.into_iter().take(take).collect()
        };

        if let Some(index) = index {
            let remaining = count.saturating_sub(selected.len());
            let fill = self.random_fill(current_path, index, &selected, remaining);
            selected.extend(fill);
        }

        log::debug!("🎯 {} recomendações para {}", selected.len(), current_path);
        Selection::from_items(selected)
    }

    fn random_fill(
        &mut self,
        current_path: &str,
        index: &[IndexSummary],
        selected: &[Recommendation],
        remaining: usize,
    ) -> Vec<Recommendation> {
        if remaining == 0 {
            return Vec::new();
        }

        let mut pool: Vec<&IndexSummary> = index
            .iter()
            .filter(|entry| !is_current_document(current_path, &entry.path))
            .filter(|entry| {
                let path = root_relative(&entry.path);
                !selected.iter().any(|s| root_relative(&s.path) == path)
            })
            .collect();

        self.random.shuffle(&mut pool);
        pool.into_iter()
            .take(remaining)
            .map(Recommendation::from)
            .collect()
    }
}
