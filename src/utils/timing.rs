// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TEMPO DAS ETAPAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Cada etapa da geração (embeddings, ranking, escrita) é cronometrada e o
// resultado vai para o relatório da execução.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Duração medida de uma etapa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: String,
    pub elapsed_ms: u64,
}

/// Cronômetro de uma etapa; consumido por [`StageTimer::finish`]
#[derive(Debug)]
pub struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        log::debug!("▶️  {}", stage);
        Self {
            stage,
            started: Instant::now(),
        }
    }

    /// Encerra a etapa e registra a duração no log
    pub fn finish(self) -> StageTiming {
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!("⏱️  {}: {}ms", self.stage, elapsed_ms);
        StageTiming {
            stage: self.stage.to_string(),
            elapsed_ms,
        }
    }
}
