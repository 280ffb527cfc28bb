// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// UTILITÁRIOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Utilitários compartilhados pelo pipeline e pelo seletor:
// - Espaçamento entre chamadas ao provedor (rate limiting)
// - Normalização de caminhos de documentos
// - Escrita atômica de arquivos
// - Timing de etapas
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Política de espaçamento mínimo entre chamadas externas.
pub mod pacing;
/// Normalização de caminhos e nomes de arquivos de dados.
pub mod paths;
mod persist;
mod timing;

pub use pacing::CallSpacing;
pub use paths::{data_file_name, is_current_document, root_relative};
pub use persist::write_atomic;
pub use timing::{StageTimer, StageTiming};
