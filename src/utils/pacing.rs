// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ESPAÇAMENTO ENTRE CHAMADAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// O provedor de embeddings limita rajadas de requisições. O orquestrador
// garante um intervalo mínimo entre o início de chamadas consecutivas.
// Com `CallSpacing::disabled()` nenhuma espera acontece (testes).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::time::Duration;
use tokio::time::Instant;

/// Intervalo padrão entre chamadas ao provedor
pub const DEFAULT_CALL_SPACING: Duration = Duration::from_millis(200);

/// Política de intervalo mínimo entre chamadas sucessivas
#[derive(Debug, Clone)]
pub struct CallSpacing {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl Default for CallSpacing {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_SPACING)
    }
}

impl CallSpacing {
    /// Cria política com intervalo mínimo customizado
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Política sem espera
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Quanto falta esperar antes da próxima chamada
    pub fn remaining(&self) -> Duration {
        match self.last_call {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Aguarda o intervalo mínimo e registra o início de uma nova chamada
    pub async fn wait_turn(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
        self.last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_call_does_not_wait() {
        let spacing = CallSpacing::new(Duration::from_secs(10));
        assert_eq!(spacing.remaining(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_disabled_never_waits() {
        let mut spacing = CallSpacing::disabled();
        spacing.wait_turn().await;
        assert_eq!(spacing.remaining(), Duration::ZERO);
        spacing.wait_turn().await;
        assert_eq!(spacing.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enforces_minimum_interval() {
        let mut spacing = CallSpacing::new(Duration::from_millis(200));
        spacing.wait_turn().await;
        assert!(spacing.remaining() > Duration::ZERO);

        let before = Instant::now();
        spacing.wait_turn().await;
        assert!(before.elapsed() >= Duration::from_millis(200));
    }
}
