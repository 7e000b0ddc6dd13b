//! Caller-supplied bounds for one agent turn.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{AiError, Result};

/// Cancellation signal and optional deadline for a whole turn.
///
/// Every blocking call inside a turn (LLM request or tool execution) is
/// raced against both. Losing the race aborts the in-flight iteration.
#[derive(Debug, Clone, Default)]
pub struct TurnOptions {
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}

impl TurnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Fails fast if the turn is already over.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(AiError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(AiError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `fut` unless the turn is cancelled or its deadline passes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(AiError::Cancelled),
                _ = tokio::time::sleep_until(deadline) => Err(AiError::DeadlineExceeded),
                result = fut => result,
            },
            None => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(AiError::Cancelled),
                result = fut => result,
            },
        }
    }
}

/// True for the errors that end a turn without touching session state.
pub fn is_interruption(err: &AiError) -> bool {
    matches!(err, AiError::Cancelled | AiError::DeadlineExceeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let options = TurnOptions::new();
        let value = options.run(async { Ok::<_, AiError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let options = TurnOptions::new();
        options.cancel.cancel();
        let result = options.run(async { Ok::<_, AiError>(()) }).await;
        assert!(matches!(result, Err(AiError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_future() {
        let options = TurnOptions::new().with_timeout(Duration::from_millis(50));
        let result = options
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, AiError>(())
            })
            .await;
        assert!(matches!(result, Err(AiError::DeadlineExceeded)));
        assert!(is_interruption(&AiError::DeadlineExceeded));
        assert!(!is_interruption(&AiError::Llm("x".into())));
    }
}
