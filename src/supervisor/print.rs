//! Debug-mode supervisor: prints instead of applying.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::supervisor::{ApplyOutcome, Supervisor, SupervisorError, SupervisorState};

/// Writes each rendered configuration to an output stream (stdout by default).
pub struct PrintSupervisor<W = tokio::io::Stdout> {
    out: W,
    printed: usize,
}

impl PrintSupervisor {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> PrintSupervisor<W> {
    pub fn new(out: W) -> Self {
        Self { out, printed: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Supervisor for PrintSupervisor<W> {
    async fn apply(&mut self, config_text: &str) -> Result<ApplyOutcome, SupervisorError> {
        self.printed += 1;
        let header = format!("# --- rendered configuration #{} ---\n", self.printed);

        self.out
            .write_all(header.as_bytes())
            .await
            .map_err(SupervisorError::Output)?;
        self.out
            .write_all(config_text.as_bytes())
            .await
            .map_err(SupervisorError::Output)?;
        self.out.flush().await.map_err(SupervisorError::Output)?;

        Ok(ApplyOutcome::Printed)
    }

    fn state(&self) -> SupervisorState {
        if self.printed == 0 {
            SupervisorState::NotStarted
        } else {
            SupervisorState::Running
        }
    }
}
