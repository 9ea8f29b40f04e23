//! Child-process supervisor.
//!
//! # Responsibilities
//! - Launch the load balancer once, pointed at the generated config
//! - Deliver the reload signal on every later apply
//! - Notice a child that died on its own and fall back to NOT_STARTED
//! - Optionally terminate the child when the daemon exits
//!
//! # Design Decisions
//! - The tokio `Child` handle is kept so exit status can be polled
//!   (and the child reaped) before every signal
//! - Signals go through `nix::sys::signal::kill`; `ESRCH` means the pid is
//!   stale and the state resets so the next apply relaunches

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tokio::time::timeout;

use crate::config::schema::{ProcessConfig, CONFIG_PATH_PLACEHOLDER};
use crate::observability::metrics;
use crate::supervisor::config_file::write_config;
use crate::supervisor::{parse_signal, ApplyOutcome, Supervisor, SupervisorError, SupervisorState};

/// How long a terminated child may take to exit before it is killed.
const STOP_GRACE: Duration = Duration::from_secs(10);

enum ProcessState {
    NotStarted,
    Running { child: Child, pid: u32 },
}

/// Supervises the single load-balancer child process.
pub struct ProcessSupervisor {
    executable: String,
    args: Vec<String>,
    config_path: PathBuf,
    reload_signal: Signal,
    stop_on_exit: bool,
    state: ProcessState,
}

impl ProcessSupervisor {
    pub fn new(config: &ProcessConfig) -> Result<Self, SupervisorError> {
        let reload_signal = parse_signal(&config.reload_signal)
            .ok_or_else(|| SupervisorError::UnknownSignal(config.reload_signal.clone()))?;

        Ok(Self {
            executable: config.executable.clone(),
            args: config.args.clone(),
            config_path: config.config_path.clone(),
            reload_signal,
            stop_on_exit: config.stop_on_exit,
            state: ProcessState::NotStarted,
        })
    }

    /// Pid of the running child, if any.
    pub fn pid(&self) -> Option<u32> {
        match &self.state {
            ProcessState::Running { pid, .. } => Some(*pid),
            ProcessState::NotStarted => None,
        }
    }

    fn command_args(&self) -> Vec<String> {
        let path = self.config_path.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(CONFIG_PATH_PLACEHOLDER, &path))
            .collect()
    }

    /// NOT_STARTED → RUNNING. The config file must already be written.
    fn launch(&mut self) -> Result<ApplyOutcome, SupervisorError> {
        let args = self.command_args();
        tracing::info!(executable = %self.executable, args = ?args, "Launching load balancer");

        let child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;

        let pid = child.id().ok_or_else(|| SupervisorError::MissingPid {
            executable: self.executable.clone(),
        })?;

        self.state = ProcessState::Running { child, pid };
        metrics::record_launch();
        tracing::info!(pid, "Load balancer started");
        Ok(ApplyOutcome::Launched { pid })
    }

    /// Signal the running child, after checking it is still alive.
    fn reload(
        &mut self,
        pid: u32,
        exit: io::Result<Option<ExitStatus>>,
    ) -> Result<ApplyOutcome, SupervisorError> {
        match exit {
            Ok(Some(status)) => {
                self.state = ProcessState::NotStarted;
                return Err(SupervisorError::Exited {
                    pid,
                    status: status.to_string(),
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(pid, error = %e, "Could not poll load balancer status, signalling anyway");
            }
        }

        match kill(Pid::from_raw(pid as i32), self.reload_signal) {
            Ok(()) => {
                metrics::record_reload();
                tracing::info!(pid, signal = ?self.reload_signal, "Load balancer reload signalled");
                Ok(ApplyOutcome::Reloaded { pid })
            }
            Err(source) => {
                if source == Errno::ESRCH {
                    self.state = ProcessState::NotStarted;
                }
                Err(SupervisorError::Signal {
                    pid,
                    signal: self.reload_signal,
                    source,
                })
            }
        }
    }
}

#[async_trait]
impl Supervisor for ProcessSupervisor {
    async fn apply(&mut self, config_text: &str) -> Result<ApplyOutcome, SupervisorError> {
        write_config(&self.config_path, config_text)
            .await
            .map_err(|source| SupervisorError::WriteConfig {
                path: self.config_path.clone(),
                source,
            })?;

        let running = match &mut self.state {
            ProcessState::NotStarted => None,
            ProcessState::Running { child, pid } => Some((*pid, child.try_wait())),
        };

        match running {
            None => self.launch(),
            Some((pid, exit)) => self.reload(pid, exit),
        }
    }

    fn state(&self) -> SupervisorState {
        match self.state {
            ProcessState::NotStarted => SupervisorState::NotStarted,
            ProcessState::Running { .. } => SupervisorState::Running,
        }
    }

    async fn shutdown(&mut self) -> Result<(), SupervisorError> {
        let ProcessState::Running { mut child, pid } =
            std::mem::replace(&mut self.state, ProcessState::NotStarted)
        else {
            return Ok(());
        };

        if !self.stop_on_exit {
            tracing::info!(pid, "Leaving load balancer running");
            return Ok(());
        }

        tracing::info!(pid, "Stopping load balancer");
        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => {
                return Err(SupervisorError::Stop {
                    pid,
                    reason: e.to_string(),
                })
            }
        }

        match timeout(STOP_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(pid, %status, "Load balancer stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(SupervisorError::Stop {
                pid,
                reason: e.to_string(),
            }),
            Err(_) => {
                tracing::warn!(pid, "Load balancer ignored SIGTERM, killing");
                child.kill().await.map_err(|e| SupervisorError::Stop {
                    pid,
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> ProcessConfig {
        ProcessConfig {
            executable: "haproxy".into(),
            args: args.iter().map(|s| s.to_string()).collect(),
            config_path: PathBuf::from("/run/lb/haproxy.cfg"),
            reload_signal: "USR2".into(),
            stop_on_exit: false,
        }
    }

    #[test]
    fn test_config_placeholder_expanded() {
        let supervisor = ProcessSupervisor::new(&config(&["-W", "-f", "{config}"])).unwrap();
        assert_eq!(
            supervisor.command_args(),
            vec!["-W", "-f", "/run/lb/haproxy.cfg"]
        );
    }

    #[test]
    fn test_starts_not_running() {
        let supervisor = ProcessSupervisor::new(&ProcessConfig::default()).unwrap();
        assert_eq!(supervisor.state(), SupervisorState::NotStarted);
        assert_eq!(supervisor.pid(), None);
    }

    #[test]
    fn test_unknown_signal_rejected() {
        let mut cfg = config(&[]);
        cfg.reload_signal = "RELOAD".into();
        assert!(matches!(
            ProcessSupervisor::new(&cfg),
            Err(SupervisorError::UnknownSignal(_))
        ));
    }
}
