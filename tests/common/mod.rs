//! Shared fakes for integration tests.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lb_sync::discovery::{NodeSource, RegistryError};
use lb_sync::model::BackendDescriptor;
use lb_sync::supervisor::{ApplyOutcome, Supervisor, SupervisorError, SupervisorState};

pub const FAKE_PID: u32 = 4242;

/// Node source whose answer the test changes between cycles.
#[derive(Clone)]
pub struct FakeRegistry {
    answer: Arc<Mutex<Result<Vec<BackendDescriptor>, String>>>,
}

#[allow(dead_code)]
impl FakeRegistry {
    pub fn new(nodes: &[(&str, &str)]) -> Self {
        let registry = Self {
            answer: Arc::new(Mutex::new(Ok(Vec::new()))),
        };
        registry.set(nodes);
        registry
    }

    pub fn set(&self, nodes: &[(&str, &str)]) {
        let backends = nodes
            .iter()
            .map(|(name, ip)| BackendDescriptor::new(*name, *ip).unwrap())
            .collect();
        *self.answer.lock().unwrap() = Ok(backends);
    }

    pub fn fail(&self, reason: &str) {
        *self.answer.lock().unwrap() = Err(reason.to_string());
    }
}

#[async_trait]
impl NodeSource for FakeRegistry {
    async fn fetch(&self) -> Result<Vec<BackendDescriptor>, RegistryError> {
        self.answer
            .lock()
            .unwrap()
            .clone()
            .map_err(RegistryError::Unavailable)
    }
}

/// What the recording supervisor saw.
#[derive(Debug, Default)]
pub struct Record {
    pub launches: usize,
    pub reloads: usize,
    pub shutdowns: usize,
    pub applied: Vec<String>,
    pub fail_next: bool,
    pub running: bool,
}

/// Supervisor that tracks launch/reload decisions without touching the OS.
#[derive(Clone, Default)]
pub struct RecordingSupervisor {
    pub record: Arc<Mutex<Record>>,
}

#[allow(dead_code)]
impl RecordingSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_apply(&self) {
        self.record.lock().unwrap().fail_next = true;
    }

    pub fn launches(&self) -> usize {
        self.record.lock().unwrap().launches
    }

    pub fn reloads(&self) -> usize {
        self.record.lock().unwrap().reloads
    }

    pub fn applies(&self) -> usize {
        self.record.lock().unwrap().applied.len()
    }

    pub fn last_config(&self) -> Option<String> {
        self.record.lock().unwrap().applied.last().cloned()
    }
}

#[async_trait]
impl Supervisor for RecordingSupervisor {
    async fn apply(&mut self, config_text: &str) -> Result<ApplyOutcome, SupervisorError> {
        let mut record = self.record.lock().unwrap();
        if record.fail_next {
            record.fail_next = false;
            return Err(SupervisorError::Spawn {
                executable: "fake-lb".into(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            });
        }

        record.applied.push(config_text.to_string());
        if record.running {
            record.reloads += 1;
            Ok(ApplyOutcome::Reloaded { pid: FAKE_PID })
        } else {
            record.running = true;
            record.launches += 1;
            Ok(ApplyOutcome::Launched { pid: FAKE_PID })
        }
    }

    fn state(&self) -> SupervisorState {
        if self.record.lock().unwrap().running {
            SupervisorState::Running
        } else {
            SupervisorState::NotStarted
        }
    }

    async fn shutdown(&mut self) -> Result<(), SupervisorError> {
        self.record.lock().unwrap().shutdowns += 1;
        Ok(())
    }
}
