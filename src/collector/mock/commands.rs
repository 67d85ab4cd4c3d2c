//! Scripted command runner for testing probes that shell out.

use crate::collector::command::{CommandError, CommandRunner};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Output(String),
    Timeout,
}

/// Command runner returning canned outputs keyed by program name.
///
/// Programs without a script behave as not installed. Clones share state,
/// so tests can change a script while a sampler holds the runner.
#[derive(Debug, Clone, Default)]
pub struct MockCommands {
    scripts: Arc<Mutex<HashMap<String, Scripted>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `program` succeed with `stdout`.
    pub fn set_output(&self, program: &str, stdout: impl Into<String>) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert(program.to_string(), Scripted::Output(stdout.into()));
        }
    }

    /// Makes `program` hang past its timeout.
    pub fn set_timeout(&self, program: &str) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert(program.to_string(), Scripted::Timeout);
        }
    }

    /// Number of times `program` was invoked.
    pub fn calls(&self, program: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.iter().filter(|p| p.as_str() == program).count())
            .unwrap_or(0)
    }
}

impl CommandRunner for MockCommands {
    fn run(
        &self,
        program: &str,
        _args: &[&str],
        timeout: Duration,
    ) -> Result<String, CommandError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(program.to_string());
        }
        let script = self
            .scripts
            .lock()
            .ok()
            .and_then(|s| s.get(program).cloned());
        match script {
            Some(Scripted::Output(out)) => Ok(out),
            Some(Scripted::Timeout) => Err(CommandError::Timeout {
                program: program.to_string(),
                after: timeout,
            }),
            None => Err(CommandError::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", program),
            ))),
        }
    }
}
