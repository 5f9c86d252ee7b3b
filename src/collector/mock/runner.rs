//! In-memory command runner for testing collectors without a real host.

use crate::collector::traits::CommandRunner;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

/// Replays canned command output.
///
/// Unknown commands fail with `NotFound`, the same way a missing binary fails
/// to start. Every call is recorded, and clones share the call log so a test
/// can hand one clone to the collector and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    /// Map from exact command line to its stdout.
    outputs: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRunner {
    /// Creates a runner that knows no commands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the output of `command`.
    pub fn add(&mut self, command: impl Into<String>, output: impl Into<String>) {
        self.outputs.insert(command.into(), output.into());
    }

    /// Builder form of [`MockRunner::add`].
    pub fn with(mut self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.add(command, output);
        self
    }

    /// Commands issued so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &str) -> io::Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.to_string());
        }
        self.outputs.get(command).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("command not found: {:?}", command),
            )
        })
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
