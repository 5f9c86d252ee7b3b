//! Abstractions for running host commands to enable remote audits and mocking.
//!
//! The `CommandRunner` trait lets the collector read command output from the
//! local machine, from a remote machine over SSH, or from an in-memory mock.

use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::trace;

/// Abstraction for executing a shell command and capturing its output.
pub trait CommandRunner: Send + Sync {
    /// Runs `command` through a shell and returns its standard output.
    ///
    /// A non-zero exit status is not an error: tools like `systemctl is-active`
    /// report their answer on stdout and signal it through the exit code.
    ///
    /// # Returns
    /// Captured stdout (lossily decoded as UTF-8), or an I/O error if the
    /// command could not be started at all.
    fn run(&self, command: &str) -> io::Result<String>;

    /// Short description for logs, e.g. `local` or `ssh root@db-01`.
    fn describe(&self) -> String;
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&self, command: &str) -> io::Result<String> {
        (**self).run(command)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Runs commands on this machine via `sh -c`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalRunner;

impl LocalRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for LocalRunner {
    fn run(&self, command: &str) -> io::Result<String> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        if !output.status.success() {
            trace!("`{}` exited with {}", command, output.status);
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn describe(&self) -> String {
        "local".to_string()
    }
}

/// Default SSH connect timeout in seconds.
const SSH_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Runs every command on a remote host, one `ssh` session per command.
///
/// Host key prompts are disabled and password prompts are refused
/// (`BatchMode=yes`), so the target must accept key authentication.
#[derive(Debug, Clone)]
pub struct SshRunner {
    host: String,
    user: String,
    identity_file: Option<PathBuf>,
    connect_timeout: u64,
}

impl SshRunner {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            identity_file: None,
            connect_timeout: SSH_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Uses the given private key (`ssh -i`).
    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// `user@host` destination.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Builds the `ssh` invocation for `command` without running it.
    pub fn build_command(&self, command: &str) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o").arg("StrictHostKeyChecking=no");
        cmd.arg("-o").arg("BatchMode=yes");
        cmd.arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout));
        if let Some(ref key) = self.identity_file {
            cmd.arg("-i").arg(key);
        }
        cmd.arg(self.destination());
        cmd.arg(command);
        cmd.stdin(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

impl CommandRunner for SshRunner {
    fn run(&self, command: &str) -> io::Result<String> {
        let output = self.build_command(command).output()?;
        if !output.status.success() {
            trace!(
                "`{}` on {} exited with {}",
                command,
                self.destination(),
                output.status
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn describe(&self) -> String {
        format!("ssh {}", self.destination())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_local_runner_captures_stdout() {
        let runner = LocalRunner::new();
        let out = runner.run("echo hello").unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_local_runner_keeps_output_of_failing_command() {
        let runner = LocalRunner::new();
        let out = runner.run("echo inactive; exit 3").unwrap();
        assert_eq!(out.trim(), "inactive");
    }

    #[test]
    fn test_ssh_command_line() {
        let runner = SshRunner::new("db-01", "root").with_identity_file("/root/.ssh/id_rsa");
        let cmd = runner.build_command("uname -r");

        assert_eq!(cmd.get_program(), OsStr::new("ssh"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert!(args.contains(&OsStr::new("StrictHostKeyChecking=no")));
        assert!(args.contains(&OsStr::new("BatchMode=yes")));
        assert!(args.contains(&OsStr::new("/root/.ssh/id_rsa")));
        // Destination and command come last, command as a single argument
        assert_eq!(args[args.len() - 2], OsStr::new("root@db-01"));
        assert_eq!(args[args.len() - 1], OsStr::new("uname -r"));
        assert_eq!(runner.describe(), "ssh root@db-01");
    }

    #[test]
    fn test_ssh_command_without_key() {
        let runner = SshRunner::new("10.0.0.7", "audit");
        let args: Vec<String> = runner
            .build_command("who")
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(!args.iter().any(|a| a == "-i"));
        assert!(args.iter().any(|a| a == "ConnectTimeout=5"));
    }
}
