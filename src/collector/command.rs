//! External command execution with a hard wall-clock timeout.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Timeout applied to every vendor tool invocation.
pub const COMMAND_TIMEOUT: Duration = Duration::from_millis(400);

const POLL_STEP: Duration = Duration::from_millis(5);

/// Error type for external command failures.
#[derive(Debug)]
pub enum CommandError {
    /// The program could not be started (usually: not installed).
    Spawn(std::io::Error),
    /// The program exited unsuccessfully.
    Failed { program: String, code: Option<i32> },
    /// The program did not finish in time and was killed.
    Timeout { program: String, after: Duration },
    /// Waiting on or reading from the child failed.
    Io(std::io::Error),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Spawn(e) => write!(f, "failed to start: {}", e),
            CommandError::Failed { program, code } => match code {
                Some(c) => write!(f, "{} exited with status {}", program, c),
                None => write!(f, "{} terminated by signal", program),
            },
            CommandError::Timeout { program, after } => {
                write!(f, "{} timed out after {:?}", program, after)
            }
            CommandError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        CommandError::Io(e)
    }
}

/// Runs external programs and returns their stdout.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Result<String, CommandError>;
}

/// Runs real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommands;

impl CommandRunner for SystemCommands {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Result<String, CommandError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(CommandError::Spawn)?;

        let start = Instant::now();
        loop {
            match child.try_wait()? {
                Some(status) => {
                    if !status.success() {
                        return Err(CommandError::Failed {
                            program: program.to_string(),
                            code: status.code(),
                        });
                    }
                    let mut out = Vec::new();
                    if let Some(mut stdout) = child.stdout.take() {
                        stdout.read_to_end(&mut out)?;
                    }
                    return Ok(String::from_utf8_lossy(&out).into_owned());
                }
                None => {
                    if start.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(CommandError::Timeout {
                            program: program.to_string(),
                            after: timeout,
                        });
                    }
                    std::thread::sleep(POLL_STEP);
                }
            }
        }
    }
}
