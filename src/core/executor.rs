//! What happens to a rendered command.
//!
//! A run picks one [`Executor`] up front: [`PrintExecutor`] for dry runs,
//! [`ShellExecutor`] for real ones. Per-command problems come back as a
//! [`DispatchOutcome`]; only console or log write failures are errors.

use chrono::Local;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;

use crate::defaults::{Defaults, ShellConfig};
use crate::error::{Error, Result};
use crate::logs::ExecutionLog;
use crate::utils::command;
use crate::utils::io::{BroadcastWriter, SharedWriter};

/// Position of a command within its run. `current` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}]", self.current, self.total)
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    /// Written out without running.
    Printed,
    /// Ran and exited zero.
    Succeeded,
    /// Never ran.
    Skipped(Error),
    /// Could not start, or exited non-zero.
    Failed(Error),
}

pub trait Executor {
    fn dispatch(&mut self, command: &str, progress: Progress) -> Result<DispatchOutcome>;

    /// Release the executor's sinks. Returns the log file path if one was written.
    fn finish(&mut self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

fn write_error(e: io::Error, target: &str) -> Error {
    Error::internal_io(e.to_string(), Some(format!("write {}", target)))
}

// ============================================================================
// Print
// ============================================================================

/// Writes each command verbatim, one per line.
pub struct PrintExecutor<W: Write> {
    out: W,
}

impl PrintExecutor<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PrintExecutor<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Executor for PrintExecutor<W> {
    fn dispatch(&mut self, command: &str, _progress: Progress) -> Result<DispatchOutcome> {
        writeln!(self.out, "{}", command).map_err(|e| write_error(e, "stdout"))?;
        Ok(DispatchOutcome::Printed)
    }

    fn finish(&mut self) -> Result<Option<PathBuf>> {
        self.out.flush().map_err(|e| write_error(e, "stdout"))?;
        Ok(None)
    }
}

// ============================================================================
// Shell
// ============================================================================

type Console = Mutex<Box<dyn Write + Send>>;

const LINE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Runs each command through the configured shell, mirroring its output to
/// the console and, when present, the execution log.
pub struct ShellExecutor {
    shell: ShellConfig,
    stdout: Console,
    stderr: Console,
    log: Option<Mutex<ExecutionLog>>,
}

impl ShellExecutor {
    pub fn new(defaults: &Defaults, log: Option<ExecutionLog>) -> Self {
        Self {
            shell: defaults.shell.clone(),
            stdout: Mutex::new(Box::new(io::stdout())),
            stderr: Mutex::new(Box::new(io::stderr())),
            log: log.map(Mutex::new),
        }
    }

    /// Replace the console streams.
    pub fn with_console(
        mut self,
        stdout: impl Write + Send + 'static,
        stderr: impl Write + Send + 'static,
    ) -> Self {
        self.stdout = Mutex::new(Box::new(stdout));
        self.stderr = Mutex::new(Box::new(stderr));
        self
    }

    fn write_progress(&self, command: &str, progress: Progress) -> Result<()> {
        let line = format!(
            "{} {} Executing: {}\n",
            progress,
            Local::now().format(LINE_TIMESTAMP),
            command
        );
        SharedWriter::new(&self.stdout)
            .write_all(line.as_bytes())
            .map_err(|e| write_error(e, "stdout"))?;
        if let Some(log) = &self.log {
            SharedWriter::new(log)
                .write_all(line.as_bytes())
                .map_err(|e| write_error(e, "execution log"))?;
        }
        Ok(())
    }
}

/// Copy one child pipe into its console stream and the log until EOF.
fn drain<R: Read>(
    source: Option<R>,
    console: &Console,
    log: Option<&Mutex<ExecutionLog>>,
) -> io::Result<()> {
    let Some(mut source) = source else {
        return Ok(());
    };

    let mut sinks: Vec<Box<dyn Write + '_>> = vec![Box::new(SharedWriter::new(console))];
    if let Some(log) = log {
        sinks.push(Box::new(SharedWriter::new(log)));
    }

    let mut writer = BroadcastWriter::new(sinks);
    io::copy(&mut source, &mut writer)?;
    writer.flush()
}

fn joined(result: thread::Result<io::Result<()>>) -> io::Result<()> {
    result.unwrap_or_else(|_| Err(io::Error::other("output thread panicked")))
}

impl Executor for ShellExecutor {
    fn dispatch(&mut self, command: &str, progress: Progress) -> Result<DispatchOutcome> {
        if command.trim().is_empty() {
            return Ok(DispatchOutcome::Skipped(Error::command_empty()));
        }

        self.write_progress(command, progress)?;

        let mut child = match command::shell(&self.shell, command).spawn() {
            Ok(child) => child,
            Err(e) => {
                return Ok(DispatchOutcome::Failed(Error::command_spawn(
                    command,
                    e.to_string(),
                )))
            }
        };

        let child_stdout = child.stdout.take();
        let child_stderr = child.stderr.take();
        let log = self.log.as_ref();
        let (stdout, stderr) = (&self.stdout, &self.stderr);

        let (out, err) = thread::scope(|scope| {
            let out = scope.spawn(move || drain(child_stdout, stdout, log));
            let err = scope.spawn(move || drain(child_stderr, stderr, log));
            (joined(out.join()), joined(err.join()))
        });

        let status = child.wait().map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("wait for '{}'", command)))
        })?;
        out.map_err(|e| write_error(e, "command output"))?;
        err.map_err(|e| write_error(e, "command output"))?;

        if status.success() {
            Ok(DispatchOutcome::Succeeded)
        } else {
            Ok(DispatchOutcome::Failed(Error::command_failed(
                command,
                status.code(),
            )))
        }
    }

    fn finish(&mut self) -> Result<Option<PathBuf>> {
        SharedWriter::new(&self.stdout)
            .flush()
            .map_err(|e| write_error(e, "stdout"))?;
        SharedWriter::new(&self.stderr)
            .flush()
            .map_err(|e| write_error(e, "stderr"))?;

        match self.log.take() {
            Some(log) => {
                let log = log.into_inner().map_err(|_| {
                    Error::internal_io("execution log lock poisoned", None)
                })?;
                log.close().map(Some)
            }
            None => Ok(None),
        }
    }
}
