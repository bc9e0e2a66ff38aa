//! Subprocess construction for rendered commands.

use std::process::{Command, Stdio};

use crate::defaults::ShellConfig;

/// Build a command that runs `command` through the configured shell, so
/// pipes, redirects and `&&` in templates behave as typed.
///
/// stdin is inherited; stdout and stderr are piped for the caller to drain.
pub fn shell(config: &ShellConfig, command: &str) -> Command {
    let mut cmd = Command::new(&config.program);
    cmd.arg(&config.arg)
        .arg(command)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}
