//! CLI error reporting and exit code mapping.

use std::io::{self, Write};
use xrun::Error;

/// Print a fatal error and its hints to stderr.
pub fn print_error(err: &Error) {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    let _ = write_error(&mut handle, err);
}

fn write_error(out: &mut impl Write, err: &Error) -> io::Result<()> {
    writeln!(out, "Error: {}", err.message)?;
    for hint in &err.hints {
        writeln!(out, "Hint: {}", hint.message)?;
    }
    Ok(())
}

pub fn map_cmd_result<T>(result: xrun::Result<(T, i32)>) -> i32 {
    match result {
        Ok((_, exit_code)) => exit_code,
        Err(err) => {
            print_error(&err);
            err.exit_code()
        }
    }
}

pub fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_lines_include_hints() {
        let err = Error::log_create("/ro/xrun-a.logs", "permission denied");
        let mut out = Vec::new();
        write_error(&mut out, &err).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Error: failed to create log file /ro/xrun-a.logs"));
        assert!(text.contains("\nHint: Pass --no-log-files"));
    }

    #[test]
    fn exit_codes_clamp_to_u8() {
        assert_eq!(exit_code_to_u8(-1), 0);
        assert_eq!(exit_code_to_u8(2), 2);
        assert_eq!(exit_code_to_u8(300), 255);
    }
}
