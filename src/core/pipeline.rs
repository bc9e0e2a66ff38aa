//! Run orchestration: template, records, executor, in that order.
//!
//! A run moves through [`RunPhase`]s once and never goes back. Anything that
//! fails before dispatching starts is fatal; once dispatching, a bad record
//! only costs that record.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::defaults::Defaults;
use crate::error::{Error, Result};
use crate::executor::{DispatchOutcome, Executor, PrintExecutor, Progress, ShellExecutor};
use crate::logs::ExecutionLog;
use crate::output::RunSummary;
use crate::record::Location;
use crate::source::{self, RecordBatch};
use crate::template::Template;
use crate::utils::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Inline(String),
    File(PathBuf),
}

impl TemplateSource {
    /// Template text. A file loses one trailing line ending.
    pub fn load(&self) -> Result<String> {
        match self {
            TemplateSource::Inline(text) => Ok(text.clone()),
            TemplateSource::File(path) => {
                let mut text =
                    io::read_file(path, &format!("read template {}", path.display()))?;
                if text.ends_with('\n') {
                    text.pop();
                    if text.ends_with('\r') {
                        text.pop();
                    }
                }
                Ok(text)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub data_file: PathBuf,
    pub template: TemplateSource,
    /// Print commands instead of running them. Implies no log file.
    pub dry_run: bool,
    pub no_log_files: bool,
    pub log_dir: PathBuf,
}

impl RunOptions {
    pub fn new(data_file: impl Into<PathBuf>, template: TemplateSource) -> Self {
        Self {
            data_file: data_file.into(),
            template,
            dry_run: false,
            no_log_files: false,
            log_dir: PathBuf::from("."),
        }
    }

    pub fn logging_enabled(&self) -> bool {
        !self.dry_run && !self.no_log_files
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    Normalizing,
    Dispatching,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Init => "init",
            RunPhase::Normalizing => "normalizing",
            RunPhase::Dispatching => "dispatching",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

fn enter(phase: RunPhase) {
    tracing::debug!(%phase, "run phase");
}

/// Compile the template, then read and parse the data file.
fn prepare(template: &str, data_file: &Path) -> Result<(Template, RecordBatch)> {
    enter(RunPhase::Init);
    let template = Template::compile(template)?;
    tracing::debug!(fields = ?template.fields().collect::<Vec<_>>(), "compiled template");

    enter(RunPhase::Normalizing);
    let batch = source::load(data_file)?;
    Ok((template, batch))
}

fn invalid_line_number(error: &Error) -> usize {
    error
        .details
        .get("line")
        .and_then(|line| line.as_u64())
        .map_or(usize::MAX, |line| line as usize)
}

/// Render and dispatch every record. Closes the executor on every path.
/// Skipped JSONL lines are reported in line order among the records.
fn dispatch_all(
    template: &Template,
    batch: RecordBatch,
    executor: &mut dyn Executor,
) -> Result<RunSummary> {
    enter(RunPhase::Dispatching);
    let total = batch.len();
    let mut summary = RunSummary::new(total);

    let mut invalid_lines = batch.invalid_lines.iter().peekable();
    let mut skip_invalid_before = |line: usize, summary: &mut RunSummary| {
        while let Some(error) = invalid_lines.next_if(|e| invalid_line_number(e) < line) {
            tracing::warn!("skipping {}", error);
            summary.record_invalid_line(error);
        }
    };

    for (index, record) in batch.records.iter().enumerate() {
        if let Location::Line(line) = record.location() {
            skip_invalid_before(line, &mut summary);
        }

        let location = record.location().to_string();
        let command = match template.render(record) {
            Ok(command) => command,
            Err(error) => {
                tracing::warn!("{}", error);
                summary.record_skipped(location, &error);
                continue;
            }
        };

        let outcome = match executor.dispatch(&command, Progress::new(index + 1, total)) {
            Ok(outcome) => outcome,
            Err(error) => {
                if let Err(close_error) = executor.finish() {
                    tracing::debug!(%close_error, "closing executor after fatal error");
                }
                return Err(error);
            }
        };

        match outcome {
            DispatchOutcome::Printed | DispatchOutcome::Succeeded => summary.record_succeeded(),
            DispatchOutcome::Skipped(error) => {
                tracing::warn!("skipping {}: {}", location, error);
                summary.record_skipped(location, &error);
            }
            DispatchOutcome::Failed(error) => {
                tracing::warn!("{}: {}", location, error);
                summary.record_failed(location, &error);
            }
        }
    }

    for error in invalid_lines {
        tracing::warn!("skipping {}", error);
        summary.record_invalid_line(error);
    }

    summary.log_file = executor.finish()?;
    enter(RunPhase::Done);
    Ok(summary)
}

/// Run `template` over every record of `data_file` with a caller-supplied
/// executor. No log file is created; that is the executor's business.
pub fn run_with_executor(
    template: &str,
    data_file: &Path,
    executor: &mut dyn Executor,
) -> Result<RunSummary> {
    let (template, batch) = prepare(template, data_file)?;
    dispatch_all(&template, batch, executor)
}

/// Run a batch as configured: print commands for a dry run, otherwise run
/// them through the shell with an optional execution log.
pub fn run(options: &RunOptions, defaults: &Defaults) -> Result<RunSummary> {
    let template = options.template.load()?;
    let (template, batch) = prepare(&template, &options.data_file)?;

    let summary = if options.dry_run {
        dispatch_all(&template, batch, &mut PrintExecutor::stdout())?
    } else {
        let log = if options.logging_enabled() {
            let log = ExecutionLog::create(&options.data_file, &options.log_dir)?;
            log_status!("xrun", "Logging to {}", log.path().display());
            Some(log)
        } else {
            None
        };
        dispatch_all(&template, batch, &mut ShellExecutor::new(defaults, log))?
    };

    if summary.is_clean() {
        log_status!("xrun", "{} records: all succeeded", summary.records);
    } else {
        log_status!(
            "xrun",
            "{} records: {} succeeded, {} failed, {} skipped",
            summary.records,
            summary.succeeded,
            summary.failed,
            summary.skipped
        );
        if summary.invalid_lines > 0 {
            log_status!("xrun", "{} invalid lines skipped", summary.invalid_lines);
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::fs;

    #[derive(Default)]
    struct Recorder {
        commands: Vec<(String, Progress)>,
        finished: usize,
    }

    impl Executor for Recorder {
        fn dispatch(&mut self, command: &str, progress: Progress) -> Result<DispatchOutcome> {
            self.commands.push((command.to_string(), progress));
            Ok(DispatchOutcome::Printed)
        }

        fn finish(&mut self) -> Result<Option<PathBuf>> {
            self.finished += 1;
            Ok(None)
        }
    }

    struct Broken;

    impl Executor for Broken {
        fn dispatch(&mut self, _command: &str, _progress: Progress) -> Result<DispatchOutcome> {
            Err(crate::Error::internal_io("disk full", None))
        }
    }

    fn data_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn inline_template_is_kept_verbatim() {
        let source = TemplateSource::Inline("echo {{.a}}\n".to_string());
        assert_eq!(source.load().unwrap(), "echo {{.a}}\n");
    }

    #[test]
    fn template_file_loses_one_line_ending() {
        let dir = tempfile::tempdir().unwrap();
        let unix = data_file(dir.path(), "a.tmpl", "echo {{.a}}\n\n");
        let windows = data_file(dir.path(), "b.tmpl", "echo {{.a}}\r\n");
        assert_eq!(TemplateSource::File(unix).load().unwrap(), "echo {{.a}}\n");
        assert_eq!(TemplateSource::File(windows).load().unwrap(), "echo {{.a}}");
    }

    #[test]
    fn missing_template_file_is_fatal() {
        let err = TemplateSource::File(PathBuf::from("/nonexistent/t.tmpl"))
            .load()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalIoError);
    }

    #[test]
    fn logging_follows_flags() {
        let mut options = RunOptions::new("a.csv", TemplateSource::Inline(String::new()));
        assert!(options.logging_enabled());
        options.dry_run = true;
        assert!(!options.logging_enabled());
        options.dry_run = false;
        options.no_log_files = true;
        assert!(!options.logging_enabled());
    }

    #[test]
    fn dispatches_in_order_with_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(dir.path(), "people.csv", "name,age\nAda,36\nLinus,28\n");
        let mut recorder = Recorder::default();

        let summary =
            run_with_executor("hello {{.name}} ({{.age}})", &path, &mut recorder).unwrap();

        assert_eq!(
            recorder.commands,
            vec![
                ("hello Ada (36)".to_string(), Progress::new(1, 2)),
                ("hello Linus (28)".to_string(), Progress::new(2, 2)),
            ]
        );
        assert_eq!(recorder.finished, 1);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.succeeded, 2);
        assert!(summary.is_clean());
    }

    #[test]
    fn render_failure_skips_only_that_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(
            dir.path(),
            "rows.jsonl",
            "{\"v\":\"ok\"}\n{\"v\":\"bad\\u0000\"}\n{\"v\":\"fine\"}\n",
        );
        let mut recorder = Recorder::default();

        let summary = run_with_executor("echo {{.v}}", &path, &mut recorder).unwrap();

        let commands: Vec<&str> = recorder.commands.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(commands, vec!["echo ok", "echo fine"]);
        assert_eq!(recorder.commands[1].1, Progress::new(3, 3));
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.diagnostics[0].location, "line 2");
        assert_eq!(summary.diagnostics[0].code, "template.render_failed");
    }

    #[test]
    fn invalid_lines_are_reported_in_line_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(
            dir.path(),
            "rows.jsonl",
            "{not json}\n{\"v\":\"bad\\u0000\"}\n[oops\n{\"v\":\"ok\"}\n{\"v\":\"x\\u0000\"}\nnope\n",
        );
        let mut recorder = Recorder::default();

        let summary = run_with_executor("echo {{.v}}", &path, &mut recorder).unwrap();

        let locations: Vec<&str> = summary
            .diagnostics
            .iter()
            .map(|d| d.location.as_str())
            .collect();
        assert_eq!(
            locations,
            vec!["line 1", "line 2", "line 3", "line 5", "line 6"]
        );
        assert_eq!(summary.invalid_lines, 3);
        assert_eq!(summary.skipped, 2);
        assert_eq!(recorder.commands.len(), 1);
        assert!(!summary.is_clean());
    }

    #[test]
    fn invalid_template_fails_before_reading_data() {
        let mut recorder = Recorder::default();
        let err = run_with_executor(
            "echo {{.name",
            Path::new("/nonexistent/data.csv"),
            &mut recorder,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::TemplateInvalid);
        assert!(recorder.commands.is_empty());
        assert_eq!(recorder.finished, 0);
    }

    #[test]
    fn executor_error_is_fatal_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(dir.path(), "a.csv", "x\n1\n2\n");
        let err = run_with_executor("echo {{.x}}", &path, &mut Broken).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalIoError);
    }

    #[test]
    fn dry_run_creates_no_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(dir.path(), "a.csv", "x\n1\n");
        let mut options =
            RunOptions::new(&path, TemplateSource::Inline("echo {{.x}}".to_string()));
        options.dry_run = true;
        options.log_dir = dir.path().to_path_buf();

        let summary = run(&options, &Defaults::default()).unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.log_file, None);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn real_run_writes_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(dir.path(), "items.json", r#"[{"n":1},{"n":2}]"#);
        let mut options = RunOptions::new(&path, TemplateSource::Inline("true {{.n}}".to_string()));
        options.log_dir = dir.path().to_path_buf();

        let summary = run(&options, &Defaults::default()).unwrap();

        let log_file = summary.log_file.unwrap();
        let name = log_file.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("xrun-items-"));
        let content = fs::read_to_string(&log_file).unwrap();
        assert_eq!(content.matches("Executing:").count(), 2);
    }

    #[test]
    fn log_is_not_created_when_data_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = RunOptions::new(
            dir.path().join("missing.csv"),
            TemplateSource::Inline("echo".to_string()),
        );
        options.log_dir = dir.path().to_path_buf();

        let err = run(&options, &Defaults::default()).unwrap_err();

        assert_eq!(err.code, ErrorCode::InputOpenFailed);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
