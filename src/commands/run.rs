use clap::Args;
use std::path::PathBuf;

use xrun::defaults;
use xrun::pipeline::{self, RunOptions, TemplateSource};
use xrun::Error;

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to the data file (CSV/JSON/JSONL)
    #[arg(short = 'd', long = "data", value_name = "FILE", required = true)]
    pub data: Option<PathBuf>,

    /// Command template to execute for each record
    #[arg(short = 'e', long = "exec", value_name = "TEMPLATE", group = "template")]
    pub exec: Option<String>,

    /// Read the command template from a file
    #[arg(short = 'f', long = "template-file", value_name = "FILE", group = "template")]
    pub template_file: Option<PathBuf>,

    /// Print commands to stdout instead of executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Skip logging execution output to files
    #[arg(long)]
    pub no_log_files: bool,
}

impl RunArgs {
    pub fn into_options(self) -> xrun::Result<RunOptions> {
        let data = self
            .data
            .ok_or_else(|| Error::validation_missing_argument(vec!["-d".to_string()]))?;

        let template = match (self.exec, self.template_file) {
            (Some(text), None) => TemplateSource::Inline(text),
            (None, Some(path)) => TemplateSource::File(path),
            (None, None) => {
                return Err(Error::validation_missing_argument(vec![
                    "-e".to_string(),
                    "-f".to_string(),
                ]))
            }
            (Some(_), Some(_)) => {
                return Err(Error::validation_invalid_argument(
                    "template",
                    "-e and -f cannot be used together",
                ))
            }
        };

        let mut options = RunOptions::new(data, template);
        options.dry_run = self.dry_run;
        options.no_log_files = self.no_log_files;
        Ok(options)
    }
}

pub fn run(args: RunArgs, global: &GlobalArgs) -> CmdResult<()> {
    let defaults = defaults::load_config(global.config.as_deref())?;
    let options = args.into_options()?;

    let summary = pipeline::run(&options, &defaults)?;
    tracing::debug!(?summary, "run finished");

    Ok(((), 0))
}
