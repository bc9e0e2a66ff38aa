use std::path::PathBuf;

pub type CmdResult<T> = xrun::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    /// Explicit config file; built-in defaults when absent.
    pub config: Option<PathBuf>,
}

pub mod run;
pub mod version;
