// Public modules
pub mod defaults;
pub mod error;
pub mod executor;
pub mod logs;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod source;
pub mod template;

// Internal modules - not part of public API
pub(crate) mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use executor::{DispatchOutcome, Executor, Progress};
pub use output::{Diagnostic, RunSummary};
pub use pipeline::{RunOptions, TemplateSource};
pub use record::{Location, Record};
pub use template::Template;
