//! CLI command handlers. Each command is in its own file.

mod config;
mod inspect;
mod run;

pub use config::run_config;
pub use inspect::run_inspect;
pub use run::{run_batch, RunArgs};
