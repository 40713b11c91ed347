//! CLI command handlers, one file per command.

mod checksum;
mod completions;
mod fetch;
mod load;
mod resolve;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use fetch::{run_fetch, FetchArgs};
pub use load::run_load;
pub use resolve::run_resolve;
