//! Hook command runners
//!
//! - [`ProcessRunner`] - runs commands as OS processes (production)
//! - [`MockRunner`] - scripted results for tests

mod mock;
mod process;
mod traits;

pub use mock::{MockRunner, MockScript};
pub use process::{DEFAULT_KILL_GRACE, ProcessRunner, ShellConfig};
pub use traits::CommandRunner;
