//! Test harness for CLI integration tests.
//!
//! Provides isolated project directories, manifest and notebook setup, and
//! CLI assertion helpers using `assert_cmd`.

mod command;
mod env;

// Re-export main types for external use
#[allow(unused_imports)]
pub use command::ExportCommand;
#[allow(unused_imports)]
pub use env::TestEnv;
