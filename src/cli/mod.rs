// src/cli/mod.rs
// CLI 模块导出

pub mod args;
pub mod colors;
pub mod output;

pub use args::CliArgs;
pub use colors::ColorSupport;
pub use output::OutputFormatter;
