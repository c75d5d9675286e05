//! 命令定义和实现

pub mod config;
pub mod run;

pub use config::{CliConfig, ConfigCommand};
pub use run::RunCommand;
