//! 运行模式
//!
//! One-shot 模式见 `commands::run`；这里是交互式 Shell。

pub mod repl;
