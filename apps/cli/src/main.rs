//! # vsim
//!
//! 仿真车辆遥测发送器（车速 / 发动机转速 / 里程）。
//!
//! ## 两种模式
//!
//! ### One-shot 模式（适合脚本）
//!
//! ```bash
//! # 配置默认接口
//! vsim config set --interface can0
//!
//! # 发送里程帧 5 秒后退出
//! vsim run --odometer --duration-ms 5000
//! ```
//!
//! ### REPL 模式（交互调试）
//!
//! ```bash
//! $ vsim shell --interface vcan0
//! vsim> enable odometer
//! vsim> start
//! vsim> toggle speed
//! vsim> stop
//! vsim> exit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod modes;

use commands::{ConfigCommand, RunCommand};
use modes::repl::{ShellArgs, run_repl};

/// vsim - 车辆遥测 CAN 仿真工具
#[derive(Parser, Debug)]
#[command(name = "vsim")]
#[command(about = "Stream simulated vehicle telemetry onto a CAN bus", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 发送选定的信号，直到超时或 Ctrl-C
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell {
        #[command(flatten)]
        args: ShellArgs,
    },
}

fn main() -> Result<()> {
    // 日志输出到 stderr，stdout 留给命令结果
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("vsim=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => cmd.execute(),
        Commands::Run { args } => args.execute(),
        Commands::Shell { args } => run_repl(args),
    }
}
