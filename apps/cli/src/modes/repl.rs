//! REPL 模式（交互式 Shell）
//!
//! 专用输入线程读取命令行（rustyline，保留历史），经 crossbeam 通道交给主线程；
//! 另一个上报线程订阅计数更新并实时打印。

use crate::commands::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::{Receiver, bounded};
use rustyline::Editor;
use std::thread;
use thiserror::Error;
use vsim_driver::{CounterUpdate, Streamer, StreamerBuilder};
use vsim_protocol::{ProtocolError, SignalKind};

const HISTORY_FILE: &str = ".vsim_history";

/// 输入线程收到 Ctrl-C 时发送的占位命令
const INTERRUPT: &str = "SIGINT";

/// Shell 参数
#[derive(Args, Debug)]
pub struct ShellArgs {
    /// CAN 接口（覆盖配置；"mock" 使用内存总线）
    #[arg(short, long)]
    pub interface: Option<String>,

    /// 期望波特率（覆盖配置）
    #[arg(short, long)]
    pub bitrate: Option<u32>,

    /// 随机种子
    #[arg(long)]
    pub seed: Option<u64>,
}

/// 命令解析错误
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("未知命令: {0}")]
    UnknownCommand(String),

    #[error("'{0}' 需要信号名称（speed / engine / odometer）")]
    MissingSignal(&'static str),

    #[error(transparent)]
    InvalidSignal(#[from] ProtocolError),
}

/// Shell 命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Start,
    Stop,
    Enable(SignalKind),
    Disable(SignalKind),
    Toggle(SignalKind),
    Status,
    Help,
    Exit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, ShellError> {
        let mut parts = line.split_whitespace();
        let head = parts.next().unwrap_or_default();

        let signal = |name: &'static str, arg: Option<&str>| -> Result<SignalKind, ShellError> {
            Ok(arg.ok_or(ShellError::MissingSignal(name))?.parse()?)
        };

        match head {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "enable" => Ok(Self::Enable(signal("enable", parts.next())?)),
            "disable" => Ok(Self::Disable(signal("disable", parts.next())?)),
            "toggle" => Ok(Self::Toggle(signal("toggle", parts.next())?)),
            "status" => Ok(Self::Status),
            "help" => Ok(Self::Help),
            "exit" | "quit" => Ok(Self::Exit),
            other => Err(ShellError::UnknownCommand(other.to_string())),
        }
    }
}

/// REPL 会话（持有总线与调度器）
pub struct ReplSession {
    streamer: Streamer,
}

impl ReplSession {
    pub fn new(streamer: Streamer) -> Self {
        Self { streamer }
    }

    /// 执行一条命令；返回 false 表示退出
    pub fn handle(&mut self, command: ShellCommand) -> Result<bool> {
        match command {
            ShellCommand::Start => {
                self.streamer.start()?;
                println!("▶️  已开始发送");
            },
            ShellCommand::Stop => {
                if self.streamer.is_running() {
                    self.streamer.stop()?;
                    println!("⏹️  已停止");
                } else {
                    println!("⚠️  未在运行");
                }
            },
            ShellCommand::Enable(kind) => {
                self.streamer.set_enabled(kind, true);
                println!("✅ {} 已启用", kind);
            },
            ShellCommand::Disable(kind) => {
                self.streamer.set_enabled(kind, false);
                println!("✅ {} 已禁用", kind);
            },
            ShellCommand::Toggle(kind) => {
                let enabled = self.streamer.controls().toggle(kind);
                println!("✅ {} {}", kind, if enabled { "已启用" } else { "已禁用" });
            },
            ShellCommand::Status => self.print_status(),
            ShellCommand::Help => print_help(),
            ShellCommand::Exit => return Ok(false),
        }
        Ok(true)
    }

    fn print_status(&self) {
        let state = if self.streamer.is_running() {
            "running"
        } else {
            "stopped"
        };
        println!("📊 状态: {}", state);
        for kind in SignalKind::ALL {
            println!(
                "  {:<14} [{}] count={}",
                kind.name(),
                if self.streamer.is_enabled(kind) { "x" } else { " " },
                self.streamer.counter(kind)
            );
        }
        println!("  odometer value {}", self.streamer.odometer_value());
        println!("  {}", self.streamer.metrics());
    }

    /// 处理一行输入；错误只打印，不结束会话。返回 false 表示退出
    pub fn dispatch(&mut self, line: &str) -> bool {
        if line == INTERRUPT {
            if let Err(err) = self.interrupt() {
                eprintln!("❌ Error: {:#}", err);
            }
            return true;
        }

        let command = match ShellCommand::parse(line) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("❌ {}", err);
                eprintln!("💡 提示: 输入 'help' 查看所有命令");
                return true;
            },
        };

        match self.handle(command) {
            Ok(keep_going) => keep_going,
            Err(err) => {
                eprintln!("❌ Error: {:#}", err);
                true
            },
        }
    }

    /// 中断：停止发送但保持会话
    fn interrupt(&mut self) -> Result<()> {
        if self.streamer.is_running() {
            self.streamer.stop()?;
            eprintln!("\n🛑 已停止发送");
        }
        Ok(())
    }
}

/// REPL 输入（专用输入线程）
pub struct ReplInput {
    command_rx: Receiver<String>,
    _input_thread: thread::JoinHandle<Result<()>>,
}

impl ReplInput {
    pub fn new() -> Result<Self> {
        let (command_tx, command_rx) = bounded::<String>(10);

        // Editor 在输入线程内创建，生命周期与会话相同
        let input_thread = thread::Builder::new()
            .name("vsim-input".to_string())
            .spawn(move || {
                use rustyline::history::DefaultHistory;

                let mut rl = Editor::<(), DefaultHistory>::new()
                    .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;
                rl.load_history(HISTORY_FILE).ok(); // 首次运行没有历史

                loop {
                    match rl.readline("vsim> ") {
                        Ok(line) => {
                            let line = line.trim().to_string();
                            if line.is_empty() {
                                continue;
                            }
                            let _ = rl.add_history_entry(line.as_str());
                            if command_tx.send(line).is_err() {
                                break; // 主线程已退出
                            }
                        },
                        Err(rustyline::error::ReadlineError::Interrupted) => {
                            println!("^C");
                            let _ = command_tx.send(INTERRUPT.to_string());
                        },
                        Err(rustyline::error::ReadlineError::Eof) => break,
                        Err(err) => {
                            eprintln!("Error: {:?}", err);
                            break;
                        },
                    }
                }

                rl.save_history(HISTORY_FILE).ok();
                Ok(())
            })
            .context("创建输入线程失败")?;

        Ok(Self {
            command_rx,
            _input_thread: input_thread,
        })
    }

    /// 阻塞等待下一条命令；输入线程退出后返回 None
    pub fn recv_command(&self) -> Option<String> {
        self.command_rx.recv().ok()
    }
}

/// 运行 REPL 模式
pub fn run_repl(args: ShellArgs) -> Result<()> {
    let config = CliConfig::load()?;
    let interface = config.resolve_interface(args.interface.as_deref());
    let bitrate = config.resolve_bitrate(args.bitrate);

    let mut builder = StreamerBuilder::new()
        .interface(&interface)
        .bitrate(bitrate)
        .config(config.stream_config());
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    for kind in &config.signals {
        builder = builder.enable(*kind);
    }
    let streamer = builder
        .build()
        .with_context(|| format!("无法打开 CAN 接口 '{}'", interface))?;

    // 上报线程：订阅通道随 streamer 一起关闭
    let updates = streamer.subscribe();
    let printer = thread::Builder::new()
        .name("vsim-report".to_string())
        .spawn(move || {
            for update in updates {
                print_update(update);
            }
        })
        .context("创建上报线程失败")?;

    let mut session = ReplSession::new(streamer);
    let input = ReplInput::new()?;

    println!("vsim v{} - 交互式 Shell ({} @ {} bit/s)", env!("CARGO_PKG_VERSION"), interface, bitrate);
    println!("输入 'help' 查看帮助，'exit' 退出");
    println!();

    while let Some(line) = input.recv_command() {
        if !session.dispatch(&line) {
            break;
        }
    }

    // 停止并释放总线，上报通道随之断开
    drop(session);
    let _ = printer.join();
    println!("👋 再见！");
    Ok(())
}

fn print_update(update: CounterUpdate) {
    let label = match update.kind {
        SignalKind::VehicleSpeed => "Vehicle Speed",
        SignalKind::EngineSpeed => "Engine Speed",
        SignalKind::Odometer => "Odometer",
    };
    println!("📈 {} count: {}", label, update.count);
}

/// 打印帮助信息
fn print_help() {
    println!("可用命令:");
    println!("  start                         开始发送");
    println!("  stop                          停止发送");
    println!("  enable <signal>               启用信号");
    println!("  disable <signal>              禁用信号");
    println!("  toggle <signal>               切换信号");
    println!("  status                        显示状态与计数");
    println!("  help                          显示帮助");
    println!("  exit / quit                   退出");
    println!();
    println!("信号名称: speed | engine | odometer");
    println!();
    println!("快捷键:");
    println!("  Ctrl+C                        停止发送");
    println!("  Ctrl+D                        退出");
    println!();
}
