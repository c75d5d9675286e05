//! 运行命令
//!
//! 打开总线，启用选定信号并开始发送，到达时长或收到 Ctrl-C 后停止，
//! 最后打印各信号的计数。

use super::config::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::{RecvTimeoutError, bounded};
use std::time::Duration;
use tracing::info;
use vsim_driver::StreamerBuilder;
use vsim_protocol::SignalKind;

/// 运行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// CAN 接口（覆盖配置；"mock" 使用内存总线）
    #[arg(short, long)]
    pub interface: Option<String>,

    /// 期望波特率（覆盖配置）
    #[arg(short, long)]
    pub bitrate: Option<u32>,

    /// 发送车速帧
    #[arg(long)]
    pub speed: bool,

    /// 发送发动机转速帧
    #[arg(long)]
    pub engine: bool,

    /// 发送里程帧
    #[arg(long)]
    pub odometer: bool,

    /// 发送全部信号
    #[arg(long)]
    pub all: bool,

    /// 运行时长（毫秒）；缺省时一直运行到 Ctrl-C
    #[arg(short, long)]
    pub duration_ms: Option<u64>,

    /// 随机种子（可复现的车速 / 转速序列）
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunCommand {
    /// 命令行选择的信号；一个都没选时为 None
    fn selected_signals(&self) -> Option<Vec<SignalKind>> {
        if self.all {
            return Some(SignalKind::ALL.to_vec());
        }
        let flags = [
            (SignalKind::VehicleSpeed, self.speed),
            (SignalKind::EngineSpeed, self.engine),
            (SignalKind::Odometer, self.odometer),
        ];
        let kinds: Vec<SignalKind> = flags.iter().filter(|(_, on)| *on).map(|(k, _)| *k).collect();
        (!kinds.is_empty()).then_some(kinds)
    }

    pub fn execute(self) -> Result<()> {
        let config = CliConfig::load()?;
        let interface = config.resolve_interface(self.interface.as_deref());
        let bitrate = config.resolve_bitrate(self.bitrate);
        let signals = self.selected_signals().unwrap_or_else(|| config.signals.clone());

        let mut builder = StreamerBuilder::new()
            .interface(&interface)
            .bitrate(bitrate)
            .config(config.stream_config());
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        for kind in &signals {
            builder = builder.enable(*kind);
        }

        let mut streamer = builder
            .build()
            .with_context(|| format!("无法打开 CAN 接口 '{}'", interface))?;

        let enabled = streamer.enabled_kinds();
        if enabled.is_empty() {
            println!("⚠️  未启用任何信号（使用 --speed / --engine / --odometer / --all）");
        } else {
            let names: Vec<&str> = enabled.iter().map(|k| k.name()).collect();
            println!("📡 signals: {}", names.join(", "));
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        ctrlc::set_handler(move || {
            let _ = stop_tx.try_send(());
        })
        .context("安装 Ctrl-C 处理器失败")?;

        streamer.start()?;
        println!("▶️  Streaming on {} ({} bit/s)", interface, bitrate);

        match self.duration_ms {
            Some(ms) => match stop_rx.recv_timeout(Duration::from_millis(ms)) {
                Ok(()) => info!("Interrupted"),
                Err(RecvTimeoutError::Timeout) => info!("Run duration elapsed"),
                Err(RecvTimeoutError::Disconnected) => {},
            },
            None => {
                let _ = stop_rx.recv();
                info!("Interrupted");
            },
        }

        streamer.stop()?;

        println!("⏹️  Stopped");
        for kind in SignalKind::ALL {
            println!("  {:<14} {}", kind.name(), streamer.counter(kind));
        }
        if streamer.counter(SignalKind::Odometer) > 0 {
            println!("  odometer value {}", streamer.odometer_value());
        }

        println!("  {}", streamer.metrics());
        Ok(())
    }
}
