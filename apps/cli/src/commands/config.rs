//! 配置管理命令
//!
//! 默认配置文件：`<config_dir>/vsim/config.toml`，可用环境变量 `VSIM_CONFIG`
//! 指向其他文件。命令行参数始终优先于文件中的值。

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use vsim_driver::{DEFAULT_BITRATE, DEFAULT_INTERFACE, StreamConfig};
use vsim_protocol::SignalKind;

/// 覆盖配置文件路径的环境变量
pub const CONFIG_ENV: &str = "VSIM_CONFIG";

/// 配置文件路径
pub fn config_file() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("vsim");
    path.push("config.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 默认 CAN 接口
    pub interface: Option<String>,

    /// 期望波特率
    pub bitrate: Option<u32>,

    /// 发送周期（毫秒）
    pub tick_interval_ms: Option<u64>,

    /// 单帧发送超时（毫秒），0 表示不设超时
    pub send_timeout_ms: Option<u64>,

    /// 启动时默认启用的信号
    pub signals: Vec<SignalKind>,
}

impl CliConfig {
    /// 加载配置（文件不存在时返回默认配置）
    pub fn load() -> Result<Self> {
        let path = config_file()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 保存配置
    pub fn save(&self) -> Result<()> {
        let path = config_file()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("创建配置目录失败")?;
        }

        let body = toml::to_string_pretty(self).context("序列化配置失败")?;
        let content = format!("# vsim configuration\n\n{}", body);
        fs::write(&path, content).context("写入配置文件失败")?;
        Ok(())
    }

    /// 接口名（命令行参数优先）
    pub fn resolve_interface(&self, cli: Option<&str>) -> String {
        cli.or(self.interface.as_deref())
            .unwrap_or(DEFAULT_INTERFACE)
            .to_string()
    }

    /// 波特率（命令行参数优先）
    pub fn resolve_bitrate(&self, cli: Option<u32>) -> u32 {
        cli.or(self.bitrate).unwrap_or(DEFAULT_BITRATE)
    }

    /// 合并文件中的循环参数
    pub fn stream_config(&self) -> StreamConfig {
        let mut config = StreamConfig::default();
        if let Some(ms) = self.tick_interval_ms {
            config.tick_interval = Duration::from_millis(ms);
        }
        match self.send_timeout_ms {
            Some(0) => config.send_timeout = None,
            Some(ms) => config.send_timeout = Some(Duration::from_millis(ms)),
            None => {},
        }
        config
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// CAN 接口名称（如 can0, vcan0, mock）
        #[arg(short, long)]
        interface: Option<String>,

        /// 期望波特率
        #[arg(short, long)]
        bitrate: Option<u32>,

        /// 发送周期（毫秒）
        #[arg(long)]
        tick_interval_ms: Option<u64>,

        /// 单帧发送超时（毫秒），0 表示不设超时
        #[arg(long)]
        send_timeout_ms: Option<u64>,

        /// 默认启用的信号（逗号分隔，如 speed,odometer）
        #[arg(long, value_delimiter = ',')]
        signals: Option<Vec<SignalKind>>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称
        #[arg(default_value = "all")]
        key: String,
    },

    /// 打印配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Set {
                interface,
                bitrate,
                tick_interval_ms,
                send_timeout_ms,
                signals,
            } => Self::set_(interface, bitrate, tick_interval_ms, send_timeout_ms, signals),

            ConfigCommand::Get { key } => Self::get_(&key),

            ConfigCommand::Path => {
                println!("{}", config_file()?.display());
                Ok(())
            },
        }
    }

    fn set_(
        interface: Option<String>,
        bitrate: Option<u32>,
        tick_interval_ms: Option<u64>,
        send_timeout_ms: Option<u64>,
        signals: Option<Vec<SignalKind>>,
    ) -> Result<()> {
        let mut config = CliConfig::load()?;

        if let Some(iface) = interface {
            println!("✅ interface = {}", iface);
            config.interface = Some(iface);
        }
        if let Some(b) = bitrate {
            println!("✅ bitrate = {}", b);
            config.bitrate = Some(b);
        }
        if let Some(ms) = tick_interval_ms {
            anyhow::ensure!(ms > 0, "tick_interval_ms 必须大于 0");
            println!("✅ tick_interval_ms = {}", ms);
            config.tick_interval_ms = Some(ms);
        }
        if let Some(ms) = send_timeout_ms {
            println!("✅ send_timeout_ms = {}", ms);
            config.send_timeout_ms = Some(ms);
        }
        if let Some(mut kinds) = signals {
            kinds.sort_by_key(|k| k.index());
            kinds.dedup();
            println!("✅ signals = {}", format_signals(&kinds));
            config.signals = kinds;
        }

        config.save()
    }

    fn get_(key: &str) -> Result<()> {
        let config = CliConfig::load()?;

        match key {
            "interface" => println!("{}", config.resolve_interface(None)),
            "bitrate" => println!("{}", config.resolve_bitrate(None)),
            "tick_interval_ms" => {
                println!("{}", config.stream_config().tick_interval.as_millis())
            },
            "send_timeout_ms" => match config.stream_config().send_timeout {
                Some(t) => println!("{}", t.as_millis()),
                None => println!("0"),
            },
            "signals" => println!("{}", format_signals(&config.signals)),
            "all" => {
                let stream = config.stream_config();
                println!("vsim 配置:");
                println!("  interface:        {}", config.resolve_interface(None));
                println!("  bitrate:          {}", config.resolve_bitrate(None));
                println!("  tick_interval_ms: {}", stream.tick_interval.as_millis());
                println!(
                    "  send_timeout_ms:  {}",
                    stream.send_timeout.map_or(0, |t| t.as_millis())
                );
                println!("  signals:          {}", format_signals(&config.signals));
            },
            other => anyhow::bail!("未知配置项: {}", other),
        }

        Ok(())
    }
}

fn format_signals(kinds: &[SignalKind]) -> String {
    if kinds.is_empty() {
        return "(none)".to_string();
    }
    kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(",")
}
