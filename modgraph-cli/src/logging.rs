//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现分阶段日志控制。日志写到 stderr 或文件，
//! stdout 只留给诊断输出。

use crate::config::LogConfig;
use modgraph_config::Phase;
use std::fs::File;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::{
    filter::Targets, fmt, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, Layer,
    Registry,
};

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

/// 按阶段构建过滤目标
pub fn targets(log_config: &LogConfig) -> Targets {
    [Phase::Scan, Phase::Resolve, Phase::Check]
        .into_iter()
        .fold(Targets::new().with_default(log_config.global), |targets, phase| {
            targets.with_target(phase.target(), log_config.level_for(phase))
        })
}

/// 使用指定格式和日志配置初始化日志系统
pub fn init(log_config: &LogConfig, format: LogFormat, file: Option<File>) -> Result<(), String> {
    let layer = match file {
        Some(file) => create_format_layer(format, Mutex::new(file)),
        None => create_format_layer(format, io::stderr),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(targets(log_config)))
        .try_init()
        .map_err(|e| e.to_string())
}

/// Create formatter layer based on format
fn create_format_layer<M>(format: LogFormat, make_writer: M) -> Box<dyn Layer<Registry> + Send + Sync>
where
    M: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_targets_respect_overrides() {
        let mut config = LogConfig::new(Level::WARN);
        config.apply_override("scan=trace").unwrap();
        let targets = targets(&config);

        assert!(targets.would_enable("modgraph::scan", &Level::TRACE));
        assert!(!targets.would_enable("modgraph::resolve", &Level::INFO));
        assert!(targets.would_enable("modgraph::check", &Level::WARN));
    }
}
