//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口，每个参数都可以由环境变量提供

use crate::config::MonitorSettings;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Quovarine Health Monitor - 部署健康检测工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "health-monitor",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 部署地址
    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        help = "部署地址，健康检查端点为 <URL>/api/health",
        env = "DEPLOYMENT_URL"
    )]
    pub deployment_url: Option<String>,

    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "TOML配置文件路径",
        env = "HEALTH_MONITOR_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 最大尝试次数
    #[arg(
        long,
        value_name = "COUNT",
        help = "最大尝试次数（默认5）",
        env = "HEALTH_MONITOR_MAX_RETRIES"
    )]
    pub max_retries: Option<u32>,

    /// 初始退避时间（秒）
    #[arg(
        long,
        value_name = "SECONDS",
        help = "初始退避时间（秒，默认2.0）",
        env = "HEALTH_MONITOR_INITIAL_BACKOFF"
    )]
    pub initial_backoff: Option<f64>,

    /// 最大退避时间（秒）
    #[arg(
        long,
        value_name = "SECONDS",
        help = "最大退避时间（秒，默认60.0）",
        env = "HEALTH_MONITOR_MAX_BACKOFF"
    )]
    pub max_backoff: Option<f64>,

    /// 请求超时时间（秒）
    #[arg(
        short,
        long,
        value_name = "SECONDS",
        help = "请求超时时间（秒，默认10）",
        env = "HEALTH_MONITOR_TIMEOUT"
    )]
    pub timeout: Option<u64>,

    /// 诊断日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "warn",
        help = "诊断日志级别（输出到标准错误）",
        env = "HEALTH_MONITOR_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// 诊断日志格式
    #[arg(
        long,
        value_enum,
        default_value = "text",
        help = "诊断日志格式",
        env = "HEALTH_MONITOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// 以缩进格式输出事件
    #[arg(long, help = "以缩进格式输出JSON事件")]
    pub pretty: bool,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

/// 诊断日志格式
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogFormat {
    /// 纯文本
    Text,
    /// 每行一个JSON对象
    Json,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl Args {
    /// 用命令行和环境变量中给出的值覆盖设置
    ///
    /// 未给出的参数保持设置中原有的值（配置文件或默认值）。
    pub fn apply_to(&self, settings: &mut MonitorSettings) {
        if let Some(url) = &self.deployment_url {
            settings.deployment_url = Some(url.clone());
        }
        if let Some(max_retries) = self.max_retries {
            settings.max_retries = max_retries;
        }
        if let Some(initial_backoff) = self.initial_backoff {
            settings.initial_backoff_seconds = initial_backoff;
        }
        if let Some(max_backoff) = self.max_backoff {
            settings.max_backoff_seconds = max_backoff;
        }
        if let Some(timeout) = self.timeout {
            settings.request_timeout_seconds = timeout;
        }
    }
}
