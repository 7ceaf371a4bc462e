//! Quovarine Health Monitor - 部署健康检测工具
//!
//! 对一个部署地址的健康检查端点进行轮询：
//! - 单次HTTP GET检测（带超时）
//! - 指数退避重试
//! - 结构化JSON事件输出
//! - 以退出码报告最终结果

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod health;
pub mod logging;

// 重新导出主要类型
pub use config::{MonitorConfig, MonitorSettings};
pub use error::{ConfigError, MonitorError};
pub use event::{EventLevel, EventLogger, LogEvent};
pub use health::{
    AttemptResult, BackoffPolicy, FailureCause, HealthChecker, HealthStatus, HttpHealthChecker,
    RetryRunner,
};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// 健康检测请求使用的User-Agent
pub const USER_AGENT: &str = "Quovarine-Health-Monitor/1.0";

/// 健康检查端点路径
pub const HEALTH_PATH: &str = "/api/health";
