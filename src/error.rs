//! 错误处理模块
//!
//! 定义应用程序的统一错误类型。单次检测的失败原因不在这里，
//! 见 [`crate::health::FailureCause`]。

use thiserror::Error;

/// 健康监控程序的主要错误类型
#[derive(Error, Debug)]
pub enum MonitorError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// HTTP客户端构建失败
    #[error("HTTP客户端初始化失败: {0}")]
    Client(#[from] reqwest::Error),

    /// 所有检测尝试均失败
    #[error("健康检测在 {attempts} 次尝试后仍未通过")]
    RetriesExhausted { attempts: u32 },
}

/// 配置错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 未提供部署地址
    #[error("DEPLOYMENT_URL environment variable not set")]
    MissingUrl,

    /// 部署地址无法解析
    #[error("无效的部署地址 {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    Validation(String),

    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    Parse(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVar { var: String },
}

impl MonitorError {
    /// 是否属于启动阶段的配置错误（立即退出，不做任何检测）
    pub fn is_config_error(&self) -> bool {
        matches!(self, MonitorError::Config(_))
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, MonitorError>;
