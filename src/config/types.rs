//! 配置数据结构定义
//!
//! `MonitorSettings` 是各配置来源合并时使用的原始设置，
//! `MonitorConfig` 是验证后交给检测器的不可变配置。

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 原始配置设置（配置文件、命令行和环境变量合并后的结果）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MonitorSettings {
    /// 部署地址
    #[serde(default)]
    pub deployment_url: Option<String>,
    /// 最大尝试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// 初始退避时间（秒）
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_seconds: f64,
    /// 最大退避时间（秒）
    #[serde(default = "default_max_backoff")]
    pub max_backoff_seconds: f64,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            deployment_url: None,
            max_retries: default_max_retries(),
            initial_backoff_seconds: default_initial_backoff(),
            max_backoff_seconds: default_max_backoff(),
            request_timeout_seconds: default_timeout(),
        }
    }
}

// 默认值函数
fn default_max_retries() -> u32 {
    5
}
fn default_initial_backoff() -> f64 {
    2.0
}
fn default_max_backoff() -> f64 {
    60.0
}
fn default_timeout() -> u64 {
    10
}

/// 验证后的监控配置，构造后不可变
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    deployment_url: String,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    request_timeout: Duration,
}

impl MonitorConfig {
    /// 从原始设置构建并验证配置
    ///
    /// # 参数
    /// * `settings` - 合并后的原始设置
    ///
    /// # 返回
    /// * `Result<Self, ConfigError>` - 验证通过的配置
    pub fn from_settings(settings: MonitorSettings) -> Result<Self, ConfigError> {
        let raw_url = settings
            .deployment_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingUrl)?;

        let deployment_url = raw_url.trim_end_matches('/').to_string();
        validate_url(&deployment_url)?;

        let initial_backoff =
            seconds_to_duration("initial_backoff_seconds", settings.initial_backoff_seconds)?;
        let max_backoff = seconds_to_duration("max_backoff_seconds", settings.max_backoff_seconds)?;

        if settings.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation("请求超时时间不能为0".to_string()));
        }

        Ok(Self {
            deployment_url,
            max_retries: settings.max_retries,
            initial_backoff,
            max_backoff,
            request_timeout: Duration::from_secs(settings.request_timeout_seconds),
        })
    }

    /// 部署地址（已去除末尾的 `/`）
    pub fn deployment_url(&self) -> &str {
        &self.deployment_url
    }

    /// 健康检查端点完整地址
    pub fn health_endpoint(&self) -> String {
        format!("{}{}", self.deployment_url, crate::HEALTH_PATH)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("不支持的协议: {other}"),
        }),
    }
}

fn seconds_to_duration(field: &str, seconds: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| ConfigError::Validation(format!("{field} 必须是非负的有限数值，实际为 {seconds}")))
}
