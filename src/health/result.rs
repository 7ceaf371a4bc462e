//! 健康检测结果数据结构
//!
//! 单次检测的结果是一个带标签的枚举：健康，或带有分类原因的不健康。

use crate::event::LogEvent;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::time::Duration;

/// 事件中保留的响应体最大字符数
pub const BODY_SNIPPET_CHARS: usize = 200;

/// 不健康的原因分类
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    /// 请求超时
    Timeout { limit: Duration },
    /// 连接失败（DNS、拒绝连接、TLS握手等）
    Connection { error: String },
    /// 状态码不是200
    NonSuccessStatus { status_code: u16, body_snippet: String },
    /// 200响应但响应体不是合法JSON
    MalformedResponse {
        status_code: u16,
        error: String,
        body_snippet: String,
    },
    /// 其他意外错误
    Unexpected { error: String },
}

impl FailureCause {
    /// 原因类别名称，用于事件数据
    pub fn category(&self) -> &'static str {
        match self {
            FailureCause::Timeout { .. } => "timeout",
            FailureCause::Connection { .. } => "connection_error",
            FailureCause::NonSuccessStatus { .. } => "non_success_status",
            FailureCause::MalformedResponse { .. } => "malformed_response",
            FailureCause::Unexpected { .. } => "unexpected_error",
        }
    }
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::Timeout { limit } => {
                write!(f, "Request timeout after {}s", limit.as_secs_f64())
            }
            FailureCause::Connection { error } => write!(f, "Connection error: {error}"),
            FailureCause::NonSuccessStatus { status_code, .. } => {
                let reason = reqwest::StatusCode::from_u16(*status_code)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown");
                write!(f, "HTTP {status_code} {reason}")
            }
            FailureCause::MalformedResponse { error, .. } => {
                write!(f, "Malformed response: {error}")
            }
            FailureCause::Unexpected { error } => write!(f, "Unexpected error: {error}"),
        }
    }
}

/// 单次检测的健康状态
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    /// 200响应且响应体为合法JSON
    Healthy { status_code: u16, body: Value },
    /// 不健康
    Unhealthy(FailureCause),
}

impl HealthStatus {
    /// 判断状态是否为健康
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy { .. })
    }
}

/// 单次检测结果，每次尝试新建，不做保留
#[derive(Debug, Clone)]
pub struct AttemptResult {
    /// 健康状态
    pub status: HealthStatus,
    /// 检测时间戳
    pub timestamp: DateTime<Utc>,
    /// 响应时间
    pub response_time: Duration,
}

impl AttemptResult {
    /// 创建新的检测结果
    pub fn new(status: HealthStatus, response_time: Duration) -> Self {
        Self {
            status,
            timestamp: Utc::now(),
            response_time,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// HTTP状态码（如果收到了响应）
    pub fn status_code(&self) -> Option<u16> {
        match &self.status {
            HealthStatus::Healthy { status_code, .. } => Some(*status_code),
            HealthStatus::Unhealthy(FailureCause::NonSuccessStatus { status_code, .. })
            | HealthStatus::Unhealthy(FailureCause::MalformedResponse { status_code, .. }) => {
                Some(*status_code)
            }
            HealthStatus::Unhealthy(_) => None,
        }
    }

    /// 响应体片段（仅失败时保留）
    pub fn body_snippet(&self) -> Option<&str> {
        match &self.status {
            HealthStatus::Unhealthy(FailureCause::NonSuccessStatus { body_snippet, .. })
            | HealthStatus::Unhealthy(FailureCause::MalformedResponse { body_snippet, .. }) => {
                Some(body_snippet.as_str())
            }
            _ => None,
        }
    }

    /// 错误描述
    pub fn error(&self) -> Option<String> {
        match &self.status {
            HealthStatus::Healthy { .. } => None,
            HealthStatus::Unhealthy(cause) => Some(cause.to_string()),
        }
    }

    /// 获取响应时间（毫秒）
    pub fn response_time_ms(&self) -> u64 {
        self.response_time.as_millis() as u64
    }

    /// 生成概括本次检测结果的事件
    pub fn to_event(&self) -> LogEvent {
        match &self.status {
            HealthStatus::Healthy { body, .. } => {
                LogEvent::info("Health check passed").with_data(body.clone())
            }
            HealthStatus::Unhealthy(cause) => {
                let category = cause.category();
                match cause {
                    FailureCause::Timeout { limit } => LogEvent::error("Health check timed out")
                        .with_data(json!({
                            "cause": category,
                            "timeout_seconds": limit.as_secs_f64(),
                        })),
                    FailureCause::Connection { error } => {
                        LogEvent::error("Connection error during health check").with_data(json!({
                            "cause": category,
                            "error": error,
                        }))
                    }
                    FailureCause::NonSuccessStatus {
                        status_code,
                        body_snippet,
                    } => LogEvent::error(format!("Health check failed with status {status_code}"))
                        .with_data(json!({
                            "cause": category,
                            "status_code": status_code,
                            "response": body_snippet,
                        })),
                    FailureCause::MalformedResponse {
                        status_code,
                        error,
                        body_snippet,
                    } => LogEvent::error("Malformed health check response").with_data(json!({
                        "cause": category,
                        "status_code": status_code,
                        "error": error,
                        "response": body_snippet,
                    })),
                    FailureCause::Unexpected { error } => {
                        LogEvent::error("Unexpected error during health check").with_data(json!({
                            "cause": category,
                            "error": error,
                        }))
                    }
                }
            }
        }
    }
}

/// 截取响应体前 [`BODY_SNIPPET_CHARS`] 个字符
pub fn body_snippet(text: &str) -> String {
    text.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLevel;

    fn unhealthy(cause: FailureCause) -> AttemptResult {
        AttemptResult::new(HealthStatus::Unhealthy(cause), Duration::from_millis(20))
    }

    #[test]
    fn test_healthy_result() {
        let result = AttemptResult::new(
            HealthStatus::Healthy {
                status_code: 200,
                body: json!({"status": "ok", "db": "up"}),
            },
            Duration::from_millis(150),
        );

        assert!(result.is_healthy());
        assert_eq!(result.status_code(), Some(200));
        assert_eq!(result.body_snippet(), None);
        assert_eq!(result.error(), None);
        assert_eq!(result.response_time_ms(), 150);

        let event = result.to_event();
        assert_eq!(event.level, EventLevel::Info);
        assert_eq!(event.message, "Health check passed");
        assert_eq!(event.data, Some(json!({"status": "ok", "db": "up"})));
    }

    #[test]
    fn test_non_success_status_event() {
        let result = unhealthy(FailureCause::NonSuccessStatus {
            status_code: 503,
            body_snippet: "Service Unavailable".to_string(),
        });

        assert!(!result.is_healthy());
        assert_eq!(result.status_code(), Some(503));
        assert_eq!(result.body_snippet(), Some("Service Unavailable"));
        assert_eq!(
            result.error().as_deref(),
            Some("HTTP 503 Service Unavailable")
        );

        let event = result.to_event();
        assert_eq!(event.level, EventLevel::Error);
        assert_eq!(event.message, "Health check failed with status 503");
        let data = event.data.unwrap();
        assert_eq!(data["status_code"], 503);
        assert_eq!(data["cause"], "non_success_status");
        assert_eq!(data["response"], "Service Unavailable");
    }

    #[test]
    fn test_timeout_event() {
        let result = unhealthy(FailureCause::Timeout {
            limit: Duration::from_secs(10),
        });

        assert_eq!(result.status_code(), None);
        let event = result.to_event();
        assert_eq!(event.message, "Health check timed out");
        assert_eq!(event.data.unwrap()["timeout_seconds"], 10.0);
    }

    #[test]
    fn test_failure_event_messages() {
        let cases = [
            (
                FailureCause::Connection {
                    error: "refused".to_string(),
                },
                "Connection error during health check",
                "connection_error",
            ),
            (
                FailureCause::MalformedResponse {
                    status_code: 200,
                    error: "expected value".to_string(),
                    body_snippet: "<html>".to_string(),
                },
                "Malformed health check response",
                "malformed_response",
            ),
            (
                FailureCause::Unexpected {
                    error: "boom".to_string(),
                },
                "Unexpected error during health check",
                "unexpected_error",
            ),
        ];

        for (cause, message, category) in cases {
            let event = unhealthy(cause).to_event();
            assert_eq!(event.level, EventLevel::Error);
            assert_eq!(event.message, message);
            assert_eq!(event.data.unwrap()["cause"], category);
        }
    }

    #[test]
    fn test_body_snippet_truncates_on_char_boundary() {
        let long = "é".repeat(500);
        let snippet = body_snippet(&long);
        assert_eq!(snippet.chars().count(), BODY_SNIPPET_CHARS);

        assert_eq!(body_snippet("short"), "short");
    }
}
