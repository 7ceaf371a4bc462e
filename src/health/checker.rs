//! HTTP健康检测器实现
//!
//! 对健康检查端点发起一次带超时的GET请求，并把结果归类为健康或不健康。

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::event::EventLogger;
use crate::health::result::{body_snippet, AttemptResult, FailureCause, HealthStatus};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// 健康检测器trait，定义单次检测接口
#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// 执行一次健康检测
    ///
    /// 每次调用都会写出一条概括检测结果的事件。所有失败都归入
    /// [`HealthStatus::Unhealthy`]，不会以错误的形式返回。
    async fn check_once(&self) -> AttemptResult;

    /// 被检测的端点地址
    fn endpoint(&self) -> &str;
}

/// HTTP健康检测器实现
pub struct HttpHealthChecker {
    /// HTTP客户端
    client: Client,
    /// 健康检查端点
    endpoint: String,
    /// 单次检测超时时间
    timeout: Duration,
    /// 事件输出
    events: EventLogger,
}

impl HttpHealthChecker {
    /// 创建新的HTTP健康检测器
    ///
    /// # 参数
    /// * `config` - 监控配置
    /// * `events` - 事件输出
    ///
    /// # 返回
    /// * `Result<Self>` - 检测器实例
    pub fn new(config: &MonitorConfig, events: EventLogger) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(crate::USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.health_endpoint(),
            timeout: config.request_timeout(),
            events,
        })
    }

    /// 发送请求并归类响应
    async fn probe(&self) -> HealthStatus {
        let response = match self.client.get(&self.endpoint).send().await {
            Ok(response) => response,
            Err(e) => return HealthStatus::Unhealthy(self.classify_request_error(&e)),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return HealthStatus::Unhealthy(self.classify_request_error(&e)),
        };

        if status != StatusCode::OK {
            return HealthStatus::Unhealthy(FailureCause::NonSuccessStatus {
                status_code: status.as_u16(),
                body_snippet: body_snippet(&text),
            });
        }

        match serde_json::from_str(&text) {
            Ok(body) => HealthStatus::Healthy {
                status_code: status.as_u16(),
                body,
            },
            Err(e) => HealthStatus::Unhealthy(FailureCause::MalformedResponse {
                status_code: status.as_u16(),
                error: e.to_string(),
                body_snippet: body_snippet(&text),
            }),
        }
    }

    /// 将请求错误归类为失败原因
    fn classify_request_error(&self, error: &reqwest::Error) -> FailureCause {
        if error.is_timeout() {
            FailureCause::Timeout {
                limit: self.timeout,
            }
        } else if error.is_connect() {
            FailureCause::Connection {
                error: error_chain(error),
            }
        } else {
            FailureCause::Unexpected {
                error: error_chain(error),
            }
        }
    }
}

#[async_trait]
impl HealthChecker for HttpHealthChecker {
    async fn check_once(&self) -> AttemptResult {
        let start_time = Instant::now();

        // 整个请求（包括读取响应体）都受超时约束
        let status = match timeout(self.timeout, self.probe()).await {
            Ok(status) => status,
            Err(_) => HealthStatus::Unhealthy(FailureCause::Timeout {
                limit: self.timeout,
            }),
        };

        let result = AttemptResult::new(status, start_time.elapsed());
        debug!(
            "检测完成: {} healthy={} status_code={:?} 耗时{}ms",
            self.endpoint,
            result.is_healthy(),
            result.status_code(),
            result.response_time_ms()
        );

        self.events.emit(result.to_event());
        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// 拼接错误及其全部来源，reqwest 的顶层错误信息通常不含具体原因
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorSettings;
    use crate::event::test_support::capture;
    use std::net::TcpListener;

    fn create_test_config(url: &str, timeout_seconds: u64) -> MonitorConfig {
        MonitorConfig::from_settings(MonitorSettings {
            deployment_url: Some(url.to_string()),
            request_timeout_seconds: timeout_seconds,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_checker_creation() {
        let (events, _) = capture();
        let config = create_test_config("https://deploy.example.com/", 10);
        let checker = HttpHealthChecker::new(&config, events).unwrap();
        assert_eq!(checker.endpoint(), "https://deploy.example.com/api/health");
    }

    #[tokio::test]
    async fn test_healthy_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/health")
            .match_header("user-agent", "Quovarine-Health-Monitor/1.0")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"healthy","version":"1.4.2"}"#)
            .create_async()
            .await;

        let (events, buffer) = capture();
        let checker = HttpHealthChecker::new(&create_test_config(&server.url(), 5), events).unwrap();
        let result = checker.check_once().await;

        mock.assert_async().await;
        assert!(result.is_healthy());
        assert_eq!(result.status_code(), Some(200));

        let logged = buffer.events();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0]["level"], "INFO");
        assert_eq!(logged[0]["message"], "Health check passed");
        assert_eq!(logged[0]["data"]["version"], "1.4.2");
    }

    #[tokio::test]
    async fn test_any_json_body_is_healthy() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body(r#"["degraded", false]"#)
            .create_async()
            .await;

        let (events, _) = capture();
        let checker = HttpHealthChecker::new(&create_test_config(&server.url(), 5), events).unwrap();
        let result = checker.check_once().await;

        assert!(result.is_healthy());
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/health")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let (events, buffer) = capture();
        let checker = HttpHealthChecker::new(&create_test_config(&server.url(), 5), events).unwrap();
        let result = checker.check_once().await;

        assert!(!result.is_healthy());
        assert_eq!(result.status_code(), Some(503));
        assert_eq!(result.body_snippet(), Some("upstream unavailable"));

        let logged = buffer.events();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0]["level"], "ERROR");
        assert_eq!(logged[0]["message"], "Health check failed with status 503");
        assert_eq!(logged[0]["data"]["status_code"], 503);
        assert_eq!(logged[0]["data"]["response"], "upstream unavailable");
    }

    #[tokio::test]
    async fn test_not_found_is_unhealthy() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/health")
            .with_status(404)
            .create_async()
            .await;

        let (events, _) = capture();
        let checker = HttpHealthChecker::new(&create_test_config(&server.url(), 5), events).unwrap();
        let result = checker.check_once().await;

        assert_eq!(
            result.status,
            HealthStatus::Unhealthy(FailureCause::NonSuccessStatus {
                status_code: 404,
                body_snippet: String::new(),
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let (events, buffer) = capture();
        let checker = HttpHealthChecker::new(&create_test_config(&server.url(), 5), events).unwrap();
        let result = checker.check_once().await;

        assert!(matches!(
            result.status,
            HealthStatus::Unhealthy(FailureCause::MalformedResponse {
                status_code: 200,
                ..
            })
        ));
        assert_eq!(buffer.messages(), vec!["Malformed health check response"]);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // 绑定后立即释放，得到一个没有监听者的端口
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let (events, buffer) = capture();
        let config = create_test_config(&format!("http://127.0.0.1:{port}"), 5);
        let checker = HttpHealthChecker::new(&config, events).unwrap();
        let result = checker.check_once().await;

        assert!(matches!(
            result.status,
            HealthStatus::Unhealthy(FailureCause::Connection { .. })
        ));
        assert_eq!(result.status_code(), None);
        assert_eq!(
            buffer.messages(),
            vec!["Connection error during health check"]
        );
    }

    #[tokio::test]
    async fn test_timeout_handling() {
        // 连接会被内核接受，但永远不会有响应
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let (events, buffer) = capture();
        let config = create_test_config(&format!("http://{addr}"), 1);
        let checker = HttpHealthChecker::new(&config, events).unwrap();
        let result = checker.check_once().await;

        assert_eq!(
            result.status,
            HealthStatus::Unhealthy(FailureCause::Timeout {
                limit: Duration::from_secs(1)
            })
        );
        assert_eq!(buffer.messages(), vec!["Health check timed out"]);
        drop(listener);
    }

    #[derive(Debug, thiserror::Error)]
    #[error("error sending request")]
    struct SendError(#[source] std::io::Error);

    #[test]
    fn test_error_chain_includes_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let outer = SendError(inner);
        assert_eq!(error_chain(&outer), "error sending request: refused");
    }
}
