//! 指数退避重试
//!
//! 反复调用单次检测，失败时按 `min(当前退避 * 2, 最大退避)` 的节奏等待，
//! 直到检测通过或次数用尽。

use crate::config::MonitorConfig;
use crate::event::{EventLogger, LogEvent};
use crate::health::checker::HealthChecker;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 退避策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    initial: Duration,
    max: Duration,
}

impl BackoffPolicy {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    /// 计算下一次退避时间
    pub fn next(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max)
    }

    /// 从初始值开始的退避序列（无限）
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            policy: *self,
            current: self.initial,
        }
    }
}

/// 退避时间序列迭代器
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    policy: BackoffPolicy,
    current: Duration,
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.current;
        self.current = self.policy.next(delay);
        Some(delay)
    }
}

/// 等待器，重试之间的等待通过它完成
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// 基于tokio定时器的等待器
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 一次完整运行的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// 是否最终检测通过
    pub healthy: bool,
    /// 实际执行的检测次数
    pub attempts: u32,
    /// 每次重试前等待的时间
    pub delays: Vec<Duration>,
}

/// 重试驱动器
pub struct RetryRunner<C, S = TokioSleeper> {
    checker: C,
    sleeper: S,
    policy: BackoffPolicy,
    max_retries: u32,
    events: EventLogger,
}

impl<C: HealthChecker> RetryRunner<C, TokioSleeper> {
    /// 使用配置中的重试参数创建驱动器
    pub fn from_config(checker: C, config: &MonitorConfig, events: EventLogger) -> Self {
        Self::new(
            checker,
            TokioSleeper,
            BackoffPolicy::new(config.initial_backoff(), config.max_backoff()),
            config.max_retries(),
            events,
        )
    }
}

impl<C: HealthChecker, S: Sleeper> RetryRunner<C, S> {
    pub fn new(
        checker: C,
        sleeper: S,
        policy: BackoffPolicy,
        max_retries: u32,
        events: EventLogger,
    ) -> Self {
        Self {
            checker,
            sleeper,
            policy,
            max_retries,
            events,
        }
    }

    /// 带重试的健康检测，最终检测通过返回 `true`
    pub async fn run_with_retry(&self) -> bool {
        self.run().await.healthy
    }

    /// 带重试的健康检测，返回完整的运行报告
    ///
    /// `max_retries` 为0时不执行任何检测，直接报告失败。
    pub async fn run(&self) -> RunReport {
        let mut backoff = self.policy.initial();
        let mut delays = Vec::new();

        for attempt in 1..=self.max_retries {
            self.events.emit(
                LogEvent::info(format!(
                    "Health check attempt {attempt}/{}",
                    self.max_retries
                ))
                .with_data(json!({ "url": self.checker.endpoint() })),
            );

            let result = self.checker.check_once().await;
            if result.is_healthy() {
                info!("部署健康检测通过，共尝试 {} 次", attempt);
                self.events.emit(
                    LogEvent::info("✅ Deployment is healthy").with_data(json!({ "attempts": attempt })),
                );
                return RunReport {
                    healthy: true,
                    attempts: attempt,
                    delays,
                };
            }

            if attempt < self.max_retries {
                self.events.emit(
                    LogEvent::info(format!(
                        "Retrying in {:.1} seconds...",
                        backoff.as_secs_f64()
                    ))
                    .with_data(json!({
                        "next_attempt": attempt + 1,
                        "delay_seconds": backoff.as_secs_f64(),
                    })),
                );
                debug!("第 {} 次检测失败，等待 {:?} 后重试", attempt, backoff);

                self.sleeper.sleep(backoff).await;
                delays.push(backoff);
                backoff = self.policy.next(backoff);
            }
        }

        warn!("健康检测在 {} 次尝试后仍未通过", self.max_retries);
        self.events.emit(
            LogEvent::error("❌ All health check attempts failed")
                .with_data(json!({ "attempts": self.max_retries })),
        );

        RunReport {
            healthy: false,
            attempts: self.max_retries,
            delays,
        }
    }
}
