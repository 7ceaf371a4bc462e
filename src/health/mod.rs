//! 健康检测模块
//!
//! 提供单次HTTP健康检测、结果分类和指数退避重试

pub mod checker;
pub mod result;
pub mod retry;

// 重新导出主要类型
pub use checker::{HealthChecker, HttpHealthChecker};
pub use result::{AttemptResult, FailureCause, HealthStatus};
pub use retry::{BackoffPolicy, RetryRunner, RunReport, Sleeper, TokioSleeper};
