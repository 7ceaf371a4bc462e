//! 日志系统模块
//!
//! 配置写到标准错误的诊断日志。标准输出只留给结构化事件和横幅，
//! 见 [`crate::event`]。

use log::LevelFilter;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// 全局日志初始化结果，`None` 表示尚未初始化
static GLOBAL_LOGGING_STATE: OnceLock<Mutex<Option<Result<(), String>>>> = OnceLock::new();

/// 日志配置结构
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// 日志级别，设置了 `RUST_LOG` 时以环境变量为准
    pub level: LevelFilter,
    /// 是否使用JSON格式
    pub json_format: bool,
    /// 是否使用ANSI颜色
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Warn,
            json_format: false,
            ansi: true,
        }
    }
}

/// 日志系统管理器
pub struct LoggingSystem;

impl LoggingSystem {
    /// 初始化日志系统
    ///
    /// 进程内只会真正初始化一次，之后的调用直接返回之前的结果。
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<()> {
        let state_mutex = GLOBAL_LOGGING_STATE.get_or_init(|| Mutex::new(None));
        let mut state = match state_mutex.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(previous) = state.as_ref() {
            return previous
                .clone()
                .map_err(|e| anyhow::anyhow!("日志系统之前初始化失败: {}", e));
        }

        let init_result = Self::perform_initialization(&config);
        *state = Some(init_result.as_ref().map(|_| ()).map_err(|e| e.to_string()));
        init_result
    }

    fn perform_initialization(config: &LogConfig) -> anyhow::Result<()> {
        // log crate 到 tracing 的桥接（reqwest 等依赖使用 log 输出）
        if let Err(e) = tracing_log::LogTracer::init() {
            tracing::debug!("LogTracer已存在: {}", e);
        }

        Self::init_tracing_subscriber(config)
    }

    /// 构建过滤器：`RUST_LOG` 未设置或为空时使用配置的级别
    fn build_env_filter(config: &LogConfig) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(Self::convert_level_to_directive(config.level))
            .from_env_lossy()
    }

    /// 初始化 tracing subscriber
    fn init_tracing_subscriber(config: &LogConfig) -> anyhow::Result<()> {
        let env_filter = Self::build_env_filter(config);

        let fmt_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_file(true)
                .with_line_number(true)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_ansi(config.ansi)
                .with_target(true)
                .boxed()
        };

        match registry().with(env_filter).with(fmt_layer).try_init() {
            Ok(()) => {
                tracing::debug!("日志配置: {:?}", config);
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains(
                    "attempted to set a logger after the logging system was already initialized",
                ) || error_msg.contains("a global default trace dispatcher has already been set")
                {
                    // LogTracer 已在上面设置过，或测试中其他用例已经初始化
                    Ok(())
                } else {
                    Err(anyhow::anyhow!(
                        "tracing subscriber初始化失败: {}",
                        error_msg
                    ))
                }
            }
        }
    }

    /// 将 log::LevelFilter 转换为 tracing 的指令
    fn convert_level_to_directive(level: LevelFilter) -> tracing_subscriber::filter::Directive {
        use tracing_subscriber::filter::{Directive, LevelFilter as TracingLevel};
        match level {
            LevelFilter::Off => Directive::from(TracingLevel::OFF),
            LevelFilter::Error => Directive::from(tracing::Level::ERROR),
            LevelFilter::Warn => Directive::from(tracing::Level::WARN),
            LevelFilter::Info => Directive::from(tracing::Level::INFO),
            LevelFilter::Debug => Directive::from(tracing::Level::DEBUG),
            LevelFilter::Trace => Directive::from(tracing::Level::TRACE),
        }
    }
}
