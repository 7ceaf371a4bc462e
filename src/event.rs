//! 结构化事件输出
//!
//! 每个事件是一行JSON（时间戳、级别、消息、可选数据），立即写出，不做保留。
//! 诊断日志走 [`crate::logging`]，与这里的事件流相互独立。

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// 事件级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Info,
    Error,
}

/// 单条结构化事件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    /// 事件时间戳
    pub timestamp: DateTime<Utc>,
    /// 事件级别
    pub level: EventLevel,
    /// 事件消息
    pub message: String,
    /// 附加数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl LogEvent {
    /// 创建新的事件，时间戳取当前时间
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Error, message)
    }

    /// 设置附加数据
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// 事件写出器
///
/// 可以克隆，克隆体共享同一个底层输出。
#[derive(Clone)]
pub struct EventLogger {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    pretty: bool,
}

impl std::fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLogger")
            .field("pretty", &self.pretty)
            .finish()
    }
}

impl EventLogger {
    /// 使用任意输出创建事件写出器
    ///
    /// # 参数
    /// * `writer` - 事件输出目标
    /// * `pretty` - 是否输出缩进格式的JSON
    pub fn new<W>(writer: W, pretty: bool) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            pretty,
        }
    }

    /// 写到标准输出的事件写出器
    pub fn stdout(pretty: bool) -> Self {
        Self::new(std::io::stdout(), pretty)
    }

    /// 写出一条事件
    ///
    /// 写出失败只记录诊断日志，不影响检测流程。
    pub fn emit(&self, event: LogEvent) {
        let line = if self.pretty {
            serde_json::to_string_pretty(&event)
        } else {
            serde_json::to_string(&event)
        };

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("事件序列化失败: {}", e);
                return;
            }
        };

        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Err(e) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            tracing::warn!("事件写出失败: {}", e);
        }
    }
}
