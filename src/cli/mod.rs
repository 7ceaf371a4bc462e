//! 命令行接口模块
//!
//! 提供命令行参数解析和横幅输出

pub mod args;
pub mod banner;

// 重新导出主要类型
pub use args::{Args, LogFormat, LogLevel};
