//! 配置管理模块
//!
//! 提供配置文件加载、设置合并和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::TomlConfigLoader;
pub use types::{MonitorConfig, MonitorSettings};
