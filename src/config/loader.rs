//! 配置加载器实现
//!
//! 提供TOML配置文件解析、环境变量替换和错误处理功能

use crate::config::types::MonitorSettings;
use crate::error::ConfigError;
use regex::Regex;
use std::path::Path;

/// TOML配置加载器
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl Default for TomlConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用 `${VAR}` 环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 从文件加载配置
    pub async fn load_from_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<MonitorSettings, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Parse(format!("读取文件失败: {e}")))?;

        let settings = self.load_from_str(&content)?;

        tracing::info!("成功加载配置文件: {}", path.display());
        tracing::debug!("配置内容: {:?}", settings);

        Ok(settings)
    }

    /// 从字符串加载配置
    pub fn load_from_str(&self, content: &str) -> Result<MonitorSettings, ConfigError> {
        let processed = self.substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| ConfigError::Parse(format!("TOML解析失败: {e}")))
    }

    /// 替换字符串中的 `${VAR_NAME}` 环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::Parse(format!("正则表达式错误: {e}")))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            let value = std::env::var(var_name).map_err(|_| ConfigError::EnvVar {
                var: var_name.to_string(),
            })?;
            result = result.replace(full_match, &value);
        }

        Ok(result)
    }
}
