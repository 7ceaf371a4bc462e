//! Quovarine Health Monitor 主程序入口
//!
//! 退出码：0 表示部署最终健康；1 表示配置错误或所有尝试均失败

use anyhow::Context;
use clap::Parser;
use quovarine_health_monitor::cli::{banner, Args, LogFormat};
use quovarine_health_monitor::config::{MonitorConfig, MonitorSettings, TomlConfigLoader};
use quovarine_health_monitor::error::{ConfigError, MonitorError, Result};
use quovarine_health_monitor::event::EventLogger;
use quovarine_health_monitor::health::{HttpHealthChecker, RetryRunner};
use quovarine_health_monitor::logging::{LogConfig, LoggingSystem};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 解析命令行参数；参数错误按配置错误处理
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            // 输出失败时仍按原退出码退出
            e.print().ok();
            return ExitCode::from(code);
        }
    };

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        json_format: args.log_format == LogFormat::Json,
        ansi: std::io::stderr().is_terminal(),
        ..Default::default()
    };
    if let Err(e) = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败") {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }

    debug!("{} v{} 启动", quovarine_health_monitor::APP_NAME, quovarine_health_monitor::VERSION);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(MonitorError::Config(ConfigError::MissingUrl)) => {
            eprintln!("Error: DEPLOYMENT_URL environment variable not set");
            eprintln!("Please set it in your environment or pass --url");
            ExitCode::from(1)
        }
        Err(e) if e.is_config_error() => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
        Err(MonitorError::RetriesExhausted { attempts }) => {
            info!("健康检测失败，共尝试 {} 次", attempts);
            ExitCode::from(1)
        }
        Err(e) => {
            error!("运行失败: {}", e);
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// 解析配置并执行带重试的健康检测
async fn run(args: &Args) -> Result<()> {
    let config = resolve_config(args).await?;
    debug!("监控配置: {:?}", config);

    let mut stdout = std::io::stdout();
    if let Err(e) = banner::write_header(&mut stdout, config.deployment_url()) {
        warn!("横幅写出失败: {}", e);
    }

    let events = EventLogger::stdout(args.pretty);
    let checker = HttpHealthChecker::new(&config, events.clone())?;
    let runner = RetryRunner::from_config(checker, &config, events);
    let report = runner.run().await;

    // 退出码只取决于检测结果
    if let Err(e) = banner::write_footer(&mut stdout, report.healthy) {
        warn!("横幅写出失败: {}", e);
    }

    if report.healthy {
        Ok(())
    } else {
        Err(MonitorError::RetriesExhausted {
            attempts: report.attempts,
        })
    }
}

/// 合并配置文件、命令行和环境变量，得到验证后的配置
async fn resolve_config(args: &Args) -> Result<MonitorConfig> {
    let mut settings = match &args.config {
        Some(path) => TomlConfigLoader::default().load_from_file(path).await?,
        None => MonitorSettings::default(),
    };
    args.apply_to(&mut settings);

    Ok(MonitorConfig::from_settings(settings)?)
}
