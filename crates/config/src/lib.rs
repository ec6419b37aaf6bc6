//! cms-config - 配置加载库
//!
//! 加载顺序: `{dir}/default.toml` -> `{dir}/{APP_ENV}.toml` -> `CMS_` 前缀环境变量
//! (嵌套键使用 `__` 分隔, 如 `CMS_TELEMETRY__LOG_LEVEL`)

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 指标配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

fn default_app_env() -> String {
    current_env()
}

fn current_env() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

fn figment(config_dir: &str) -> Figment {
    Figment::new()
        .merge(Toml::file(format!("{}/default.toml", config_dir)))
        .merge(Toml::file(format!("{}/{}.toml", config_dir, current_env())))
        .merge(Env::prefixed("CMS_").split("__"))
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        Ok(figment(config_dir).extract()?)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

/// 加载指定键下的服务专属配置段
pub fn load_section<T: DeserializeOwned>(config_dir: &str, key: &str) -> Result<T, ConfigError> {
    Ok(figment(config_dir).extract_inner(key)?)
}
