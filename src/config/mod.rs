//! 上传工具的配置模块。
//!
//! 该模块负责从环境变量加载配置。配置在启动时构建一次，之后以引用方式传递，
//! 不使用全局单例。

use std::env;
use std::fmt;
use thiserror::Error;

/// AWS 区域
pub const ENV_REGION: &str = "AWS_REGION";
/// AWS 访问密钥 ID
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// AWS 秘密访问密钥
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// 目标存储桶名称
pub const ENV_BUCKET_NAME: &str = "S3_BUCKET_NAME";
/// 目标目录前缀
pub const ENV_FOLDER_NAME: &str = "S3_FOLDER_NAME";
/// S3 兼容服务的端点 URL（可选）
pub const ENV_ENDPOINT: &str = "S3_ENDPOINT";

/// 缺少必需环境变量时返回的错误。
///
/// 每个缺失的变量在 `Display` 输出中占一行。
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", render_missing(.missing))]
pub struct ConfigError {
    missing: Vec<&'static str>,
}

impl ConfigError {
    /// 缺失的环境变量名，按检查顺序排列。
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    /// 每个缺失变量对应的一行诊断信息。
    pub fn messages(&self) -> Vec<String> {
        self.missing
            .iter()
            .map(|key| format!("{key} is not configured"))
            .collect()
    }
}

fn render_missing(missing: &[&'static str]) -> String {
    missing
        .iter()
        .map(|key| format!("{key} is not configured"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 上传所需的全部配置。
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub folder: String,
    /// 设置后使用 path-style 寻址访问该端点
    pub endpoint_url: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("folder", &self.folder)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl Config {
    /// 从进程环境变量读取配置。
    ///
    /// # 返回值
    ///
    /// 配置完整时返回 `Config`，否则返回列出所有缺失变量的 `ConfigError`。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 使用给定的查找函数读取配置。
    ///
    /// 空字符串视为未设置。所有必需变量都会被检查，而不是在第一个缺失处停止。
    ///
    /// # 参数
    ///
    /// * `lookup` - 根据变量名返回变量值的函数。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| match lookup(key).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let region = required(ENV_REGION);
        let access_key_id = required(ENV_ACCESS_KEY_ID);
        let secret_access_key = required(ENV_SECRET_ACCESS_KEY);
        let bucket = required(ENV_BUCKET_NAME);
        let folder = required(ENV_FOLDER_NAME);

        if !missing.is_empty() {
            return Err(ConfigError { missing });
        }

        Ok(Self {
            region,
            access_key_id,
            secret_access_key,
            bucket,
            folder,
            endpoint_url: lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()),
        })
    }
}
