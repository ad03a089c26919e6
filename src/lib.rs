//! S3 文件上传库
//!
//! 把单个本地文件上传到 S3 存储桶的指定目录下，主要功能包括：
//! - 从环境变量加载区域、凭证、存储桶和目录前缀
//! - 按 64 MiB 分片上传大文件，小文件使用单次请求
//! - 返回上传后对象的访问地址

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod s3;
pub mod utils;

pub use config::Config;
pub use error::UploadError;

use s3::{ObjectTarget, S3Store, Uploader};
use std::io;
use tokio::fs::File;
use utils::path::{content_type_for, destination_key};

/// 一次成功上传的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// 命令行给出的源文件路径
    pub file: String,
    pub bucket: String,
    pub key: String,
    /// 对象的访问地址
    pub location: String,
    pub size: u64,
    pub parts: usize,
}

/// 把本地文件上传到配置的存储桶。
///
/// 对象键为配置的目录前缀加上源文件名，源路径中的目录部分会被丢弃。
/// 目标键已存在时直接覆盖。
///
/// # 参数
///
/// * `config` - 已校验的配置。
/// * `file_path` - 要上传的本地文件路径。
///
/// # 返回值
///
/// 上传结果，包括对象键和访问地址。
///
/// # Errors
///
/// - 路径为空时返回 `UploadError::MissingFile`
/// - 文件无法打开时返回 `UploadError::Open`，此时不会访问存储服务
/// - 客户端无法创建时返回 `UploadError::Session`
/// - 传输失败时返回 `UploadError::Transfer`
pub async fn upload(config: &Config, file_path: &str) -> Result<UploadResult, UploadError> {
    if file_path.is_empty() {
        return Err(UploadError::MissingFile);
    }

    let key = destination_key(&config.folder, file_path).ok_or_else(|| {
        UploadError::Open(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{file_path:?} has no file name"),
        ))
    })?;

    let file = File::open(file_path).await.map_err(UploadError::Open)?;
    let metadata = file.metadata().await.map_err(UploadError::Open)?;
    if metadata.is_dir() {
        return Err(UploadError::Open(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{file_path:?} is a directory"),
        )));
    }

    let store = S3Store::connect(config).await?;
    let content_type = content_type_for(&key);
    let target = ObjectTarget::new(&config.bucket, key, content_type);

    tracing::info!(file = file_path, bucket = %target.bucket, key = %target.key, "uploading");

    let transfer = Uploader::new(store)
        .upload(&target, file, Some(metadata.len()))
        .await
        .map_err(|source| UploadError::Transfer {
            file: file_path.to_string(),
            bucket: config.bucket.clone(),
            source,
        })?;

    Ok(UploadResult {
        file: file_path.to_string(),
        bucket: target.bucket,
        key: target.key,
        location: transfer.location,
        size: transfer.bytes,
        parts: transfer.parts,
    })
}
