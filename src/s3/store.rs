//! 对象存储抽象
//!
//! `Uploader` 只依赖 `ObjectStore` trait，真实实现见 `client` 模块，
//! 测试中使用 mockall 生成的 `MockObjectStore`。

use async_trait::async_trait;
use aws_sdk_s3::types::CompletedPart;
use std::io;
use thiserror::Error;

/// 上传目标：存储桶、对象键和内容类型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTarget {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
}

impl ObjectTarget {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            content_type: content_type.into(),
        }
    }
}

/// 存储层错误。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取本地数据失败
    #[error("read failed: {0}")]
    Read(#[from] io::Error),

    /// 服务调用失败，`message` 包含 SDK 的完整错误上下文
    #[error("{operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    /// 服务响应缺少必需字段
    #[error("{operation} returned no {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("upload needs more than {limit} parts")]
    TooManyParts { limit: u64 },
}

/// 上传所需的对象存储操作。
///
/// 方法与 S3 API 一一对应。实现不做重试，重试（如果有）由底层客户端负责。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 单次请求上传整个对象。
    async fn put_object(&self, target: &ObjectTarget, body: Vec<u8>) -> Result<(), StoreError>;

    /// 开始分片上传，返回 upload id。
    async fn create_multipart_upload(&self, target: &ObjectTarget) -> Result<String, StoreError>;

    /// 上传一个分片，`part_number` 从 1 开始。
    async fn upload_part(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        part_number: i32,
        body: Vec<u8>,
    ) -> Result<CompletedPart, StoreError>;

    /// 完成分片上传，返回服务端报告的对象位置（如果有）。
    async fn complete_multipart_upload(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        parts: Vec<CompletedPart>,
    ) -> Result<Option<String>, StoreError>;

    /// 放弃分片上传并清理已上传的分片。
    async fn abort_multipart_upload(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
    ) -> Result<(), StoreError>;

    /// 对象的可访问 URL。
    fn object_url(&self, target: &ObjectTarget) -> String;
}
