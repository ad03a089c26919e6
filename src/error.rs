//! 上传过程中的错误类型。

use crate::s3::StoreError;
use std::io;
use thiserror::Error;

/// `upload` 操作可能返回的错误。
///
/// 每个变体的 `Display` 输出都是一行可以直接打印给用户的诊断信息。
#[derive(Debug, Error)]
pub enum UploadError {
    /// 未指定要上传的文件
    #[error("filename must be specified")]
    MissingFile,

    /// 本地文件无法打开
    #[error("could not open a file: {0}")]
    Open(#[source] io::Error),

    /// 无法构建存储服务客户端
    #[error("could not create session: {0}")]
    Session(String),

    /// 传输过程中的任何失败
    #[error("unable to upload {file:?} to {bucket:?}, {source}")]
    Transfer {
        file: String,
        bucket: String,
        #[source]
        source: StoreError,
    },
}
