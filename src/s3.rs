//! S3模块
//!
//! 该模块负责与 S3 存储桶的交互，包括客户端配置、存储抽象和分片上传。

// 声明子模块
pub mod client;
pub mod store;
pub mod upload;

// 重新导出常用的类型
pub use client::S3Store;
pub use store::{ObjectStore, ObjectTarget, StoreError};
pub use upload::{DEFAULT_PART_SIZE, MAX_UPLOAD_PARTS, MIN_PART_SIZE, Transfer, Uploader};
