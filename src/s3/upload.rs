//! 分片上传模块
//!
//! 数据小于一个分片时使用单次 PutObject，否则按固定分片大小顺序上传，
//! 最后由服务端合并。分片上传失败时会放弃本次上传，避免遗留分片。

use crate::s3::store::{ObjectStore, ObjectTarget, StoreError};
use aws_sdk_s3::types::CompletedPart;
use tokio::io::{AsyncRead, AsyncReadExt};

const MIB: u64 = 1024 * 1024;

/// 默认分片大小：64 MiB
pub const DEFAULT_PART_SIZE: u64 = 64 * MIB;
/// S3 允许的最小分片大小（最后一个分片除外）
pub const MIN_PART_SIZE: u64 = 5 * MIB;
/// 单次分片上传的最大分片数
pub const MAX_UPLOAD_PARTS: u64 = 10_000;

/// 一次传输的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub location: String,
    pub bytes: u64,
    pub parts: usize,
}

/// 把字节流上传到对象存储。
pub struct Uploader<S> {
    store: S,
    part_size: u64,
}

impl<S: ObjectStore> Uploader<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            part_size: DEFAULT_PART_SIZE,
        }
    }

    /// 设置分片大小，小于 `MIN_PART_SIZE` 时按最小值处理。
    pub fn with_part_size(mut self, part_size: u64) -> Self {
        self.part_size = part_size.max(MIN_PART_SIZE);
        self
    }

    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    /// 已知总大小时，保证分片数不超过 `MAX_UPLOAD_PARTS`。
    fn part_size_for(&self, total_size: Option<u64>) -> u64 {
        match total_size {
            Some(total) if total / self.part_size >= MAX_UPLOAD_PARTS => {
                total / MAX_UPLOAD_PARTS + 1
            }
            _ => self.part_size,
        }
    }

    /// 上传 `body` 的全部内容到 `target`。
    ///
    /// # 参数
    ///
    /// * `target` - 目标存储桶、键和内容类型。
    /// * `body` - 从偏移 0 开始读取的数据源。
    /// * `total_size` - 数据总大小（如果已知），用于调整分片大小。
    ///
    /// # 返回值
    ///
    /// 对象位置、上传字节数和分片数。
    #[tracing::instrument(skip(self, body), fields(bucket = %target.bucket, key = %target.key))]
    pub async fn upload<R>(
        &self,
        target: &ObjectTarget,
        mut body: R,
        total_size: Option<u64>,
    ) -> Result<Transfer, StoreError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let part_size = self.part_size_for(total_size);

        let first = read_part(&mut body, part_size).await?;
        if (first.len() as u64) < part_size {
            return self.put_single(target, first).await;
        }

        // 第一个分片已满，再读一个分片才能确定是否需要分片上传
        let second = read_part(&mut body, part_size).await?;
        if second.is_empty() {
            return self.put_single(target, first).await;
        }

        let upload_id = self.store.create_multipart_upload(target).await?;
        tracing::debug!(%upload_id, part_size, "multipart upload started");

        match self
            .send_parts(target, &upload_id, &mut body, part_size, first, second)
            .await
        {
            Ok(transfer) => {
                tracing::info!(
                    bytes = transfer.bytes,
                    parts = transfer.parts,
                    "multipart upload completed"
                );
                Ok(transfer)
            }
            Err(err) => {
                if let Err(abort_err) = self
                    .store
                    .abort_multipart_upload(target, &upload_id)
                    .await
                {
                    tracing::warn!(%upload_id, error = %abort_err, "failed to abort multipart upload");
                }
                Err(err)
            }
        }
    }

    async fn put_single(
        &self,
        target: &ObjectTarget,
        body: Vec<u8>,
    ) -> Result<Transfer, StoreError> {
        let bytes = body.len() as u64;
        self.store.put_object(target, body).await?;
        tracing::info!(bytes, "object uploaded");

        Ok(Transfer {
            location: self.store.object_url(target),
            bytes,
            parts: 1,
        })
    }

    /// 顺序上传所有分片并完成分片上传。
    async fn send_parts<R>(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        body: &mut R,
        part_size: u64,
        first: Vec<u8>,
        second: Vec<u8>,
    ) -> Result<Transfer, StoreError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut parts: Vec<CompletedPart> = Vec::new();
        let mut bytes = 0u64;
        let mut chunk = first;
        let mut lookahead = Some(second);

        loop {
            if parts.len() as u64 >= MAX_UPLOAD_PARTS {
                return Err(StoreError::TooManyParts {
                    limit: MAX_UPLOAD_PARTS,
                });
            }
            let part_number = parts.len() as i32 + 1;
            bytes += chunk.len() as u64;

            let part = self
                .store
                .upload_part(target, upload_id, part_number, chunk)
                .await?;
            tracing::debug!(part_number, "part uploaded");
            parts.push(part);

            chunk = match lookahead.take() {
                Some(next) => next,
                None => read_part(body, part_size).await?,
            };
            if chunk.is_empty() {
                break;
            }
        }

        let count = parts.len();
        let location = self
            .store
            .complete_multipart_upload(target, upload_id, parts)
            .await?
            .unwrap_or_else(|| self.store.object_url(target));

        Ok(Transfer {
            location,
            bytes,
            parts: count,
        })
    }
}

/// 读取最多 `part_size` 字节，只有到达末尾时才会少于 `part_size`。
async fn read_part<R>(body: &mut R, part_size: u64) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    body.take(part_size).read_to_end(&mut buf).await?;
    Ok(buf)
}
