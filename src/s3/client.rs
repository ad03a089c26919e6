//! 基于 aws-sdk-s3 的 `ObjectStore` 实现。

use crate::config::Config;
use crate::error::UploadError;
use crate::s3::store::{ObjectStore, ObjectTarget, StoreError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use url::Url;

/// 静态凭证提供者名称
const CREDENTIALS_PROVIDER: &str = "static-credentials";

/// S3 客户端及生成对象 URL 所需的寻址信息。
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    region: String,
    endpoint: Option<Url>,
}

impl S3Store {
    /// 使用配置中的区域和静态凭证创建 S3 客户端。
    ///
    /// 配置了 `endpoint_url` 时，请求发往该端点并使用 path-style 寻址。
    /// 不刷新凭证，也不重试。
    ///
    /// # Errors
    ///
    /// 端点 URL 无法解析或不是 http/https 时返回 `UploadError::Session`。
    pub async fn connect(config: &Config) -> Result<Self, UploadError> {
        let endpoint = config
            .endpoint_url
            .as_deref()
            .map(parse_endpoint)
            .transpose()?;

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let region_provider =
            RegionProviderChain::first_try(Some(Region::new(config.region.clone())));

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(region_provider);
        if let Some(raw) = config.endpoint_url.as_deref() {
            loader = loader.endpoint_url(raw.trim_end_matches('/'));
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(endpoint.is_some())
            .build();

        tracing::debug!(region = %config.region, endpoint = ?endpoint, "s3 client created");

        Ok(Self {
            client: Client::from_conf(s3_config),
            region: config.region.clone(),
            endpoint,
        })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, UploadError> {
    let url = Url::parse(raw)
        .map_err(|e| UploadError::Session(format!("invalid endpoint url {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UploadError::Session(format!(
            "unsupported endpoint scheme {other:?}"
        ))),
    }
}

/// 把 SDK 错误转换为带完整上下文的 `StoreError::Request`。
fn request_error<E>(operation: &'static str) -> impl FnOnce(E) -> StoreError
where
    E: std::error::Error,
{
    move |err| StoreError::Request {
        operation,
        message: DisplayErrorContext(&err).to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, target: &ObjectTarget, body: Vec<u8>) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&target.bucket)
            .key(&target.key)
            .content_type(&target.content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(request_error("PutObject"))?;
        Ok(())
    }

    async fn create_multipart_upload(&self, target: &ObjectTarget) -> Result<String, StoreError> {
        let output = self
            .client
            .create_multipart_upload()
            .bucket(&target.bucket)
            .key(&target.key)
            .content_type(&target.content_type)
            .send()
            .await
            .map_err(request_error("CreateMultipartUpload"))?;

        output
            .upload_id()
            .map(str::to_string)
            .ok_or(StoreError::MissingField {
                operation: "CreateMultipartUpload",
                field: "upload id",
            })
    }

    async fn upload_part(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        part_number: i32,
        body: Vec<u8>,
    ) -> Result<CompletedPart, StoreError> {
        let output = self
            .client
            .upload_part()
            .bucket(&target.bucket)
            .key(&target.key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(request_error("UploadPart"))?;

        let e_tag = output.e_tag().ok_or(StoreError::MissingField {
            operation: "UploadPart",
            field: "ETag",
        })?;

        // 分片带校验和上传时，完成请求需要带上同样的校验和
        Ok(CompletedPart::builder()
            .part_number(part_number)
            .e_tag(e_tag)
            .set_checksum_crc32(output.checksum_crc32().map(str::to_string))
            .set_checksum_crc32_c(output.checksum_crc32_c().map(str::to_string))
            .build())
    }

    async fn complete_multipart_upload(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        parts: Vec<CompletedPart>,
    ) -> Result<Option<String>, StoreError> {
        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(parts))
            .build();

        let output = self
            .client
            .complete_multipart_upload()
            .bucket(&target.bucket)
            .key(&target.key)
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(request_error("CompleteMultipartUpload"))?;

        Ok(output.location().map(str::to_string))
    }

    async fn abort_multipart_upload(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
    ) -> Result<(), StoreError> {
        self.client
            .abort_multipart_upload()
            .bucket(&target.bucket)
            .key(&target.key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(request_error("AbortMultipartUpload"))?;
        Ok(())
    }

    /// 自定义端点使用 `<endpoint>/<bucket>/<key>`，
    /// 否则使用 `https://<bucket>.s3.<region>.amazonaws.com/<key>`。
    fn object_url(&self, target: &ObjectTarget) -> String {
        let (mut url, bucket_in_path) = match &self.endpoint {
            Some(endpoint) => (endpoint.clone(), true),
            None => {
                let host = format!(
                    "https://{}.s3.{}.amazonaws.com/",
                    target.bucket, self.region
                );
                match Url::parse(&host) {
                    Ok(url) => (url, false),
                    Err(_) => return format!("{host}{}", target.key),
                }
            }
        };

        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            if bucket_in_path {
                segments.push(&target.bucket);
            }
            segments.extend(target.key.split('/'));
        }
        url.to_string()
    }
}
