use s3_uploader::s3::{MIN_PART_SIZE, ObjectTarget, S3Store, Uploader};
use s3_uploader::{Config, UploadError, upload};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUCKET: &str = "test-bucket";

fn config_for(server: &MockServer) -> Config {
    Config {
        region: "us-east-1".to_string(),
        access_key_id: "AKIDEXAMPLE".to_string(),
        secret_access_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string(),
        bucket: BUCKET.to_string(),
        folder: "reports".to_string(),
        endpoint_url: Some(server.uri()),
    }
}

/// 集成测试：小文件使用单次 PutObject 上传
///
/// 验证对象键只包含目录前缀和文件名，并返回 path-style 的访问地址
#[tokio::test]
async fn test_small_file_single_put() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/test-bucket/reports/report.csv"))
        .and(header("content-type", "text/csv"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"abc\""))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new()?;
    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested)?;
    let file = nested.join("report.csv");
    fs::write(&file, "id,name\n1,alice\n")?;

    let result = upload(&config_for(&server), file.to_str().unwrap()).await?;

    assert_eq!(result.bucket, BUCKET);
    assert_eq!(result.key, "reports/report.csv");
    assert_eq!(result.parts, 1);
    assert_eq!(result.size, 16);
    assert_eq!(
        result.location,
        format!("{}/test-bucket/reports/report.csv", server.uri())
    );
    Ok(())
}

/// 集成测试：文件不存在时不访问存储服务
#[tokio::test]
async fn test_missing_file_never_contacts_store() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = upload(&config_for(&server), "/definitely/not/here.txt")
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Open(_)));
    assert!(err.to_string().starts_with("could not open a file:"));
}

/// 集成测试：空路径和目录路径都被拒绝
#[tokio::test]
async fn test_empty_and_directory_paths_rejected() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let config = config_for(&server);

    let err = upload(&config, "").await.unwrap_err();
    assert!(matches!(err, UploadError::MissingFile));

    let dir = TempDir::new()?;
    let err = upload(&config, dir.path().to_str().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::Open(_)));
    Ok(())
}

/// 集成测试：服务端拒绝请求时返回传输错误
#[tokio::test]
async fn test_access_denied_is_transfer_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message><RequestId>1</RequestId></Error>"#;
    Mock::given(method("PUT"))
        .and(path("/test-bucket/reports/secret.txt"))
        .respond_with(ResponseTemplate::new(403).set_body_raw(body, "application/xml"))
        .mount(&server)
        .await;

    let dir = TempDir::new()?;
    let file = dir.path().join("secret.txt");
    fs::write(&file, "top secret")?;
    let file = file.to_str().unwrap().to_string();

    let err = upload(&config_for(&server), &file).await.unwrap_err();

    assert!(matches!(err, UploadError::Transfer { .. }));
    let message = err.to_string();
    assert!(message.starts_with(&format!("unable to upload {file:?} to \"test-bucket\",")));
    assert!(message.contains("AccessDenied"));
    Ok(())
}

/// 集成测试：超过分片大小的数据使用分片上传
///
/// 验证分片按顺序上传，并返回 CompleteMultipartUpload 报告的位置
#[tokio::test]
async fn test_multipart_upload_against_s3_api() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let object_path = "/test-bucket/reports/big.bin";

    let initiate = r#"<?xml version="1.0" encoding="UTF-8"?>
<InitiateMultipartUploadResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Bucket>test-bucket</Bucket><Key>reports/big.bin</Key><UploadId>upload-123</UploadId></InitiateMultipartUploadResult>"#;
    let complete = r#"<?xml version="1.0" encoding="UTF-8"?>
<CompleteMultipartUploadResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Location>https://test-bucket.example/reports/big.bin</Location><Bucket>test-bucket</Bucket><Key>reports/big.bin</Key><ETag>"final-etag-2"</ETag></CompleteMultipartUploadResult>"#;

    Mock::given(method("POST"))
        .and(path(object_path))
        .and(query_param("uploads", ""))
        .respond_with(ResponseTemplate::new(200).set_body_raw(initiate, "application/xml"))
        .expect(1)
        .mount(&server)
        .await;
    for part_number in ["1", "2"] {
        Mock::given(method("PUT"))
            .and(path(object_path))
            .and(query_param("uploadId", "upload-123"))
            .and(query_param("partNumber", part_number))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("ETag", format!("\"etag-{part_number}\"").as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path(object_path))
        .and(query_param("uploadId", "upload-123"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(complete, "application/xml"))
        .expect(1)
        .mount(&server)
        .await;

    let store = S3Store::connect(&config_for(&server)).await?;
    let target = ObjectTarget::new(BUCKET, "reports/big.bin", "application/octet-stream");
    let data = vec![9u8; MIN_PART_SIZE as usize + 4096];

    let transfer = Uploader::new(store)
        .with_part_size(MIN_PART_SIZE)
        .upload(&target, data.as_slice(), Some(data.len() as u64))
        .await?;

    assert_eq!(transfer.parts, 2);
    assert_eq!(transfer.bytes, data.len() as u64);
    assert_eq!(transfer.location, "https://test-bucket.example/reports/big.bin");
    Ok(())
}

/// 集成测试：目录前缀中的 `.` 和 `..` 被解析
///
/// 验证请求的对象键和返回的访问地址指向同一个对象
#[tokio::test]
async fn test_dot_segments_in_folder_resolve_to_same_object() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/test-bucket/dump/report.csv"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"abc\""))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new()?;
    let file = dir.path().join("report.csv");
    fs::write(&file, "a,b\n")?;

    let mut config = config_for(&server);
    config.folder = "./reports/../dump".to_string();
    let result = upload(&config, file.to_str().unwrap()).await?;

    assert_eq!(result.key, "dump/report.csv");
    assert_eq!(
        result.location,
        format!("{}/test-bucket/dump/report.csv", server.uri())
    );
    Ok(())
}
