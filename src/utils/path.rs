use std::path::Path;

/// 使用正斜杠连接多个字符串组件并规范化结果
///
/// 组件按 `/` 拆分后逐段处理：空段和 `.` 被丢弃，`..` 移除前一段
/// （没有前一段时直接丢弃），因此结果中不含多余的斜杠、`.` 或 `..`。
///
/// # 参数
///
/// * `components` - 要连接的字符串组件切片
///
/// # 返回值
///
/// 连接后的字符串，组件之间使用单个正斜杠分隔
///
/// # 示例
///
/// ```
/// use s3_uploader::utils::path::join_slash;
///
/// assert_eq!(join_slash(&["backups", "report.csv"]), "backups/report.csv");
/// assert_eq!(join_slash(&["backups/", "/report.csv"]), "backups/report.csv");
/// assert_eq!(join_slash(&["./backups/../dump", "report.csv"]), "dump/report.csv");
/// ```
pub fn join_slash(components: &[&str]) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in components.iter().flat_map(|c| c.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// 获取路径中的文件名部分，丢弃所有目录组件。
///
/// 路径以 `..` 结尾或为根目录时没有文件名，返回 `None`。
pub fn base_name(file_path: &str) -> Option<&str> {
    Path::new(file_path).file_name().and_then(|name| name.to_str())
}

/// 计算上传目标的对象键：目录前缀 + 源文件名。
///
/// # 示例
///
/// ```
/// use s3_uploader::utils::path::destination_key;
///
/// assert_eq!(destination_key("daily", "/a/b/report.csv").as_deref(), Some("daily/report.csv"));
/// assert_eq!(destination_key("daily", "/"), None);
/// ```
pub fn destination_key(folder: &str, file_path: &str) -> Option<String> {
    base_name(file_path).map(|name| join_slash(&[folder, name]))
}

/// 根据对象键的扩展名猜测 Content-Type，未知类型使用 `application/octet-stream`。
pub fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
