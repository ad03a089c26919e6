use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

/// 未设置 `RUST_LOG` 时的默认日志级别
const DEFAULT_FILTER: &str = "warn";

/// 初始化日志，输出到标准错误，保证标准输出只包含上传结果。
///
/// 日志级别由 `RUST_LOG` 控制。重复调用时忽略后续的初始化。
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(LocalTime::rfc_3339())
        .with_writer(std::io::stderr)
        .try_init();
}
