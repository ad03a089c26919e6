//! 命令行参数。

use clap::Parser;
use std::ffi::OsString;

/// 上传单个文件到 S3
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about)]
pub struct Cli {
    /// 要上传的文件
    #[arg(short = 'f', long = "file", value_name = "PATH", default_value = "")]
    pub file: String,
}

impl Cli {
    /// 解析给定参数，出错时返回 clap 的错误而不是直接退出进程。
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}
