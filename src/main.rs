use s3_uploader::cli::Cli;
use s3_uploader::config::Config;
use s3_uploader::logging::init_logging;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 加载 .env 文件
    dotenvy::dotenv().ok();

    init_logging();

    // 先解析参数，保证 --help 不依赖环境变量
    let cli = match Cli::parse_from_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
        // --help / --version
        Err(err) => err.exit(),
    };

    // 配置缺失时逐行报告并退出，不做任何文件或网络操作
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            for message in err.messages() {
                eprintln!("{message}");
            }
            return ExitCode::FAILURE;
        }
    };

    match s3_uploader::upload(&config, &cli.file).await {
        Ok(result) => {
            println!(
                "successfully uploaded {:?} to {:?}",
                result.file, result.bucket
            );
            println!("download url {}", result.location);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
