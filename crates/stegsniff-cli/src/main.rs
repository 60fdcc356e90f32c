use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use stegsniff_core::{analyze_file, scan_and_write, ScanOptions, DEFAULT_MAX_SAMPLES};
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "stegsniff", version, about = "Heuristic detector for data hidden in PNG/JPEG images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 分析单个图像文件并打印结论
    Analyze {
        /// 图像文件路径
        file: PathBuf,

        /// 输出格式：text 或 json
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// 解码后像素数上限（超过则等比缩小）
        #[arg(long, default_value_t = DEFAULT_MAX_SAMPLES)]
        max_samples: usize,
    },
    /// 扫描目录并生成 result.json
    Scan {
        /// 输入目录
        #[arg(long)]
        input: PathBuf,

        /// 输出文件（JSON 数组）
        #[arg(long, default_value = "./result.json")]
        output: PathBuf,

        /// 线程数（"auto"=CPU 核心数，1 为串行）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 最大扫描文件大小（单位字节，例如 5242880 代表 5MB）
        #[arg(long)]
        max_file_size: Option<u64>,

        /// 解码后像素数上限（超过则等比缩小）
        #[arg(long, default_value_t = DEFAULT_MAX_SAMPLES)]
        max_samples: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { file, format, max_samples } => {
            let opts = ScanOptions { max_samples, ..ScanOptions::default() };
            let result = analyze_file(&file, &opts).with_context(|| format!("analyze {}", file.display()))?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            match format {
                Format::Json => {
                    serde_json::to_writer_pretty(&mut out, &result)?;
                    writeln!(out)?;
                }
                Format::Text => {
                    writeln!(out, "{}: {} / 100 [{}]", file.display(), result.score, result.level.as_str())?;
                    writeln!(out, "  {}", result.message)?;
                    writeln!(out, "  tail: {}", result.tail_summary)?;
                    writeln!(out, "  lsb:  {}", result.lsb_summary)?;
                }
            }
        }
        Commands::Scan { input, output, threads, max_file_size, max_samples } => {
            info!(?input, ?output, "starting scan");

            // 以缓冲方式打开输出文件，按 JSON 数组流式写入
            let mut out = BufWriter::new(File::create(&output).context("create output file")?);

            let opts = ScanOptions { max_file_size, threads: parse_threads(&threads), max_samples };
            let stats = scan_and_write(&input, &mut out, &opts).context("scan and write failed")?;
            out.flush().context("flush output file")?;

            info!(
                files_scanned = stats.files_scanned,
                files_failed = stats.files_failed,
                files_skipped = stats.files_skipped,
                alerts = stats.alerts,
                warnings = stats.warnings,
                "scan finished"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug；日志写到 stderr，不污染 stdout 报告
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数："auto" 或非法值 → None（自动）
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
