//! 图像隐写启发式检测库
//!
//! 设计要点：
//! - 纯计算核心：尾部附加数据分析（结束标记之后的字节）+ 像素最低位均衡度分析，二者加权合并为 0..=100 的可疑度。
//! - 核心函数全部为纯函数，不做 I/O、不记日志；同一输入多次调用结果一致。
//! - I/O 适配层（`input`）负责读取字节与解码像素，批量扫描（`scan`）负责目录遍历与流式 JSON 输出。

mod options;
mod types;
mod stats;
mod signatures;
mod container;
mod tail;
mod pixels;
mod verdict;
mod input;
mod scan;

pub use options::{ScanOptions, ScanStats, DEFAULT_MAX_SAMPLES};
pub use types::ReportItem;
pub use stats::{printable_fraction, shannon_entropy};
pub use signatures::{find_signature, Signature, SIGNATURES};
pub use container::{end_of_data, tail_region, ContainerFormat};
pub use tail::{analyze_tail, score_tail, TailReport, TailScore};
pub use pixels::{analyze_pixels, count_lsb, LsbCounts, PixelGrid};
pub use verdict::{aggregate, analyze, AnalysisResult, Level, SubScore};
pub use input::{analyze_file, decode_pixels, downscale_dims, load, read_bytes, InputError};
pub use scan::scan_and_write;
