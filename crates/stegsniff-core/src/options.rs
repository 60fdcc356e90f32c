//! 扫描选项与统计信息（模块）

/// 像素采样上限的默认值（宽 × 高）
pub const DEFAULT_MAX_SAMPLES: usize = 1_000_000;

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    /// 解码后像素数上限，超过则等比缩小
    pub max_samples: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_size: None,
            threads: None,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
    pub alerts: usize,
    pub warnings: usize,
}
