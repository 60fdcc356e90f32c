//! 批量扫描主流程与并行调度
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::input::analyze_file;
use crate::options::{ScanOptions, ScanStats};
use crate::types::ReportItem;
use crate::verdict::{AnalysisResult, Level};

/// 单个文件的处理结果
enum Outcome {
    Analyzed(AnalysisResult),
    Failed,
    Skipped,
}

/// 扫描目录并将结果以 JSON 数组流式写入 `out`
/// 稳定性保证：先收集文件并按文件名排序，并行结果在 writer 端按序号重排
pub fn scan_and_write(input_dir: &Path, out: &mut dyn Write, opts: &ScanOptions) -> Result<ScanStats> {
    let files = collect_files(input_dir)?;
    info!(files = files.len(), "collected input files");

    let threads = opts.threads.unwrap_or_else(num_cpus::get);
    let mut writer = ReportWriter::new(out);

    if threads > 1 {
        scan_parallel(&files, &mut writer, opts, threads)?;
    } else {
        // 串行路径
        for path in &files {
            let outcome = process_file(path, opts);
            writer.push(path, outcome)?;
        }
    }

    writer.finish()
}

/// 遍历输入目录（单层），按文件名排序；输入不是目录时报错
fn collect_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let md = std::fs::metadata(input_dir)
        .with_context(|| format!("read input directory {}", input_dir.display()))?;
    if !md.is_dir() {
        anyhow::bail!("input path {} is not a directory", input_dir.display());
    }
    let mut files: Vec<PathBuf> = vec![];
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = match entry { Ok(e) => e, Err(_) => continue };
        if entry.file_type().is_file() { files.push(entry.into_path()); }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn process_file(path: &Path, opts: &ScanOptions) -> Outcome {
    if let Some(max) = opts.max_file_size {
        if let Ok(md) = std::fs::metadata(path) {
            if md.len() > max { return Outcome::Skipped; }
        }
    }
    match analyze_file(path, opts) {
        Ok(result) => Outcome::Analyzed(result),
        Err(e) => {
            warn!(error = %e, "skipping file");
            Outcome::Failed
        }
    }
}

/// 并行调度：
/// - 后台线程内创建 Rayon 线程池并行分析
/// - 单线程 Writer 按 idx 重排并流式写 JSON，保证稳定顺序
/// - Writer 出错时先关闭 Receiver，worker 的 send 失败后停止派发，再 join 后台线程
fn scan_parallel(files: &[PathBuf], writer: &mut ReportWriter<'_>, opts: &ScanOptions, threads: usize) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;

    let (tx, rx) = channel::bounded::<(usize, Outcome)>(256);

    let files_vec: Vec<(usize, PathBuf)> = files.iter().cloned().enumerate().collect();
    let worker_opts = opts.clone();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;

    let scan_thread = std::thread::spawn(move || {
        pool.install(|| {
            // Receiver 关闭后 send 失败，try_for_each 随即停止
            let _ = files_vec.par_iter().try_for_each_with(tx, |tx, (idx, path)| {
                tx.send((*idx, process_file(path, &worker_opts)))
            });
        });
        // 结束后 Sender 全部被丢弃，Receiver 将收到关闭信号
    });

    let written = drain_in_order(files, writer, rx);

    if scan_thread.join().is_err() {
        anyhow::bail!("scan worker panicked");
    }
    written
}

/// 按序号重排写出；返回时 `rx` 已被丢弃
fn drain_in_order(
    files: &[PathBuf],
    writer: &mut ReportWriter<'_>,
    rx: crossbeam_channel::Receiver<(usize, Outcome)>,
) -> Result<()> {
    let mut next_idx: usize = 0;
    let mut buffer: BTreeMap<usize, Outcome> = BTreeMap::new();
    while let Ok((idx, outcome)) = rx.recv() {
        buffer.insert(idx, outcome);
        while let Some(outcome) = buffer.remove(&next_idx) {
            writer.push(&files[next_idx], outcome)?;
            next_idx += 1;
        }
    }
    Ok(())
}

/// JSON 数组流式写出 + 统计
struct ReportWriter<'w> {
    out: &'w mut dyn Write,
    first: bool,
    stats: ScanStats,
}

impl<'w> ReportWriter<'w> {
    fn new(out: &'w mut dyn Write) -> Self {
        Self { out, first: true, stats: ScanStats::default() }
    }

    fn push(&mut self, path: &Path, outcome: Outcome) -> Result<()> {
        let result = match outcome {
            Outcome::Analyzed(r) => r,
            Outcome::Failed => { self.stats.files_failed += 1; return Ok(()); }
            Outcome::Skipped => { self.stats.files_skipped += 1; return Ok(()); }
        };
        self.stats.files_scanned += 1;
        match result.level {
            Level::Alert => self.stats.alerts += 1,
            Level::Warn => self.stats.warnings += 1,
            Level::Safe => {}
        }

        if self.first {
            write!(self.out, "[")?;
            self.first = false;
        } else {
            write!(self.out, ",")?;
        }
        let name = path.file_name().map(|s| s.to_string_lossy()).unwrap_or_default();
        serde_json::to_writer(&mut *self.out, &ReportItem::new(&name, &result))?;
        Ok(())
    }

    fn finish(self) -> Result<ScanStats> {
        if self.first { write!(self.out, "[")?; }
        write!(self.out, "]")?;
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::io;

    /// 始终写失败的输出
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn missing_input_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let mut out = Vec::new();
        let err = scan_and_write(&missing, &mut out, &ScanOptions::default()).unwrap_err();
        assert!(err.to_string().contains("does-not-exist"), "{err}");
        assert!(out.is_empty());
    }

    #[test]
    fn file_as_input_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let mut out = Vec::new();
        assert!(scan_and_write(&file, &mut out, &ScanOptions::default()).is_err());
    }

    #[test]
    fn write_failure_stops_parallel_scan() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..16 {
            RgbaImage::new(4, 4).save(dir.path().join(format!("img{i:02}.png"))).unwrap();
        }
        let opts = ScanOptions { threads: Some(4), ..ScanOptions::default() };
        let err = scan_and_write(dir.path(), &mut BrokenPipe, &opts).unwrap_err();
        assert_eq!(err.downcast_ref::<io::Error>().map(|e| e.kind()), Some(io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn write_failure_stops_serial_scan() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::new(4, 4).save(dir.path().join("one.png")).unwrap();
        let opts = ScanOptions { threads: Some(1), ..ScanOptions::default() };
        assert!(scan_and_write(dir.path(), &mut BrokenPipe, &opts).is_err());
    }
}
