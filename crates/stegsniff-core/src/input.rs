//! 文件读取与图像解码（纯计算核心之外的 I/O 适配层）
//!
//! - 原始字节读取与像素解码互不依赖，使用 `rayon::join` 并发执行，两者都完成后才进入核心分析。
//! - 解码器按文件内容嗅探，不依赖扩展名（无扩展名或改名的图像同样可解码）。
//! - 解码结果统一转换为 RGBA8，灰度/调色板图像在此归一化。
//! - 超大图像按宽高比等比缩小，使像素数不超过 `max_samples`。
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageReader};
use thiserror::Error;
use tracing::debug;

use crate::options::ScanOptions;
use crate::pixels::PixelGrid;
use crate::verdict::{analyze, AnalysisResult};

/// 适配层错误：读取失败与解码失败分开上报
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unreadable file {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: std::io::Error },
    #[error("undecodable image {}: {source}", .path.display())]
    Undecodable { path: PathBuf, source: image::ImageError },
}

/// 整读文件字节
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, InputError> {
    std::fs::read(path).map_err(|source| InputError::Unreadable { path: path.to_path_buf(), source })
}

/// 计算等比缩小后的尺寸：已在上限内则原样返回；各维度至少为 1
pub fn downscale_dims(width: u32, height: u32, max_samples: usize) -> (u32, u32) {
    let max_samples = max_samples.max(1);
    let total = width as usize * height as usize;
    if total <= max_samples {
        return (width, height);
    }
    let scale = (max_samples as f64 / total as f64).sqrt();
    let mut w = ((width as f64 * scale).floor() as usize).max(1);
    let h = ((height as f64 * scale).floor() as usize).max(1);
    // 极端长宽比下 h 被抬到 1，需要再收紧 w
    if w * h > max_samples {
        w = (max_samples / h).max(1);
    }
    (w as u32, h as u32)
}

/// 按魔数猜测格式后解码
fn open_guessed(path: &Path) -> Result<DynamicImage, ImageError> {
    ImageReader::open(path)?.with_guessed_format()?.decode()
}

/// 解码图像为 RGBA8 像素网格，必要时缩小
pub fn decode_pixels(path: &Path, max_samples: usize) -> Result<PixelGrid, InputError> {
    let img = open_guessed(path).map_err(|source| InputError::Undecodable { path: path.to_path_buf(), source })?;
    let mut rgba = img.to_rgba8();

    let (w, h) = rgba.dimensions();
    let (nw, nh) = downscale_dims(w, h, max_samples);
    if (nw, nh) != (w, h) {
        debug!(?path, from = ?(w, h), to = ?(nw, nh), "downscaling image");
        rgba = image::imageops::resize(&rgba, nw, nh, FilterType::Triangle);
    }

    Ok(PixelGrid::from(rgba))
}

/// 并发读取字节与解码像素，二者都成功才返回
pub fn load(path: &Path, max_samples: usize) -> Result<(Vec<u8>, PixelGrid), InputError> {
    let (bytes, grid) = rayon::join(|| read_bytes(path), || decode_pixels(path, max_samples));
    Ok((bytes?, grid?))
}

/// 单文件分析：加载 → 纯计算
pub fn analyze_file(path: &Path, opts: &ScanOptions) -> Result<AnalysisResult, InputError> {
    let (bytes, grid) = load(path, opts.max_samples)?;
    let result = analyze(&bytes, &grid);
    debug!(?path, score = result.score, level = result.level.as_str(), "analyzed");
    Ok(result)
}
