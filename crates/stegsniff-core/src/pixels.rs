//! 像素最低位（LSB）均衡度分析
use crate::verdict::SubScore;

pub(crate) const EMPTY_GRID_SUMMARY: &str = "No pixel samples to inspect.";

/// 解码后的 RGBA8 像素网格（行优先，每像素 4 个通道）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// 由宽高与 RGBA 样本构建；样本长度必须为 width * height * 4
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if samples.len() != expected { return None; }
        Some(Self { width, height, samples })
    }

    /// 由像素迭代器构建（测试与调用方便用）
    pub fn from_pixels(width: u32, height: u32, pixels: impl IntoIterator<Item = [u8; 4]>) -> Option<Self> {
        let samples: Vec<u8> = pixels.into_iter().flatten().collect();
        Self::new(width, height, samples)
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.samples.chunks_exact(4)
    }
}

impl From<image::RgbaImage> for PixelGrid {
    // RgbaImage 的底层缓冲恰为 w * h * 4
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height, samples: img.into_raw() }
    }
}

/// 最低位计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LsbCounts {
    pub zeros: u64,
    pub ones: u64,
}

impl LsbCounts {
    pub fn total(&self) -> u64 { self.zeros + self.ones }

    /// |zeros - ones| / total；total 为 0 时返回 None
    pub fn balance(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 { return None; }
        Some(self.zeros.abs_diff(self.ones) as f64 / total as f64)
    }

    /// 1 - balance，越接近 1 说明 0/1 越均衡
    pub fn evenness(&self) -> Option<f64> {
        self.balance().map(|b| 1.0 - b)
    }

    pub fn score(&self) -> u8 {
        match self.evenness() {
            Some(e) => (e * 100.0).min(100.0).round() as u8,
            None => 0,
        }
    }

    pub fn summary(&self) -> String {
        match self.evenness() {
            Some(e) => format!("LSB evenness {:.2} (zeros {}, ones {})", e, self.zeros, self.ones),
            None => EMPTY_GRID_SUMMARY.to_string(),
        }
    }
}

/// 统计每个像素前三个通道（忽略 alpha）的最低位
pub fn count_lsb(grid: &PixelGrid) -> LsbCounts {
    let mut counts = LsbCounts::default();
    for px in grid.pixels() {
        for &s in &px[..3] {
            if s & 1 == 0 { counts.zeros += 1 } else { counts.ones += 1 }
        }
    }
    counts
}

pub fn analyze_pixels(grid: &PixelGrid) -> SubScore {
    let counts = count_lsb(grid);
    SubScore { score: counts.score(), summary: counts.summary() }
}
