//! 容器格式识别与数据结束位置定位
use serde::Serialize;

const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
/// JPEG EOI 标记
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
/// PNG IEND 块类型
const PNG_IEND: [u8; 4] = *b"IEND";
/// IEND 块记录长度：长度(4) + 类型(4) + CRC(4)
const PNG_IEND_RECORD: usize = 12;

/// 容器格式（由文件开头的魔数决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Png,
    Jpeg,
    Unknown,
}

impl ContainerFormat {
    /// 根据前缀魔数识别格式（JPEG 第 4 字节任意）
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&PNG_MAGIC) {
            ContainerFormat::Png
        } else if bytes.starts_with(&JPEG_MAGIC) {
            ContainerFormat::Jpeg
        } else {
            ContainerFormat::Unknown
        }
    }
}

/// 定位逻辑数据结束位置（结束标记之后的第一个字节）
/// - JPEG：从末尾向前找最后一个 FF D9，结束位置 = 下标 + 2
/// - PNG：offset 从 len-12 向前，检查 offset+4..offset+8 是否为 IEND，结束位置 = offset + 12
/// - Unknown 或未找到：None
pub fn end_of_data(bytes: &[u8], format: ContainerFormat) -> Option<usize> {
    match format {
        ContainerFormat::Jpeg => {
            if bytes.len() < JPEG_EOI.len() { return None; }
            (0..=bytes.len() - JPEG_EOI.len())
                .rev()
                .find(|&i| bytes[i..i + JPEG_EOI.len()] == JPEG_EOI)
                .map(|i| i + JPEG_EOI.len())
        }
        ContainerFormat::Png => {
            if bytes.len() < PNG_IEND_RECORD { return None; }
            (0..=bytes.len() - PNG_IEND_RECORD)
                .rev()
                .find(|&off| bytes[off + 4..off + 8] == PNG_IEND)
                .map(|off| off + PNG_IEND_RECORD)
        }
        ContainerFormat::Unknown => None,
    }
}

/// 结束标记之后的尾部数据；结束位置不在 (0, len) 内时为空
pub fn tail_region(bytes: &[u8], eof: Option<usize>) -> &[u8] {
    match eof {
        Some(off) if off > 0 && off < bytes.len() => &bytes[off..],
        _ => &[],
    }
}
