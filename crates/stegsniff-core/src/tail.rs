//! 尾部数据分析：结束标记之后的附加字节打分
use serde::Serialize;

use crate::container::{end_of_data, tail_region, ContainerFormat};
use crate::signatures::find_signature;
use crate::stats::{printable_fraction, shannon_entropy};
use crate::verdict::SubScore;

/// 各项规则阈值与加分
const LONG_TAIL_LEN: usize = 100;
const PRINTABLE_THRESHOLD: f64 = 0.3;
const ENTROPY_THRESHOLD: f64 = 6.5;
const BONUS_LONG: u32 = 25;
const BONUS_PRINTABLE: u32 = 25;
const BONUS_ENTROPY: u32 = 25;
const BONUS_SIGNATURE: u32 = 30;

pub(crate) const EMPTY_TAIL_SUMMARY: &str = "No extra data after the end-of-image marker.";

/// 尾部分析明细（只读）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailReport {
    pub format: ContainerFormat,
    pub eof_offset: Option<usize>,
    pub tail_len: usize,
    pub printable: f64,
    pub entropy: f64,
    pub signature: Option<&'static str>,
    pub score: u8,
}

impl TailReport {
    pub fn summary(&self) -> String {
        if self.tail_len == 0 {
            return EMPTY_TAIL_SUMMARY.to_string();
        }
        let sig = match self.signature {
            Some(name) => format!("signature: {name}"),
            None => "no known signature".to_string(),
        };
        format!(
            "{} bytes after end marker; printable {:.1}%; entropy {:.2}; {}",
            self.tail_len,
            self.printable * 100.0,
            self.entropy,
            sig
        )
    }

    pub fn to_sub_score(&self) -> SubScore {
        SubScore { score: self.score, summary: self.summary() }
    }
}

/// 单段尾部数据的统计量与得分
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailScore {
    pub score: u8,
    pub printable: f64,
    pub entropy: f64,
    pub signature: Option<&'static str>,
}

/// 对尾部数据逐条规则累加打分，最终截断到 100
pub fn score_tail(tail: &[u8]) -> TailScore {
    if tail.is_empty() {
        return TailScore { score: 0, printable: 0.0, entropy: 0.0, signature: None };
    }
    let printable = printable_fraction(tail);
    let entropy = shannon_entropy(tail);
    let signature = find_signature(tail);

    let mut score = 0u32;
    if tail.len() > LONG_TAIL_LEN { score += BONUS_LONG; }
    if printable > PRINTABLE_THRESHOLD { score += BONUS_PRINTABLE; }
    if entropy > ENTROPY_THRESHOLD { score += BONUS_ENTROPY; }
    if signature.is_some() { score += BONUS_SIGNATURE; }

    TailScore { score: score.min(100) as u8, printable, entropy, signature }
}

/// 完整尾部分析：识别格式 → 定位结束标记 → 提取尾部 → 打分
pub fn analyze_tail(bytes: &[u8]) -> TailReport {
    let format = ContainerFormat::detect(bytes);
    let eof_offset = end_of_data(bytes, format);
    let tail = tail_region(bytes, eof_offset);
    let TailScore { score, printable, entropy, signature } = score_tail(tail);
    TailReport { format, eof_offset, tail_len: tail.len(), printable, entropy, signature, score }
}
