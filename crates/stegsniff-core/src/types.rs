//! 公共类型（对外暴露）
use serde::Serialize;

use crate::verdict::{AnalysisResult, Level};

/// 输出项结构（对应 result.json 的单个元素）
#[derive(Debug, Clone, Serialize)]
pub struct ReportItem<'a> {
    pub file: &'a str,
    pub score: u8,
    pub level: Level,
    pub message: &'a str,
    pub tail_summary: &'a str,
    pub lsb_summary: &'a str,
}

impl<'a> ReportItem<'a> {
    pub fn new(file: &'a str, result: &'a AnalysisResult) -> Self {
        Self {
            file,
            score: result.score,
            level: result.level,
            message: &result.message,
            tail_summary: &result.tail_summary,
            lsb_summary: &result.lsb_summary,
        }
    }
}
