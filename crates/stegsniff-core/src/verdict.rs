//! 综合评分与结论
use serde::Serialize;

use crate::pixels::{analyze_pixels, PixelGrid};
use crate::tail::analyze_tail;

/// 权重与分级阈值（固定策略常量）
const TAIL_WEIGHT: f64 = 0.6;
const LSB_WEIGHT: f64 = 0.4;
const ALERT_MIN: u8 = 60;
const WARN_MIN: u8 = 30;

const ALERT_MESSAGE: &str = "High likelihood of hidden data, treat this file as suspicious.";
const WARN_MESSAGE: &str = "Some indicators of hidden data, inspect this file further.";
const SAFE_MESSAGE: &str = "No significant indicators of hidden data.";

/// 子评分：[0,100] 整数 + 可读摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubScore {
    pub score: u8,
    pub summary: String,
}

/// 结论等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Safe,
    Warn,
    Alert,
}

impl Level {
    pub fn from_score(score: u8) -> Self {
        if score >= ALERT_MIN {
            Level::Alert
        } else if score >= WARN_MIN {
            Level::Warn
        } else {
            Level::Safe
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Level::Alert => ALERT_MESSAGE,
            Level::Warn => WARN_MESSAGE,
            Level::Safe => SAFE_MESSAGE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Alert => "alert",
            Level::Warn => "warn",
            Level::Safe => "safe",
        }
    }
}

/// 单次分析的最终结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub score: u8,
    pub level: Level,
    pub message: String,
    pub tail_summary: String,
    pub lsb_summary: String,
}

/// 合并两个子评分：round(min(100, tail*0.6 + lsb*0.4))
pub fn aggregate(tail: &SubScore, lsb: &SubScore) -> AnalysisResult {
    let combined = f64::from(tail.score) * TAIL_WEIGHT + f64::from(lsb.score) * LSB_WEIGHT;
    let score = combined.min(100.0).round() as u8;
    let level = Level::from_score(score);
    AnalysisResult {
        score,
        level,
        message: level.message().to_string(),
        tail_summary: tail.summary.clone(),
        lsb_summary: lsb.summary.clone(),
    }
}

/// 纯计算入口：原始字节 + 像素网格 → 结论
pub fn analyze(bytes: &[u8], grid: &PixelGrid) -> AnalysisResult {
    let tail = analyze_tail(bytes).to_sub_score();
    let lsb = analyze_pixels(grid);
    aggregate(&tail, &lsb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(score: u8) -> SubScore {
        SubScore { score, summary: format!("s{score}") }
    }

    #[test]
    fn aggregate_policy_points() {
        let r = aggregate(&sub(100), &sub(100));
        assert_eq!((r.score, r.level), (100, Level::Alert));
        let r = aggregate(&sub(0), &sub(0));
        assert_eq!((r.score, r.level), (0, Level::Safe));
        let r = aggregate(&sub(50), &sub(50));
        assert_eq!((r.score, r.level), (50, Level::Warn));
        assert_eq!(r.message, WARN_MESSAGE);
        assert_eq!(r.tail_summary, "s50");
    }

    #[test]
    fn aggregate_weights_and_rounding() {
        // 25*0.6 + 0*0.4 = 15
        assert_eq!(aggregate(&sub(25), &sub(0)).score, 15);
        // 0*0.6 + 100*0.4 = 40
        assert_eq!(aggregate(&sub(0), &sub(100)).level, Level::Warn);
        // 55*0.6 + 67*0.4 = 33 + 26.8 = 59.8 → 60
        let r = aggregate(&sub(55), &sub(67));
        assert_eq!((r.score, r.level), (60, Level::Alert));
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(Level::from_score(29), Level::Safe);
        assert_eq!(Level::from_score(30), Level::Warn);
        assert_eq!(Level::from_score(59), Level::Warn);
        assert_eq!(Level::from_score(60), Level::Alert);
    }

    #[test]
    fn level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Alert).unwrap(), "\"alert\"");
    }

    #[test]
    fn analyze_is_repeatable() {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0xFF, 0xD9];
        bytes.extend_from_slice(&[b'z'; 120]);
        let grid = PixelGrid::from_pixels(2, 1, [[1, 2, 3, 255], [4, 5, 6, 255]]).unwrap();
        let a = analyze(&bytes, &grid);
        let b = analyze(&bytes, &grid);
        assert_eq!(a, b);
        // tail 50, lsb 100 → 30 + 40 = 70
        assert_eq!(a.score, 70);
        assert_eq!(a.level, Level::Alert);
    }
}
