//! 内嵌文件签名扫描（Aho-Corasick + 静态签名表）
//!
//! - 签名表按顺序排列，命中时以“最低偏移优先、同偏移按表序”为准。
//! - 自动机在首次使用时构建一次，之后跨线程共享。
//! - 仅报告起始偏移 < len - 8 的命中（尾部保留 8 字节余量）。

use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

/// 单条签名：名称 + 魔数前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub name: &'static str,
    pub magic: &'static [u8],
}

/// 已知内嵌文件签名（顺序即优先级）
pub const SIGNATURES: &[Signature] = &[
    Signature { name: "ZIP/APK", magic: &[0x50, 0x4B, 0x03, 0x04] },
    Signature { name: "PDF", magic: &[0x25, 0x50, 0x44, 0x46] },
    Signature { name: "RAR", magic: &[0x52, 0x61, 0x72, 0x21] },
    Signature { name: "EXE", magic: &[0x4D, 0x5A] },
];

/// 扫描时尾部需要保留的字节数
pub(crate) const SCAN_MARGIN: usize = 8;

fn automaton() -> &'static AhoCorasick {
    static AC: OnceLock<AhoCorasick> = OnceLock::new();
    AC.get_or_init(|| {
        // LeftmostFirst：最左命中，同起点时按模式顺序
        AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .build(SIGNATURES.iter().map(|s| s.magic))
            .expect("static signature table is valid")
    })
}

/// 在字节序列中查找第一个已知签名，返回签名名称
pub fn find_signature(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < SCAN_MARGIN { return None; }
    let limit = bytes.len() - SCAN_MARGIN;
    let m = automaton().find(bytes)?;
    // 最左命中都越界，则其余命中同样越界
    if m.start() >= limit { return None; }
    Some(SIGNATURES[m.pattern().as_usize()].name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_at_offset_ten() {
        let mut buf = vec![0x11u8; 32];
        buf[10..14].copy_from_slice(&[0x50, 0x4B, 0x03, 0x04]);
        assert_eq!(find_signature(&buf), Some("ZIP/APK"));
    }

    #[test]
    fn none_without_signatures() {
        let buf = vec![0x11u8; 64];
        assert_eq!(find_signature(&buf), None);
    }

    #[test]
    fn lowest_offset_wins() {
        let mut buf = vec![0u8; 40];
        buf[5..9].copy_from_slice(b"Rar!");
        buf[20..24].copy_from_slice(b"%PDF");
        assert_eq!(find_signature(&buf), Some("RAR"));
    }

    #[test]
    fn short_input_never_matches() {
        // 7 字节，即便开头就是签名也不报告
        assert_eq!(find_signature(b"%PDF-1."), None);
        // 8 字节：limit = 0，没有可用起点
        assert_eq!(find_signature(b"%PDF-1.4"), None);
        // 9 字节：偏移 0 可用
        assert_eq!(find_signature(b"%PDF-1.4\n"), Some("PDF"));
    }

    #[test]
    fn match_inside_margin_is_ignored() {
        let mut buf = vec![0u8; 20];
        // 起点 12 == len - 8，越界
        buf[12..14].copy_from_slice(b"MZ");
        assert_eq!(find_signature(&buf), None);
        buf[11..13].copy_from_slice(b"MZ");
        assert_eq!(find_signature(&buf), Some("EXE"));
    }
}
