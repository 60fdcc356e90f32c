//! 字节统计（可打印占比 + Shannon 熵）

/// 可打印 ASCII 占比：取值落在 [32,126] 的字节数 / 总字节数
/// - 空输入返回 0（不做除零）
pub fn printable_fraction(bytes: &[u8]) -> f64 {
    if bytes.is_empty() { return 0.0; }
    let printable = bytes.iter().filter(|&&b| (0x20..=0x7E).contains(&b)).count();
    printable as f64 / bytes.len() as f64
}

/// Shannon 熵（bit/字节），结果位于 [0,8]
/// 空输入按长度 1 计分母，结果为 0
pub fn shannon_entropy(bytes: &[u8]) -> f64 {
    let mut counts = [0u64; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    let total = bytes.len().max(1) as f64;
    let mut h = 0.0f64;
    for &c in counts.iter() {
        if c == 0 { continue; }
        let p = c as f64 / total;
        h -= p * p.log2();
    }
    // 单值序列会得到 -0.0，这里统一为 0
    h.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_empty_is_zero() {
        assert_eq!(printable_fraction(&[]), 0.0);
    }

    #[test]
    fn printable_all_ascii() {
        assert_eq!(printable_fraction(b"hello, world ~"), 1.0);
    }

    #[test]
    fn printable_boundaries() {
        // 31 与 127 不可打印，32 与 126 可打印
        let v = [31u8, 32, 126, 127];
        assert!((printable_fraction(&v) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn entropy_empty_and_constant() {
        assert_eq!(shannon_entropy(&[]), 0.0);
        assert_eq!(shannon_entropy(&[0xAA; 1000]), 0.0);
    }

    #[test]
    fn entropy_two_symbols_is_one_bit() {
        let v: Vec<u8> = (0..1000).map(|i| if i % 2 == 0 { b'a' } else { b'b' }).collect();
        assert!((shannon_entropy(&v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn entropy_uniform_is_eight() {
        let v: Vec<u8> = (0..256 * 64).map(|i| (i % 256) as u8).collect();
        let h = shannon_entropy(&v);
        assert!((h - 8.0).abs() < 1e-9, "h = {h}");
    }

    #[test]
    fn entropy_pseudo_random_near_eight() {
        // 线性同余生成器，避免引入随机数依赖
        let mut x: u32 = 0x1234_5678;
        let v: Vec<u8> = (0..100_000)
            .map(|_| {
                x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (x >> 24) as u8
            })
            .collect();
        let h = shannon_entropy(&v);
        assert!(h > 7.9 && h <= 8.0, "h = {h}");
    }
}
