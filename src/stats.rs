use std::time::Duration;

use crate::detector::DetectorStats;

/// 会话统计
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    pub translation_calls: usize,
    pub live_updates: usize,
    pub input_chars: usize,
    pub output_chars: usize,
    pub detector: DetectorStats,
}

impl SessionStats {
    /// 记录一次翻译的输入输出规模
    pub fn record_translation(&mut self, input: &str, output: &str) {
        self.translation_calls += 1;
        self.input_chars += input.chars().count();
        self.output_chars += output.chars().count();
    }
}

/// 打印会话统计
pub fn print_session_stats(stats: &SessionStats, total_duration: Duration) {
    println!("\n📊 会话统计报告:");
    println!("═══════════════════════════════════════");

    println!("🔤 翻译统计:");
    println!("   翻译请求: {} 次", stats.translation_calls);
    println!("   实时更新: {} 次", stats.live_updates);
    println!("   输入字符: {}", stats.input_chars);
    println!("   输出字符: {}", stats.output_chars);

    // 缓存统计
    let detector = &stats.detector;
    if detector.cache_hits + detector.cache_misses > 0 {
        let cache_hit_rate =
            detector.cache_hits as f64 / (detector.cache_hits + detector.cache_misses) as f64;
        println!("\n💾 语言检测缓存:");
        println!("   缓存命中: {} 次", detector.cache_hits);
        println!("   缓存未命中: {} 次", detector.cache_misses);
        println!("   命中率: {:.1}%", cache_hit_rate * 100.0);
        println!("   词典查询: {} 次", detector.dictionary_lookups);
    }

    println!("\n⏱️  总耗时: {}", format_duration(total_duration));
}

/// 格式化持续时间
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
    }

    #[test]
    fn test_record_translation() {
        let mut stats = SessionStats::default();
        stats.record_translation("hello", "नमस्ते");
        stats.record_translation("hi", "");
        assert_eq!(stats.translation_calls, 2);
        assert_eq!(stats.input_chars, 7);
        assert_eq!(stats.output_chars, 6);
    }
}
