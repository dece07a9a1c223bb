//! 字符集语言识别（第一层检测）
//!
//! 去除空白、标点和数字后，统计落在各语言Unicode区间内的字符比例。
//! 规则按固定优先级依次判断，第一个达到阈值的语言胜出，而不是比例最高的语言。

use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use regex::Regex;

/// 单个语言的字符集规则
#[derive(Debug)]
pub struct ScriptRule {
    /// 语言代码
    pub lang: &'static str,
    /// 该语言占用的Unicode区间
    pub ranges: &'static [RangeInclusive<char>],
    /// 判定所需的最低匹配比例
    pub threshold: f64,
}

impl ScriptRule {
    fn matches(&self, c: char) -> bool {
        self.ranges.iter().any(|range| range.contains(&c))
    }
}

/// 按优先级排列的字符集规则
pub const SCRIPT_RULES: &[ScriptRule] = &[
    ScriptRule { lang: "zh", ranges: &['\u{4E00}'..='\u{9FFF}'], threshold: 0.5 },
    ScriptRule {
        lang: "ja",
        ranges: &['\u{3040}'..='\u{309F}', '\u{30A0}'..='\u{30FF}'],
        threshold: 0.2,
    },
    ScriptRule {
        lang: "ko",
        ranges: &['\u{3131}'..='\u{3163}', '\u{AC00}'..='\u{D7A3}'],
        threshold: 0.3,
    },
    ScriptRule { lang: "ar", ranges: &['\u{0600}'..='\u{06FF}'], threshold: 0.5 },
    ScriptRule { lang: "hi", ranges: &['\u{0900}'..='\u{097F}'], threshold: 0.5 },
    ScriptRule { lang: "th", ranges: &['\u{0E00}'..='\u{0E7F}'], threshold: 0.5 },
    ScriptRule { lang: "he", ranges: &['\u{0590}'..='\u{05FF}'], threshold: 0.5 },
    ScriptRule { lang: "ru", ranges: &['\u{0400}'..='\u{04FF}'], threshold: 0.5 },
    ScriptRule { lang: "el", ranges: &['\u{0370}'..='\u{03FF}'], threshold: 0.5 },
];

/// 空白、Unicode标点（`\p{P}`）和ASCII数字
static NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\p{P}0-9]").expect("Failed to compile noise pattern"));

fn clean_text(text: &str) -> Vec<char> {
    NOISE.replace_all(text, "").chars().collect()
}

/// 计算每种语言的字符匹配比例，顺序与 [`SCRIPT_RULES`] 一致
///
/// 清洗后为空的文本返回空列表。
pub fn script_ratios(text: &str) -> Vec<(&'static str, f64)> {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let total = cleaned.len() as f64;
    SCRIPT_RULES
        .iter()
        .map(|rule| {
            let hits = cleaned.iter().filter(|c| rule.matches(**c)).count();
            (rule.lang, hits as f64 / total)
        })
        .collect()
}

/// 根据字符集识别语言
pub fn detect_by_charset(text: &str) -> Option<&'static str> {
    let ratios = script_ratios(text);

    SCRIPT_RULES
        .iter()
        .zip(ratios)
        .find(|(rule, (_, ratio))| *ratio >= rule.threshold)
        .map(|(rule, _)| rule.lang)
}
