//! 语言检测模块
//!
//! 三层回退的启发式检测：
//! 1. 字符集比例（见 [`crate::charset`]）
//! 2. 词典单词启发式（仅识别英文）
//! 3. 运行环境的区域设置
//!
//! 检测结果只是建议值，任何内部失败都会降级为 `None`，不会向调用方传播错误。
//! 两个缓存都归检测器实例所有，进程存活期间只增不减。

// 标准库导入
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// 第三方crate导入
use futures::future::join_all;
use regex::Regex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

// 本地模块导入
use crate::api_constants::detection_config::{
    CACHE_KEY_CHARS, COMMON_ENGLISH_WORDS, MAX_SAMPLE_WORDS, MIN_TEXT_CHARS, MIN_WORD_CHARS,
};
use crate::charset::detect_by_charset;
use crate::debounce::Debouncer;
use crate::dictionary::DictionaryLookup;
use crate::error::Result;
use crate::translation_error;

/// 区域设置来源
pub trait LocaleSource: Send + Sync {
    /// 返回区域标识，如 `en_US.UTF-8`
    fn locale(&self) -> Option<String>;
}

/// 从 `LC_ALL` / `LC_MESSAGES` / `LANG` 读取区域设置
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLocale;

impl LocaleSource for SystemLocale {
    fn locale(&self) -> Option<String> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.trim().is_empty())
    }
}

/// 固定的区域设置，用于 `--locale` 覆盖和测试
#[derive(Debug, Default, Clone)]
pub struct FixedLocale(pub Option<String>);

impl LocaleSource for FixedLocale {
    fn locale(&self) -> Option<String> {
        self.0.clone()
    }
}

/// 取区域标识的两字母语言前缀；`C` / `POSIX` 视为未设置
pub fn locale_language(locale: &str) -> Option<String> {
    let locale = locale.trim();
    if locale.eq_ignore_ascii_case("c") || locale.eq_ignore_ascii_case("posix") {
        return None;
    }

    let prefix: String = locale.chars().take(2).collect();
    if prefix.len() == 2 && prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(prefix.to_ascii_lowercase())
    } else {
        None
    }
}

/// 候选单词过滤规则
#[derive(Debug)]
struct WordFilter {
    /// 含数字或标点的单词不参与词典判断
    excluded_chars: Regex,
    /// 形似代码标识符的单词（`_x`、`$x`、`fooBAR`）
    code_like: Regex,
}

impl WordFilter {
    fn new() -> Result<Self> {
        let excluded_chars = Regex::new(r#"[0-9!@#$%^&*(),.?":{}|<>]"#)
            .map_err(|e| translation_error!(config, "word_filter", e))?;
        let code_like = Regex::new(r"^[_$]|[A-Z]{2,}")
            .map_err(|e| translation_error!(config, "word_filter", e))?;

        Ok(Self {
            excluded_chars,
            code_like,
        })
    }

    fn is_candidate(&self, word: &str) -> bool {
        word.chars().count() >= MIN_WORD_CHARS
            && !word.chars().next().map_or(false, |c| c.is_uppercase())
            && !self.excluded_chars.is_match(word)
    }

    /// 从文本中抽取最多 [`MAX_SAMPLE_WORDS`] 个候选单词
    fn sample<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_whitespace()
            .filter(|word| self.is_candidate(word))
            .take(MAX_SAMPLE_WORDS)
            .collect()
    }
}

/// 检测统计快照
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectorStats {
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub dictionary_lookups: usize,
}

#[derive(Debug, Default)]
struct Counters {
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    dictionary_lookups: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 语言检测器
pub struct LanguageDetector<D, L = SystemLocale> {
    dictionary: D,
    locale: L,
    filter: WordFilter,
    cache_enabled: bool,
    /// 文本前缀 -> 第一、二层检测结果（`None` 表示无结果）
    detection_cache: Mutex<HashMap<String, Option<String>>>,
    /// 小写单词 -> 是否为英文词
    word_cache: Mutex<HashMap<String, bool>>,
    counters: Counters,
}

impl<D: DictionaryLookup, L: LocaleSource> LanguageDetector<D, L> {
    /// 创建检测器
    pub fn new(dictionary: D, locale: L) -> Result<Self> {
        Ok(Self {
            dictionary,
            locale,
            filter: WordFilter::new()?,
            cache_enabled: true,
            detection_cache: Mutex::new(HashMap::new()),
            word_cache: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        })
    }

    /// 设置是否启用缓存
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// 检测文本语言
    pub async fn detect(&self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_TEXT_CHARS {
            return None;
        }

        let key: String = trimmed.chars().take(CACHE_KEY_CHARS).collect();
        let cached = if self.cache_enabled {
            lock(&self.detection_cache).get(&key).cloned()
        } else {
            None
        };

        let detected = match cached {
            Some(hit) => {
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                debug!("💾 检测缓存命中: {:?}", hit);
                hit
            }
            None => {
                self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);
                let computed = self.detect_uncached(trimmed).await;
                if self.cache_enabled {
                    lock(&self.detection_cache).insert(key, computed.clone());
                }
                computed
            }
        };

        detected.or_else(|| self.locale_fallback())
    }

    /// 第一、二层检测
    async fn detect_uncached(&self, text: &str) -> Option<String> {
        if let Some(lang) = detect_by_charset(text) {
            debug!("🔤 字符集识别: {}", lang);
            return Some(lang.to_string());
        }

        self.detect_by_dictionary(text).await.map(str::to_string)
    }

    /// 第二层：抽样单词中至少 ceil(n/3) 个是英文词则判定为英文
    async fn detect_by_dictionary(&self, text: &str) -> Option<&'static str> {
        let words = self.filter.sample(text);
        if words.is_empty() {
            return None;
        }

        let verdicts = join_all(words.iter().map(|word| self.is_english_word(word))).await;
        let english = verdicts.iter().filter(|is_english| **is_english).count();
        let required = (words.len() + 2) / 3;

        debug!("📖 词典启发式: {}/{} 个英文词 (需要 {})", english, words.len(), required);

        (english >= required).then_some("en")
    }

    /// 判断单词是否为英文；查询失败按"不是英文"处理且不缓存
    async fn is_english_word(&self, word: &str) -> bool {
        let original = word.trim();
        let normalized = original.to_lowercase();
        if normalized.is_empty() {
            return false;
        }

        if COMMON_ENGLISH_WORDS.contains(&normalized.as_str()) {
            return true;
        }

        if self.cache_enabled {
            if let Some(verdict) = lock(&self.word_cache).get(&normalized) {
                return *verdict;
            }
        }

        if self.filter.code_like.is_match(original) {
            self.remember_word(normalized, false);
            return false;
        }

        self.counters.dictionary_lookups.fetch_add(1, Ordering::Relaxed);
        match self.dictionary.is_word(&normalized).await {
            Ok(verdict) => {
                self.remember_word(normalized, verdict);
                verdict
            }
            Err(e) => {
                warn!("⚠️  词典查询失败: {}", e);
                false
            }
        }
    }

    fn remember_word(&self, word: String, verdict: bool) {
        if self.cache_enabled {
            lock(&self.word_cache).insert(word, verdict);
        }
    }

    /// 第三层：区域设置的语言前缀
    fn locale_fallback(&self) -> Option<String> {
        let lang = self.locale.locale().as_deref().and_then(locale_language);
        if let Some(ref lang) = lang {
            debug!("🌐 使用区域设置回退: {}", lang);
        }
        lang
    }

    /// 清空两个缓存
    pub fn reset_caches(&self) {
        lock(&self.detection_cache).clear();
        lock(&self.word_cache).clear();
    }

    /// 已缓存的检测结果数量
    pub fn cached_detections(&self) -> usize {
        lock(&self.detection_cache).len()
    }

    /// 已缓存的单词判定数量
    pub fn cached_words(&self) -> usize {
        lock(&self.word_cache).len()
    }

    /// 统计快照
    pub fn stats(&self) -> DetectorStats {
        DetectorStats {
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.counters.cache_misses.load(Ordering::Relaxed),
            dictionary_lookups: self.counters.dictionary_lookups.load(Ordering::Relaxed),
        }
    }
}

/// 一次防抖检测的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionUpdate {
    /// 被检测的文本
    pub text: String,
    /// 检测结果，`None` 表示保持当前语言选择
    pub lang: Option<String>,
}

/// 输入稳定后才执行检测，限制词典查询频率
pub struct DebouncedDetector<D, L = SystemLocale> {
    detector: Arc<LanguageDetector<D, L>>,
    debouncer: Debouncer,
    results: UnboundedSender<DetectionUpdate>,
}

impl<D, L> DebouncedDetector<D, L>
where
    D: DictionaryLookup + 'static,
    L: LocaleSource + 'static,
{
    pub fn new(
        detector: Arc<LanguageDetector<D, L>>,
        window: Duration,
        results: UnboundedSender<DetectionUpdate>,
    ) -> Self {
        Self {
            detector,
            debouncer: Debouncer::new(window),
            results,
        }
    }

    /// 提交最新文本；上一次尚未触发的检测被取消
    pub fn submit(&mut self, text: impl Into<String>) {
        let text = text.into();
        let detector = self.detector.clone();
        let results = self.results.clone();

        self.debouncer.schedule(async move {
            let lang = detector.detect(&text).await;
            let _ = results.send(DetectionUpdate { text, lang });
        });
    }

    /// 取消挂起的检测
    pub fn cancel(&mut self) -> bool {
        self.debouncer.cancel()
    }

    pub fn detector(&self) -> &Arc<LanguageDetector<D, L>> {
        &self.detector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use tokio::sync::mpsc;

    /// 记录调用次数的假词典
    #[derive(Default)]
    struct FakeDictionary {
        words: HashSet<&'static str>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeDictionary {
        fn with_words(words: &[&'static str]) -> Self {
            Self {
                words: words.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl DictionaryLookup for FakeDictionary {
        async fn is_word(&self, word: &str) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(translation_error!(dictionary_api, word, "offline"));
            }
            Ok(self.words.contains(word))
        }
    }

    #[async_trait]
    impl DictionaryLookup for Arc<FakeDictionary> {
        async fn is_word(&self, word: &str) -> Result<bool> {
            self.as_ref().is_word(word).await
        }
    }

    fn detector(dictionary: FakeDictionary) -> LanguageDetector<FakeDictionary, FixedLocale> {
        LanguageDetector::new(dictionary, FixedLocale(None)).unwrap()
    }

    fn calls(detector: &LanguageDetector<FakeDictionary, FixedLocale>) -> usize {
        detector.dictionary.calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_chinese_without_dictionary() {
        let detector = detector(FakeDictionary::default());
        assert_eq!(detector.detect("我们今天去公园散步").await.as_deref(), Some("zh"));
        assert_eq!(calls(&detector), 0);
    }

    #[tokio::test]
    async fn test_short_text_returns_none() {
        let detector = LanguageDetector::new(
            FakeDictionary::default(),
            FixedLocale(Some("fr_FR.UTF-8".to_string())),
        )
        .unwrap();

        assert_eq!(detector.detect("").await, None);
        assert_eq!(detector.detect("  hi  ").await, None);
        assert_eq!(detector.detect("你好").await, None);
        assert_eq!(calls(&detector), 0);
        assert_eq!(detector.cached_detections(), 0);
    }

    #[tokio::test]
    async fn test_english_by_dictionary() {
        let detector = detector(FakeDictionary::with_words(&["quick", "brown", "fox", "jumps"]));
        assert_eq!(
            detector.detect("the quick brown fox jumps").await.as_deref(),
            Some("en")
        );
        // "the" 命中常见词表，其余四个查询词典
        assert_eq!(calls(&detector), 4);
    }

    #[tokio::test]
    async fn test_idempotent_detection_hits_cache() {
        let detector = detector(FakeDictionary::with_words(&["quick", "brown", "fox", "jumps"]));

        let first = detector.detect("the quick brown fox jumps").await;
        let second = detector.detect("the quick brown fox jumps").await;

        assert_eq!(first, second);
        assert_eq!(calls(&detector), 4);
        assert_eq!(
            detector.stats(),
            DetectorStats {
                cache_hits: 1,
                cache_misses: 1,
                dictionary_lookups: 4,
            }
        );
    }

    #[tokio::test]
    async fn test_growing_text_shares_prefix_key() {
        let detector = detector(FakeDictionary::with_words(&["quick", "brown", "fox", "jumps"]));
        let text = "the quick brown fox jumps over the lazy dog and keeps running";
        assert!(text.chars().count() > CACHE_KEY_CHARS);

        let first = detector.detect(text).await;
        let lookups = calls(&detector);
        let second = detector.detect(&format!("{} far away", text)).await;

        // 前50个字符相同，直接命中缓存
        assert_eq!(first.as_deref(), Some("en"));
        assert_eq!(second, first);
        assert_eq!(calls(&detector), lookups);
        assert_eq!(detector.stats().cache_hits, 1);
        assert_eq!(detector.cached_detections(), 1);
    }

    #[tokio::test]
    async fn test_word_cache_shared_across_texts() {
        let detector = detector(FakeDictionary::with_words(&["quick", "brown"]));

        detector.detect("quick brown").await;
        detector.detect("brown quick dogs").await;

        // 第二次只需查询 "dogs"
        assert_eq!(calls(&detector), 3);
        assert_eq!(detector.cached_words(), 3);
    }

    #[tokio::test]
    async fn test_threshold_is_one_third() {
        let detector = detector(FakeDictionary::with_words(&["maison"]));
        // 5个候选词中仅1个判定为英文，需要 ceil(5/3) = 2
        assert_eq!(detector.detect("maison voiture jardin fenetre cuisine").await, None);

        let detector = self::detector(FakeDictionary::with_words(&["maison", "jardin"]));
        assert_eq!(
            detector.detect("maison voiture jardin fenetre cuisine").await.as_deref(),
            Some("en")
        );
    }

    #[tokio::test]
    async fn test_candidate_filtering() {
        let detector = detector(FakeDictionary::with_words(&["apple"]));
        // 专有名词、短词、带数字或标点的词都被跳过，只剩 "apple"
        assert_eq!(
            detector.detect("Paris is ok h2o end. apple").await.as_deref(),
            Some("en")
        );
        assert_eq!(calls(&detector), 1);
    }

    #[tokio::test]
    async fn test_code_like_words_skip_lookup() {
        let detector = detector(FakeDictionary::with_words(&["parseJSON"]));
        assert_eq!(detector.detect("_private parseJSON").await, None);
        assert_eq!(calls(&detector), 0);
        assert_eq!(detector.cached_words(), 2);
    }

    #[tokio::test]
    async fn test_dictionary_failure_degrades() {
        let detector = detector(FakeDictionary::failing());
        assert_eq!(detector.detect("quick brown jumps").await, None);
        assert_eq!(calls(&detector), 3);
        // 失败的查询不进入单词缓存
        assert_eq!(detector.cached_words(), 0);
    }

    #[tokio::test]
    async fn test_locale_fallback() {
        let detector = LanguageDetector::new(
            FakeDictionary::default(),
            FixedLocale(Some("de_DE.UTF-8".to_string())),
        )
        .unwrap();
        assert_eq!(detector.detect("Berlin Hamburg").await.as_deref(), Some("de"));
        // 缓存的是"无结果"，回退在每次调用时重新计算
        assert_eq!(detector.detect("Berlin Hamburg").await.as_deref(), Some("de"));
        assert_eq!(detector.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_reset_and_disabled_cache() {
        let detector = detector(FakeDictionary::with_words(&["quick"])).with_cache(false);
        detector.detect("quick quick").await;
        detector.detect("quick quick").await;
        assert_eq!(calls(&detector), 4);
        assert_eq!(detector.cached_detections(), 0);

        let detector = self::detector(FakeDictionary::with_words(&["quick"]));
        detector.detect("quick thing").await;
        assert!(detector.cached_detections() > 0);
        detector.reset_caches();
        assert_eq!(detector.cached_detections(), 0);
        assert_eq!(detector.cached_words(), 0);
    }

    #[test]
    fn test_locale_language() {
        assert_eq!(locale_language("en_US.UTF-8").as_deref(), Some("en"));
        assert_eq!(locale_language("pt-BR").as_deref(), Some("pt"));
        assert_eq!(locale_language("HI").as_deref(), Some("hi"));
        assert_eq!(locale_language("C"), None);
        assert_eq!(locale_language("POSIX"), None);
        assert_eq!(locale_language("1"), None);
        assert_eq!(locale_language(""), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_detection_only_settled_text() {
        let dictionary = Arc::new(FakeDictionary::with_words(&["quick", "brown"]));
        let detector =
            Arc::new(LanguageDetector::new(dictionary.clone(), FixedLocale(None)).unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debounced = DebouncedDetector::new(detector, Duration::from_millis(500), tx);

        debounced.submit("qui");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debounced.submit("quick bro");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debounced.submit("quick brown");
        tokio::time::sleep(Duration::from_millis(600)).await;

        let update = rx.try_recv().unwrap();
        assert_eq!(update.text, "quick brown");
        assert_eq!(update.lang.as_deref(), Some("en"));
        assert!(rx.try_recv().is_err());
        assert_eq!(dictionary.calls.load(Ordering::SeqCst), 2);
        assert_eq!(debounced.detector().stats().cache_misses, 1);
    }
}
