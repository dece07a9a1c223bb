/// 外部服务与翻译流程的常量配置
///
/// 该文件集中定义了翻译API、词典API、防抖窗口和面向用户的固定提示文本

/// 外部API配置
pub mod api_config {
    /// 默认翻译API地址 (MyMemory)
    pub const DEFAULT_API_URL: &str = "https://api.mymemory.translated.net/get";

    /// 词典查询API地址（单词拼接在路径末尾）
    pub const DICTIONARY_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

    /// 分享链接的默认站点
    pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:3000";
}

/// 翻译服务配置
pub mod service_config {
    /// 默认源语言
    pub const DEFAULT_SOURCE_LANG: &str = "en";

    /// 默认目标语言
    pub const DEFAULT_TARGET_LANG: &str = "hi";

    /// 支持的语言代码及名称
    pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
        ("en", "English"),
        ("hi", "Hindi"),
        ("fr", "French"),
        ("es", "Spanish"),
        ("de", "German"),
        ("ar", "Arabic"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("zh", "Chinese"),
        ("ru", "Russian"),
        ("it", "Italian"),
        ("pt", "Portuguese"),
        ("tr", "Turkish"),
        ("vi", "Vietnamese"),
        ("th", "Thai"),
    ];

    /// 防抖静默窗口（毫秒）
    pub const DEBOUNCE_WINDOW_MS: u64 = 500;

    /// 请求超时时间（秒）
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// 最近翻译记录的保留条数
    pub const RECENT_TRANSLATIONS_LIMIT: usize = 5;
}

/// 语言检测配置
pub mod detection_config {
    /// 触发检测的最短文本长度（字符）
    pub const MIN_TEXT_CHARS: usize = 3;

    /// 检测结果缓存键的前缀长度（字符）
    pub const CACHE_KEY_CHARS: usize = 50;

    /// 词典启发式每次最多抽取的单词数
    pub const MAX_SAMPLE_WORDS: usize = 5;

    /// 候选单词的最短长度
    pub const MIN_WORD_CHARS: usize = 3;

    /// 常见英文虚词，命中即视为英文，无需查询词典
    pub const COMMON_ENGLISH_WORDS: &[&str] = &[
        "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
        "with", "he", "as", "you", "do", "at",
    ];
}

/// 面向用户的固定提示文本
pub mod error_messages {
    /// 手动翻译时输入为空
    pub const EMPTY_INPUT: &str = "Please enter text to translate.";

    /// 手动翻译调用失败
    pub const TRANSLATION_ERROR: &str = "An error occurred during translation.";

    /// 翻译结果为空
    pub const NO_TRANSLATION: &str = "No translation found.";

    /// 翻译API响应缺少译文字段
    pub const TRANSLATION_FAILED: &str = "Translation failed.";

    /// 实时翻译调用失败
    pub const LIVE_TRANSLATION_FAILED: &str = "Live translation failed.";

    /// 不支持的文件类型
    pub const UNSUPPORTED_FILE: &str = "Only .txt and .pdf files are supported.";
}

/// 验证API URL是否有效
pub fn is_valid_api_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// 验证语言代码是否支持
pub fn is_supported_language(lang: &str) -> bool {
    service_config::SUPPORTED_LANGUAGES
        .iter()
        .any(|(code, _)| *code == lang)
}

/// 获取语言名称
pub fn language_name(lang: &str) -> Option<&'static str> {
    service_config::SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, _)| *code == lang)
        .map(|(_, name)| *name)
}
