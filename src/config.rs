//! 配置管理模块
//!
//! 提供CLI参数解析和翻译配置管理功能

// 标准库导入
use std::path::PathBuf;
use std::time::Duration;

// 第三方crate导入
use clap::{Args, Parser, Subcommand};

// 本地模块导入
use crate::api_constants::{api_config, service_config};

/// 本地翻译配置结构体
///
/// 汇总翻译、语言检测与防抖所需的运行参数，支持Builder模式进行链式配置。
///
/// # Examples
///
/// ```rust
/// use lingo_cli::config::LocalTranslationConfig;
///
/// let config = LocalTranslationConfig::new()
///     .source_language("en")
///     .target_language("hi")
///     .with_api_url("https://api.mymemory.translated.net/get")
///     .with_debounce_ms(300);
/// assert_eq!(config.target_lang(), "hi");
/// ```
#[derive(Debug, Clone)]
pub struct LocalTranslationConfig {
    /// 源语言代码
    source_lang: String,
    /// 目标语言代码
    target_lang: String,
    /// 翻译API服务地址
    api_url: String,
    /// 词典API服务地址
    dictionary_url: String,
    /// 防抖静默窗口
    debounce_window: Duration,
    /// 单次请求超时
    request_timeout: Duration,
    /// 是否启用检测缓存
    enable_cache: bool,
}

impl LocalTranslationConfig {
    /// 创建新的配置实例
    ///
    /// 返回具有默认值的配置实例：
    /// - 源语言: 英文 ("en")
    /// - 目标语言: 印地语 ("hi")
    /// - API地址: MyMemory公共接口
    /// - 防抖窗口: 500ms
    /// - 请求超时: 30s
    /// - 启用缓存: true
    pub fn new() -> Self {
        Self {
            source_lang: service_config::DEFAULT_SOURCE_LANG.to_string(),
            target_lang: service_config::DEFAULT_TARGET_LANG.to_string(),
            api_url: api_config::DEFAULT_API_URL.to_string(),
            dictionary_url: api_config::DICTIONARY_API_URL.to_string(),
            debounce_window: Duration::from_millis(service_config::DEBOUNCE_WINDOW_MS),
            request_timeout: Duration::from_secs(service_config::REQUEST_TIMEOUT_SECONDS),
            enable_cache: true,
        }
    }

    /// 获取源语言代码
    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    /// 获取目标语言代码
    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// 获取API地址
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// 获取词典API地址
    pub fn dictionary_url(&self) -> &str {
        &self.dictionary_url
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// 检查是否启用缓存
    pub fn is_cache_enabled(&self) -> bool {
        self.enable_cache
    }

    /// 设置源语言代码
    pub fn source_language(mut self, lang: &str) -> Self {
        self.source_lang = lang.to_string();
        self
    }

    /// 设置目标语言代码
    pub fn target_language(mut self, lang: &str) -> Self {
        self.target_lang = lang.to_string();
        self
    }

    /// 设置API地址
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    /// 设置词典API地址
    pub fn with_dictionary_url(mut self, url: &str) -> Self {
        self.dictionary_url = url.to_string();
        self
    }

    /// 设置防抖窗口（毫秒）
    pub fn with_debounce_ms(mut self, millis: u64) -> Self {
        self.debounce_window = Duration::from_millis(millis);
        self
    }

    /// 设置请求超时（秒）
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout = Duration::from_secs(secs);
        self
    }

    /// 设置是否启用缓存
    pub fn enable_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }
}

impl Default for LocalTranslationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// CLI参数结构
#[derive(Parser)]
#[command(author, version, about = "命令行翻译助手 - 语言检测、实时翻译、分享链接", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 翻译API地址
    #[arg(short, long, global = true, default_value = api_config::DEFAULT_API_URL)]
    pub api: String,

    /// 词典API地址
    #[arg(long, global = true, default_value = api_config::DICTIONARY_API_URL)]
    pub dictionary_api: String,

    /// 防抖窗口（毫秒）
    #[arg(long, global = true, default_value_t = service_config::DEBOUNCE_WINDOW_MS)]
    pub debounce_ms: u64,

    /// 请求超时时间（秒）
    #[arg(long, global = true, default_value_t = service_config::REQUEST_TIMEOUT_SECONDS)]
    pub timeout: u64,

    /// 禁用语言检测缓存
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// 覆盖系统区域设置 (如: en_US.UTF-8)
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// 详细输出模式
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 静默模式 (仅输出结果)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// 显示会话统计
    #[arg(long, global = true)]
    pub stats: bool,
}

impl Cli {
    /// 根据命令行参数构建翻译配置
    pub fn to_config(&self) -> LocalTranslationConfig {
        LocalTranslationConfig::new()
            .with_api_url(&self.api)
            .with_dictionary_url(&self.dictionary_api)
            .with_debounce_ms(self.debounce_ms)
            .with_timeout_secs(self.timeout)
            .enable_cache(!self.no_cache)
    }
}

/// 子命令
#[derive(Subcommand)]
pub enum Command {
    /// 翻译一段文本或一个文件
    Translate(TranslateArgs),

    /// 检测文本语言
    Detect {
        /// 待检测文本
        text: String,
    },

    /// 实时翻译：从标准输入逐行读取文本，`:from xx` / `:to xx` 切换语言
    Live {
        /// 源语言代码；指定后不再被自动检测覆盖
        #[arg(short, long)]
        from: Option<String>,

        #[arg(short, long, default_value = service_config::DEFAULT_TARGET_LANG)]
        to: String,
    },

    /// 生成分享链接
    Share {
        #[arg(long)]
        text: String,

        #[arg(short, long, default_value = service_config::DEFAULT_SOURCE_LANG)]
        from: String,

        #[arg(short, long, default_value = service_config::DEFAULT_TARGET_LANG)]
        to: String,

        /// 分享链接站点
        #[arg(long, default_value = api_config::DEFAULT_SHARE_BASE_URL)]
        base: String,
    },

    /// 打开分享链接并翻译其中的文本
    Open {
        /// 分享链接或查询字符串
        link: String,
    },

    /// 翻译并导出翻译报告
    Export {
        #[command(flatten)]
        input: TranslateArgs,

        /// 报告输出路径
        #[arg(short, long, value_name = "FILE", default_value = "translation.txt")]
        output: PathBuf,
    },

    /// 为指定语言挑选朗读语音
    Voices {
        /// 语言代码
        lang: String,

        /// 可用语音的语言标签，逗号分隔 (如: en-US,hi-IN)
        #[arg(long, value_delimiter = ',')]
        available: Vec<String>,
    },
}

/// 翻译输入参数
#[derive(Args, Clone)]
pub struct TranslateArgs {
    /// 待翻译文本
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// 输入文件 (.txt / .pdf，另支持 .html)
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// 源语言代码
    #[arg(short, long, default_value = service_config::DEFAULT_SOURCE_LANG)]
    pub from: String,

    /// 目标语言代码
    #[arg(short, long, default_value = service_config::DEFAULT_TARGET_LANG)]
    pub to: String,

    /// 翻译前自动检测源语言（检测失败时保留 --from）
    #[arg(long)]
    pub detect: bool,
}
