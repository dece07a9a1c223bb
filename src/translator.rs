//! 翻译模块
//!
//! 定义翻译协作者接口、MyMemory 客户端实现，以及手动翻译流程。

// 标准库导入
use std::time::Duration;

// 第三方crate导入
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

// 本地模块导入
use crate::api_constants::error_messages;
use crate::error::Result;
use crate::translation_error;

/// 翻译协作者接口
#[async_trait]
pub trait Translate: Send + Sync {
    /// 将文本从 `from` 翻译为 `to`
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: Option<MyMemoryData>,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// MyMemory 翻译API客户端
#[derive(Clone)]
pub struct MyMemoryClient {
    client: Client,
    api_url: String,
}

impl MyMemoryClient {
    /// 创建翻译客户端
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| translation_error!(network, format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }

    /// 构造请求地址: `{api}?q=<text>&langpair=<from>|<to>`
    pub fn request_url(&self, text: &str, from: &str, to: &str) -> Result<Url> {
        let langpair = format!("{}|{}", from, to);
        Ok(Url::parse_with_params(
            &self.api_url,
            &[("q", text), ("langpair", langpair.as_str())],
        )?)
    }

    /// 从响应体中取出译文；缺少译文字段时返回固定提示 "Translation failed."
    fn parse_response(&self, body: &str) -> Result<String> {
        let parsed: MyMemoryResponse = serde_json::from_str(body).map_err(|e| {
            translation_error!(translation_api, 200, format!("响应解析失败: {}", e), self.api_url)
        })?;

        let translated = parsed
            .response_data
            .and_then(|data| data.translated_text)
            .filter(|text| !text.is_empty());

        Ok(translated.unwrap_or_else(|| {
            warn!("⚠️  翻译API响应缺少译文字段");
            error_messages::TRANSLATION_FAILED.to_string()
        }))
    }
}

#[async_trait]
impl Translate for MyMemoryClient {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let url = self.request_url(text, from, to)?;
        debug!("🌐 翻译请求: {} -> {} ({} 字符)", from, to, text.chars().count());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(translation_error!(
                translation_api,
                status.as_u16(),
                format!("翻译API返回错误状态: {}", status),
                self.api_url
            ));
        }

        let body = response.text().await?;
        self.parse_response(&body)
    }
}

/// 手动翻译的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// 翻译成功
    Translated(String),
    /// 输入为空，未发起请求
    EmptyInput,
    /// 翻译API返回空结果
    NoTranslation,
    /// 翻译调用失败
    Failed,
}

impl TranslationOutcome {
    /// 展示给用户的文本
    pub fn as_str(&self) -> &str {
        match self {
            TranslationOutcome::Translated(text) => text.as_str(),
            TranslationOutcome::EmptyInput => error_messages::EMPTY_INPUT,
            TranslationOutcome::NoTranslation => error_messages::NO_TRANSLATION,
            TranslationOutcome::Failed => error_messages::TRANSLATION_ERROR,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, TranslationOutcome::Translated(_))
    }
}

/// 手动翻译：空白输入直接返回提示，调用失败返回固定错误文本
pub async fn translate_on_demand<T: Translate + ?Sized>(
    translator: &T,
    text: &str,
    from: &str,
    to: &str,
) -> TranslationOutcome {
    if text.trim().is_empty() {
        return TranslationOutcome::EmptyInput;
    }

    match translator.translate(text, from, to).await {
        Ok(translated) if translated.trim().is_empty() => TranslationOutcome::NoTranslation,
        Ok(translated) => TranslationOutcome::Translated(translated),
        Err(e) => {
            warn!("❌ 翻译失败: {}", e);
            TranslationOutcome::Failed
        }
    }
}

/// 交换源语言和目标语言；两侧文本都非空时一并交换文本
pub fn swap_languages(
    from: &mut String,
    to: &mut String,
    input: &mut String,
    output: &mut String,
) {
    std::mem::swap(from, to);
    if !input.is_empty() && !output.is_empty() {
        std::mem::swap(input, output);
    }
}
