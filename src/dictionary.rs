//! 词典查询模块
//!
//! 第二层语言检测依赖的外部协作者：给定一个小写单词，判断它是否为词典中的英文词条。

// 标准库导入
use std::time::Duration;

// 第三方crate导入
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

// 本地模块导入
use crate::error::Result;
use crate::translation_error;

/// 词典查询接口
#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    /// 查询单词是否存在；网络失败返回错误，由调用方决定如何降级
    async fn is_word(&self, word: &str) -> Result<bool>;
}

/// 基于 dictionaryapi.dev 的词典客户端
#[derive(Clone)]
pub struct DictionaryClient {
    client: Client,
    base_url: String,
}

impl DictionaryClient {
    /// 创建词典客户端
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| translation_error!(network, format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 拼接单词查询地址，单词按路径段进行百分号编码
    pub fn entry_url(&self, word: &str) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| translation_error!(config, "dictionary_api", "地址不能作为路径前缀"))?
            .push(word);
        Ok(url)
    }
}

#[async_trait]
impl DictionaryLookup for DictionaryClient {
    async fn is_word(&self, word: &str) -> Result<bool> {
        let url = self.entry_url(word)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| translation_error!(dictionary_api, word, e))?;

        let status = response.status();
        debug!("📖 词典查询 {} -> {}", word, status);

        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        Ok(status.is_success())
    }
}
