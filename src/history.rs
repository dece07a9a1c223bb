//! 最近翻译记录

// 标准库导入
use std::collections::VecDeque;

// 第三方crate导入
use chrono::{DateTime, Local};
use serde::Serialize;

// 本地模块导入
use crate::api_constants::service_config::RECENT_TRANSLATIONS_LIMIT;

/// 一条翻译记录
#[derive(Debug, Clone, Serialize)]
pub struct RecentTranslation {
    pub text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub created_at: DateTime<Local>,
}

impl RecentTranslation {
    pub fn new(text: &str, translated_text: &str, source_lang: &str, target_lang: &str) -> Self {
        Self {
            text: text.to_string(),
            translated_text: translated_text.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            created_at: Local::now(),
        }
    }

    fn same_request(&self, other: &RecentTranslation) -> bool {
        self.text == other.text
            && self.source_lang == other.source_lang
            && self.target_lang == other.target_lang
    }
}

/// 有容量上限的最近翻译列表，最新的排在最前
#[derive(Debug, Clone)]
pub struct RecentTranslations {
    items: VecDeque<RecentTranslation>,
    limit: usize,
}

impl RecentTranslations {
    pub fn new(limit: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// 记录一次翻译；相同请求会被移到最前并更新译文
    pub fn push(&mut self, entry: RecentTranslation) {
        self.items.retain(|item| !item.same_request(&entry));
        self.items.push_front(entry);
        self.items.truncate(self.limit);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentTranslation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 序列化为JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.items)
    }
}

impl Default for RecentTranslations {
    fn default() -> Self {
        Self::new(RECENT_TRANSLATIONS_LIMIT)
    }
}
