//! 分享链接模块
//!
//! 把 (文本, 源语言, 目标语言) 编码为查询参数 `text` / `from` / `to`，并能从链接中还原。

// 第三方crate导入
use url::{form_urlencoded, Url};

// 本地模块导入
use crate::error::Result;

/// 从分享链接中解析出的参数，缺失的参数为 `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareParams {
    pub text: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// 生成分享链接: `{origin}/?text=..&from=..&to=..`
///
/// 只保留 `base_url` 的源（协议、主机、端口），路径和已有查询参数都会被替换。
pub fn generate_shareable_link(
    base_url: &str,
    text: &str,
    source_lang: &str,
    target_lang: &str,
) -> Result<String> {
    let mut url = Url::parse(base_url)?;
    url.set_path("/");
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("text", text)
        .append_pair("from", source_lang)
        .append_pair("to", target_lang);

    Ok(url.to_string())
}

/// 从完整链接、`?query` 或裸查询字符串中解析分享参数
///
/// 同名参数取第一个；无法解析的链接按没有任何参数处理。
pub fn params_from_url(link: &str) -> ShareParams {
    let link = link.trim();
    let query = if link.contains("://") {
        match Url::parse(link) {
            Ok(url) => url.query().unwrap_or_default().to_string(),
            Err(_) => String::new(),
        }
    } else {
        link.trim_start_matches('?').to_string()
    };

    let mut params = ShareParams::default();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match &*key {
            "text" => &mut params.text,
            "from" => &mut params.from,
            "to" => &mut params.to,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    params
}
