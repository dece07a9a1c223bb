//! 朗读语音选择
//!
//! 语音合成本身由外部引擎完成，这里只负责从可用语音中挑选与语言匹配的一个。

/// 一个可用的朗读语音
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// 语音名称
    pub name: String,
    /// BCP 47 语言标签，如 `hi-IN`
    pub lang: String,
}

impl Voice {
    pub fn new(name: &str, lang: &str) -> Self {
        Self {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }
}

/// 挑选语音：先精确匹配语言标签，再匹配包含该代码的标签；印地语找不到时退回英文
pub fn select_voice<'a>(voices: &'a [Voice], lang: &str) -> Option<&'a Voice> {
    let wanted = lang.to_lowercase();

    voices
        .iter()
        .find(|voice| voice.lang.to_lowercase() == wanted)
        .or_else(|| {
            voices
                .iter()
                .find(|voice| voice.lang.to_lowercase().contains(&wanted))
        })
        .or_else(|| {
            if wanted == "hi" {
                voices
                    .iter()
                    .find(|voice| voice.lang.to_lowercase().contains("en"))
            } else {
                None
            }
        })
}
