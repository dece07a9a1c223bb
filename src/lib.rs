//! lingo-cli - 命令行翻译助手库
//!
//! 这个库提供了启发式语言检测、防抖的实时翻译、分享链接编解码、文件文本提取和翻译报告导出等核心功能。

pub mod api_constants;
pub mod charset;
pub mod config;
pub mod debounce;
pub mod detector;
pub mod dictionary;
pub mod error;
pub mod extract;
pub mod history;
pub mod live;
pub mod report;
pub mod share;
pub mod stats;
pub mod translator;
pub mod utils;
pub mod voice;
