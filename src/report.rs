//! 翻译报告导出
//!
//! 生成纯文本的翻译报告；PDF渲染交由外部工具完成。

// 标准库导入
use std::path::Path;

// 第三方crate导入
use chrono::{DateTime, Local};
use tracing::info;

// 本地模块导入
use crate::error::Result;
use crate::translation_error;

/// 报告标题
pub const REPORT_TITLE: &str = "Translation Report";

fn section(text: &str) -> &str {
    if text.trim().is_empty() {
        "None"
    } else {
        text
    }
}

/// 渲染报告正文，空的原文或译文显示为 "None"
pub fn render_report(original: &str, translated: &str, generated_at: DateTime<Local>) -> String {
    format!(
        "{}\nGenerated: {}\n\nOriginal Text:\n{}\n\nTranslated Text:\n{}\n",
        REPORT_TITLE,
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        section(original),
        section(translated),
    )
}

/// 把报告写入文件
pub fn write_report(path: &Path, original: &str, translated: &str) -> Result<()> {
    let report = render_report(original, translated, Local::now());
    std::fs::write(path, &report)
        .map_err(|e| translation_error!(file_op, path.display(), "写入", e))?;

    info!("💾 翻译报告已保存: {} ({} 字节)", path.display(), report.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_report() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let report = render_report("hello", "", at);

        assert_eq!(
            report,
            "Translation Report\nGenerated: 2024-05-01 09:30:00\n\n\
             Original Text:\nhello\n\nTranslated Text:\nNone\n"
        );
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation.txt");

        write_report(&path, "hello", "नमस्ते").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(REPORT_TITLE));
        assert!(content.contains("Translated Text:\nनमस्ते"));

        let bad = dir.path().join("missing-dir").join("out.txt");
        assert!(write_report(&bad, "a", "b").is_err());
    }
}
