use std::path::PathBuf;

use tracing::warn;

use crate::error::Result;
use crate::extract::extract_text;
use crate::translation_error;

/// 待翻译内容的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// 命令行直接给出的文本
    Text(String),
    /// 本地文件路径
    File(PathBuf),
}

/// 初始化日志系统
pub fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 验证输入源：文本与文件二选一
pub fn validate_input_source(text: Option<&str>, file: Option<&PathBuf>) -> Result<InputSource> {
    match (text, file) {
        (Some(text), None) => Ok(InputSource::Text(text.to_string())),
        (None, Some(path)) => {
            let absolute_path = if path.is_absolute() {
                path.clone()
            } else {
                std::env::current_dir()?.join(path)
            };
            validate_input_file(&absolute_path)?;
            Ok(InputSource::File(absolute_path))
        }
        (None, None) => Err(translation_error!(input_validation, "", "需要 --text 或 --file")),
        (Some(_), Some(_)) => Err(translation_error!(
            input_validation,
            "--text/--file",
            "--text 与 --file 不能同时使用"
        )),
    }
}

/// 验证输入文件
pub fn validate_input_file(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        return Err(translation_error!(input_validation, path.display(), "输入文件不存在"));
    }

    if !path.is_file() {
        return Err(translation_error!(input_validation, path.display(), "输入路径不是文件"));
    }

    if let Some(ext) = path.extension() {
        let ext = ext.to_string_lossy().to_lowercase();
        if !matches!(ext.as_str(), "txt" | "pdf" | "html" | "htm") {
            warn!("⚠️  不支持的文件扩展名: {}", ext);
        }
    }

    Ok(())
}

/// 读取输入源的文本
pub fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::Text(text) => Ok(text.clone()),
        InputSource::File(path) => extract_text(path),
    }
}
