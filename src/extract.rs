//! 内容提取模块
//!
//! 把上传的文件转换为纯文本：`.txt` 直接读取，`.pdf` 逐页提取文本，
//! `.html` / `.htm` 解析DOM后收集可见文本。图片OCR属于外部服务，这里不处理。

// 标准库导入
use std::collections::VecDeque;
use std::path::Path;

// 第三方crate导入
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use lopdf::Document;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::{debug, info};

// 本地模块导入
use crate::api_constants::error_messages;
use crate::error::Result;
use crate::translation_error;

/// 不包含可见文本的元素
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// 块级元素，前后插入换行
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "section", "article", "header", "footer", "blockquote", "pre",
];

/// 根据文件扩展名提取文本
pub fn extract_text(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let read = |path: &Path| {
        std::fs::read_to_string(path)
            .map_err(|e| translation_error!(file_op, path.display(), "读取", e))
    };

    let text = match extension.as_str() {
        "txt" => read(path)?,
        "pdf" => extract_pdf_text(path)?,
        "html" | "htm" => extract_html_text(&read(path)?)?,
        _ => {
            return Err(translation_error!(
                input_validation,
                path.display(),
                error_messages::UNSUPPORTED_FILE
            ))
        }
    };

    info!("📄 从 {} 提取了 {} 个字符", path.display(), text.chars().count());
    Ok(text)
}

/// 按页序提取PDF文本
pub fn extract_pdf_text(path: &Path) -> Result<String> {
    let document = Document::load(path)
        .map_err(|e| translation_error!(file_op, path.display(), "解析PDF", e))?;

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let text = document
        .extract_text(&pages)
        .map_err(|e| translation_error!(file_op, path.display(), "提取PDF文本", e))?;

    debug!("🔍 PDF文本提取完成: {} 页", pages.len());
    Ok(text.trim().to_string())
}

/// 解析HTML并收集可见文本，每个块级元素独占一行
pub fn extract_html_text(html: &str) -> Result<String> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| translation_error!(input_validation, "html", format!("HTML解析失败: {}", e)))?;

    let mut raw = String::new();
    collect_text(&dom.document, &mut raw);

    let lines: Vec<String> = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();

    debug!("🔍 HTML文本提取完成: {} 行", lines.len());
    Ok(lines.join("\n"))
}

/// 按文档顺序遍历DOM
fn collect_text(root: &Handle, out: &mut String) {
    // 栈中的 None 表示块级元素结束
    let mut stack: VecDeque<Option<Handle>> = VecDeque::new();
    stack.push_back(Some(root.clone()));

    while let Some(entry) = stack.pop_back() {
        let node = match entry {
            Some(node) => node,
            None => {
                out.push('\n');
                continue;
            }
        };

        match node.data {
            NodeData::Text { ref contents } => {
                out.push_str(&contents.borrow());
            }
            NodeData::Element { ref name, .. } => {
                let tag = name.local.as_ref();
                if SKIPPED_TAGS.contains(&tag) {
                    continue;
                }
                if BLOCK_TAGS.contains(&tag) {
                    out.push('\n');
                    stack.push_back(None);
                }
                for child in node.children.borrow().iter().rev() {
                    stack.push_back(Some(child.clone()));
                }
            }
            NodeData::Document => {
                for child in node.children.borrow().iter().rev() {
                    stack.push_back(Some(child.clone()));
                }
            }
            _ => {}
        }
    }
}
