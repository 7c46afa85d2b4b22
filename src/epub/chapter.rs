//! 章节提取模块
//!
//! 按脊柱顺序解析每个内容文档。找不到清单项或读不到文件的条目会被跳过并记录原因，
//! 不会让整本书解析失败。

use std::fmt;

use percent_encoding::percent_decode_str;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::epub::archive::EntrySource;
use crate::epub::book::Chapter;
use crate::epub::content::ContentDocument;
use crate::epub::opf::{PackageDocument, SpineItem};
use crate::epub::reader::ParseOptions;
use crate::epub::text::count_words;

/// 条目被跳过的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 脊柱引用的ID不在清单中
    MissingManifestItem,
    /// 清单指向的文件无法读取
    UnreadableEntry(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingManifestItem => f.write_str("清单中没有对应的条目"),
            SkipReason::UnreadableEntry(detail) => write!(f, "无法读取内容文件: {}", detail),
        }
    }
}

/// 被跳过的脊柱条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// 脊柱中的idref
    pub id: String,
    pub reason: SkipReason,
}

/// 章节提取结果
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub chapters: Vec<Chapter>,
    pub skipped: Vec<SkippedEntry>,
}

/// 单个内容文档的提取结果，序号和兜底标题在汇总时才确定
struct ExtractedDocument {
    source_id: String,
    source_path: String,
    title: Option<String>,
    content: String,
    raw_markup: Option<String>,
}

/// 把清单href解析为压缩包内的路径
///
/// 去掉 `#片段`，做百分号解码，相对包文档目录拼接并规范化 `.` 和 `..`。
pub fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let decoded = percent_decode_str(href).decode_utf8_lossy();

    let joined = match decoded.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if base_dir.is_empty() => decoded.into_owned(),
        None => format!("{}/{}", base_dir, decoded),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn extract_entry(
    archive: &dyn EntrySource,
    package: &PackageDocument,
    base_dir: &str,
    item: &SpineItem,
    keep_raw_markup: bool,
) -> Result<ExtractedDocument, SkippedEntry> {
    let skipped = |reason| SkippedEntry {
        id: item.idref.clone(),
        reason,
    };

    let manifest_item = package
        .get_manifest_item(&item.idref)
        .ok_or_else(|| skipped(SkipReason::MissingManifestItem))?;

    if !manifest_item.is_content_document() {
        debug!(id = %item.idref, media_type = %manifest_item.media_type, "脊柱引用了非内容文档，按内容文档处理");
    }

    let source_path = resolve_href(base_dir, &manifest_item.href);
    let markup = archive
        .read_text(&source_path)
        .map_err(|e| skipped(SkipReason::UnreadableEntry(e.to_string())))?;

    let ContentDocument { title, content } = ContentDocument::parse(&markup);

    Ok(ExtractedDocument {
        source_id: item.idref.clone(),
        source_path,
        title,
        content,
        raw_markup: keep_raw_markup.then_some(markup),
    })
}

/// 按脊柱顺序提取所有章节
///
/// # 参数
/// * `archive` - 压缩包条目
/// * `package` - 已解析的包文档
/// * `base_dir` - 包文档所在目录
/// * `options` - 解析选项
///
/// # 返回值
/// * `Extraction` - 成功的章节（序号连续）和被跳过的条目
pub fn extract(archive: &dyn EntrySource, package: &PackageDocument, base_dir: &str, options: &ParseOptions) -> Extraction {
    let spine = &package.spine;
    let keep_raw = options.keep_raw_markup;
    let parallel = options.parallel_threshold > 0 && spine.len() >= options.parallel_threshold;

    let mut results: Vec<(usize, Result<ExtractedDocument, SkippedEntry>)> = if parallel {
        debug!(entries = spine.len(), "并行提取章节");
        spine
            .par_iter()
            .enumerate()
            .map(|(position, item)| (position, extract_entry(archive, package, base_dir, item, keep_raw)))
            .collect()
    } else {
        spine
            .iter()
            .enumerate()
            .map(|(position, item)| (position, extract_entry(archive, package, base_dir, item, keep_raw)))
            .collect()
    };

    // 序号必须按脊柱顺序分配
    results.sort_by_key(|(position, _)| *position);

    let mut extraction = Extraction::default();
    for (_, result) in results {
        match result {
            Ok(document) => {
                let index = extraction.chapters.len();
                let title = document.title.unwrap_or_else(|| format!("第 {} 章", index + 1));
                extraction.chapters.push(Chapter {
                    index,
                    title,
                    word_count: count_words(&document.content),
                    content: document.content,
                    raw_markup: document.raw_markup,
                    source_id: document.source_id,
                    source_path: document.source_path,
                });
            }
            Err(entry) => {
                warn!(id = %entry.id, reason = %entry.reason, "跳过章节");
                extraction.skipped.push(entry);
            }
        }
    }

    debug!(
        chapters = extraction.chapters.len(),
        skipped = extraction.skipped.len(),
        "章节提取完成"
    );
    extraction
}
