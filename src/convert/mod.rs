//! Markdown转换模块
//!
//! 把解析好的 [`Book`] 渲染为一组文件：目录 `README.md`、元数据 `book.json`，
//! 以及每章一个Markdown文件。这里的函数都是纯函数，写入由 [`sink`] 负责。

pub mod filename;
pub mod markdown;
pub mod metadata;
pub mod sink;
pub mod toc;
pub mod validate;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::epub::Book;

pub use filename::{chapter_filename, sanitize_title};
pub use markdown::render_chapter;
pub use metadata::{METADATA_VERSION, render_metadata};
pub use sink::{DirectorySink, NoteSink, persist};
pub use toc::render_table_of_contents;
pub use validate::{ValidationIssue, check, validate};

/// 目录文件名
pub const TOC_FILE: &str = "README.md";
/// 元数据文件名
pub const METADATA_FILE: &str = "book.json";

/// 标题级别的上限
const MAX_TITLE_LEVEL: u8 = 6;

/// 文件名到内容的有序映射
pub type ConversionResultSet = BTreeMap<String, String>;

/// 转换选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// 保留原始标记，不做纯文本整理
    pub preserve_markup: bool,
    /// 在章节标题前加 `第N章`
    pub number_chapters: bool,
    /// 章节标题的级别，超出1到6的值会被截断
    pub title_level: u8,
    /// 在章节末尾加分隔线
    pub add_separators: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            preserve_markup: false,
            number_chapters: true,
            title_level: 1,
            add_separators: true,
        }
    }
}

impl ConversionOptions {
    /// 实际使用的标题级别
    pub fn heading_level(&self) -> usize {
        self.title_level.clamp(1, MAX_TITLE_LEVEL) as usize
    }

    /// 在当前选项上应用调用方的覆盖项，返回新的选项
    pub fn with_overrides(&self, overrides: &ConversionOverrides) -> Self {
        Self {
            preserve_markup: overrides.preserve_markup.unwrap_or(self.preserve_markup),
            number_chapters: overrides.number_chapters.unwrap_or(self.number_chapters),
            title_level: overrides.title_level.unwrap_or(self.title_level),
            add_separators: overrides.add_separators.unwrap_or(self.add_separators),
        }
    }
}

/// 调用方对转换选项的局部覆盖，`None` 表示沿用基础值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionOverrides {
    pub preserve_markup: Option<bool>,
    pub number_chapters: Option<bool>,
    pub title_level: Option<u8>,
    pub add_separators: Option<bool>,
}

impl ConversionOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 以当前时间转换整本书
pub fn convert_book(book: &Book, options: &ConversionOptions) -> ConversionResultSet {
    convert_book_at(book, options, Utc::now())
}

/// 转换整本书
///
/// # 参数
/// * `book` - 解析好的书籍
/// * `options` - 转换选项
/// * `import_time` - 写入 `book.json` 的导入时间
///
/// # 返回值
/// * `ConversionResultSet` - 章节数加2个文件
pub fn convert_book_at(book: &Book, options: &ConversionOptions, import_time: DateTime<Utc>) -> ConversionResultSet {
    let mut files = ConversionResultSet::new();

    files.insert(TOC_FILE.to_string(), render_table_of_contents(book));
    files.insert(METADATA_FILE.to_string(), render_metadata(book.metadata(), import_time));

    for chapter in book.chapters() {
        files.insert(
            chapter_filename(chapter.index, &chapter.title),
            render_chapter(chapter, options),
        );
    }

    debug!(files = files.len(), "Markdown转换完成");
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::book::tests::sample_book;
    use chrono::TimeZone;

    #[test]
    fn test_default_options() {
        let options = ConversionOptions::default();
        assert!(!options.preserve_markup);
        assert!(options.number_chapters);
        assert_eq!(options.title_level, 1);
        assert!(options.add_separators);
    }

    #[test]
    fn test_heading_level_is_clamped() {
        let mut options = ConversionOptions::default();
        options.title_level = 0;
        assert_eq!(options.heading_level(), 1);
        options.title_level = 9;
        assert_eq!(options.heading_level(), 6);
    }

    #[test]
    fn test_overrides_do_not_touch_base() {
        let base = ConversionOptions::default();
        let overrides = ConversionOverrides {
            number_chapters: Some(false),
            title_level: Some(2),
            ..ConversionOverrides::default()
        };

        let merged = base.with_overrides(&overrides);
        assert!(!merged.number_chapters);
        assert_eq!(merged.title_level, 2);
        assert!(merged.add_separators);
        assert_eq!(base, ConversionOptions::default());
        assert!(ConversionOverrides::default().is_empty());
        assert!(!overrides.is_empty());
    }

    #[test]
    fn test_convert_book_file_set() {
        let book = sample_book();
        let time = Utc.with_ymd_and_hms(2025, 6, 5, 11, 24, 1).unwrap();
        let files = convert_book_at(&book, &ConversionOptions::default(), time);

        assert_eq!(files.len(), book.chapter_count() + 2);
        let names: Vec<_> = files.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["001-开端.md", "002-发展.md", "003-结局.md", TOC_FILE, METADATA_FILE]);
        assert!(validate(&files));
    }
}
