//! 书籍模型
//!
//! 解析结果的不可变表示。[`Book`] 组装完成后不再修改，总字数每次都由章节列表重新累加。

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::epub::error::{EpubError, Result};

/// 书籍基本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    /// 书名，缺失时为 `未知标题`
    pub title: String,
    /// 作者，多位作者用逗号连接，缺失时为 `未知作者`
    pub author: String,
    pub description: Option<String>,
    /// 封面图片的清单href（相对于包文档）
    pub cover_image_href: Option<String>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub identifier: Option<String>,
    /// 出版日期，保留原始写法
    pub published: Option<String>,
    pub subjects: Vec<String>,
}

/// 单个章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// 从0开始的连续序号
    pub index: usize,
    pub title: String,
    /// 纯文本内容，段落之间以空行分隔
    pub content: String,
    pub word_count: usize,
    /// 原始标记，只有在解析选项要求时才保留
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_markup: Option<String>,
    /// 脊柱中的清单项ID
    pub source_id: String,
    /// 内容文档在压缩包中的路径
    pub source_path: String,
}

/// 解析统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseStats {
    pub parse_time_ms: u64,
    /// 输入文件大小
    pub original_size_bytes: usize,
    /// 所有章节纯文本的字节数之和
    pub parsed_size_bytes: usize,
}

/// 交给摘要记录存储的书籍级字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub import_time: String,
    pub total_word_count: usize,
    pub chapter_count: usize,
}

/// 解析完成的书籍
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    metadata: BookMetadata,
    chapters: Vec<Chapter>,
    parse_stats: ParseStats,
}

impl Book {
    /// 组装书籍
    pub fn assemble(metadata: BookMetadata, chapters: Vec<Chapter>, parse_stats: ParseStats) -> Self {
        Self {
            metadata,
            chapters,
            parse_stats,
        }
    }

    pub fn metadata(&self) -> &BookMetadata {
        &self.metadata
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn parse_stats(&self) -> ParseStats {
        self.parse_stats
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// 总字数
    pub fn total_word_count(&self) -> usize {
        self.chapters.iter().map(|c| c.word_count).sum()
    }

    /// 按序号获取单个章节
    ///
    /// # 返回值
    /// * `Result<&Chapter>` - 序号不在 `[0, chapter_count)` 内时返回 `IndexOutOfRange`
    pub fn chapter(&self, index: isize) -> Result<&Chapter> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.chapters.get(i))
            .ok_or(EpubError::IndexOutOfRange {
                index,
                count: self.chapters.len(),
            })
    }

    /// 获取闭区间 `[start, end]` 内的章节
    ///
    /// 越界的端点会被截断到有效范围，`start > end` 时返回空切片，从不报错。
    pub fn chapter_range(&self, start: isize, end: isize) -> &[Chapter] {
        let Some(last) = self.chapters.len().checked_sub(1) else {
            return &[];
        };

        let start = start.max(0) as usize;
        let end = match usize::try_from(end) {
            Ok(end) => end.min(last),
            Err(_) => return &[],
        };

        if start > end {
            return &[];
        }
        &self.chapters[start..=end]
    }

    /// 生成摘要记录
    pub fn summary(&self, import_time: DateTime<Utc>) -> BookSummary {
        BookSummary {
            title: self.metadata.title.clone(),
            author: self.metadata.author.clone(),
            description: self.metadata.description.clone(),
            import_time: import_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_word_count: self.total_word_count(),
            chapter_count: self.chapters.len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn sample_chapter(index: usize, title: &str, content: &str) -> Chapter {
        Chapter {
            index,
            title: title.to_string(),
            content: content.to_string(),
            word_count: crate::epub::text::count_words(content),
            raw_markup: None,
            source_id: format!("ch{}", index + 1),
            source_path: format!("OEBPS/ch{}.xhtml", index + 1),
        }
    }

    pub(crate) fn sample_metadata() -> BookMetadata {
        BookMetadata {
            title: "测试书籍".to_string(),
            author: "测试作者".to_string(),
            description: Some("一本用于测试的书".to_string()),
            cover_image_href: Some("images/cover.jpg".to_string()),
            language: Some("zh-CN".to_string()),
            publisher: None,
            identifier: None,
            published: Some("2024-05-01".to_string()),
            subjects: vec!["小说".to_string()],
        }
    }

    pub(crate) fn sample_book() -> Book {
        Book::assemble(
            sample_metadata(),
            vec![
                sample_chapter(0, "开端", "第一章的内容"),
                sample_chapter(1, "发展", "Second chapter 内容"),
                sample_chapter(2, "结局", "完"),
            ],
            ParseStats::default(),
        )
    }

    #[test]
    fn test_total_word_count_is_sum() {
        let book = sample_book();
        let sum: usize = book.chapters().iter().map(|c| c.word_count).sum();
        assert_eq!(book.total_word_count(), sum);
        assert_eq!(book.total_word_count(), 6 + 4 + 1);
    }

    #[test]
    fn test_chapter_bounds() {
        let book = sample_book();
        assert_eq!(book.chapter(0).unwrap().title, "开端");
        assert_eq!(book.chapter(2).unwrap().title, "结局");
        assert!(matches!(
            book.chapter(-1),
            Err(EpubError::IndexOutOfRange { index: -1, count: 3 })
        ));
        assert!(matches!(
            book.chapter(3),
            Err(EpubError::IndexOutOfRange { index: 3, count: 3 })
        ));
    }

    #[test]
    fn test_chapter_range_clamps() {
        let book = sample_book();
        let indices = |chapters: &[Chapter]| chapters.iter().map(|c| c.index).collect::<Vec<_>>();

        assert_eq!(indices(book.chapter_range(-5, 1)), vec![0, 1]);
        assert_eq!(indices(book.chapter_range(1, 10)), vec![1, 2]);
        assert!(book.chapter_range(2, 1).is_empty());
        assert!(book.chapter_range(-3, -1).is_empty());
        assert_eq!(indices(book.chapter_range(0, 0)), vec![0]);
    }

    #[test]
    fn test_chapter_range_on_empty_book() {
        let book = Book::assemble(sample_metadata(), Vec::new(), ParseStats::default());
        assert!(book.chapter_range(0, 10).is_empty());
        assert!(book.chapter(0).is_err());
    }

    #[test]
    fn test_summary() {
        let book = sample_book();
        let time = Utc.with_ymd_and_hms(2025, 6, 5, 11, 24, 1).unwrap();
        let summary = book.summary(time);

        assert_eq!(summary.title, "测试书籍");
        assert_eq!(summary.chapter_count, 3);
        assert_eq!(summary.total_word_count, 11);
        assert_eq!(summary.import_time, "2025-06-05T11:24:01.000Z");
    }
}
