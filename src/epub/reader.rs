use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::epub::archive::{EntrySource, ZipSource};
use crate::epub::book::{Book, ParseStats};
use crate::epub::chapter::{self, SkippedEntry};
use crate::epub::container::{self, ContainerPointer};
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{self, MetadataTagConfigs, PackageDocument};

/// 默认并行提取阈值
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16;

/// 解析选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// 是否在章节中保留原始标记
    pub keep_raw_markup: bool,
    /// 脊柱长度达到该值时并行提取章节，0表示始终顺序提取
    pub parallel_threshold: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            keep_raw_markup: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// 解析结果：书籍和被跳过的脊柱条目
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub book: Book,
    pub skipped: Vec<SkippedEntry>,
}

/// 表示一个已打开的EPUB文件
///
/// 只借用调用方的字节缓冲区，不做任何文件读写。
pub struct Epub<'a> {
    archive: ZipSource<'a>,
    pointer: ContainerPointer,
    original_size: usize,
}

impl<'a> Epub<'a> {
    /// 从内存中的字节创建Epub实例
    ///
    /// # 参数
    /// * `bytes` - epub文件的完整内容
    ///
    /// # 返回值
    /// * `Result<Epub>` - 压缩包或container.xml无效时返回对应阶段的格式错误
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Epub<'a>> {
        let archive = ZipSource::open(bytes)?;
        let pointer = container::resolve(&archive)?;

        Ok(Epub {
            archive,
            pointer,
            original_size: bytes.len(),
        })
    }

    /// 根包文档的位置
    pub fn pointer(&self) -> &ContainerPointer {
        &self.pointer
    }

    /// 列出EPUB文件中的所有条目
    pub fn entry_names(&self) -> Vec<String> {
        let mut names = self.archive.entry_names();
        names.sort();
        names
    }

    /// 只解析包文档，不提取章节
    pub fn package(&self, tag_configs: &MetadataTagConfigs) -> Result<PackageDocument> {
        opf::parse(&self.archive, &self.pointer, tag_configs)
    }

    /// 使用默认标签配置解析整本书
    pub fn parse(&self, options: &ParseOptions) -> Result<ParseOutcome> {
        self.parse_with_tags(options, &MetadataTagConfigs::default())
    }

    /// 解析整本书
    ///
    /// # 参数
    /// * `options` - 解析选项
    /// * `tag_configs` - 元数据标签配置
    ///
    /// # 返回值
    /// * `Result<ParseOutcome>` - 没有任何章节可用时返回 `EmptyResult`
    pub fn parse_with_tags(&self, options: &ParseOptions, tag_configs: &MetadataTagConfigs) -> Result<ParseOutcome> {
        let started = Instant::now();

        let package = self.package(tag_configs)?;
        let metadata = package.book_metadata();
        debug!(title = %metadata.title, author = %metadata.author, "元数据解析完成");

        let extraction = chapter::extract(&self.archive, &package, &self.pointer.base_dir, options);
        if extraction.chapters.is_empty() {
            return Err(EpubError::EmptyResult);
        }

        let parse_stats = ParseStats {
            parse_time_ms: started.elapsed().as_millis() as u64,
            original_size_bytes: self.original_size,
            parsed_size_bytes: extraction.chapters.iter().map(|c| c.content.len()).sum(),
        };
        let book = Book::assemble(metadata, extraction.chapters, parse_stats);

        info!(
            title = %book.metadata().title,
            chapters = book.chapter_count(),
            skipped = extraction.skipped.len(),
            words = book.total_word_count(),
            elapsed_ms = parse_stats.parse_time_ms,
            "EPUB解析完成"
        );

        Ok(ParseOutcome {
            book,
            skipped: extraction.skipped,
        })
    }
}
