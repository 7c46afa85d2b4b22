pub mod config;
pub mod convert;
pub mod epub;

// === 核心API重新导出 ===

/// EPUB文件读取器（主要接口）
pub use epub::{Epub, ParseOptions, ParseOutcome};

/// 错误处理
pub use epub::{EpubError, Result, Stage};

// === 数据结构 ===

/// 书籍模型
pub use epub::{Book, BookMetadata, BookSummary, Chapter, ParseStats};

/// 被跳过的章节
pub use epub::{SkipReason, SkippedEntry};

// === 转换 ===

pub use convert::{
    ConversionOptions, ConversionOverrides, ConversionResultSet, DirectorySink, NoteSink, ValidationIssue, convert_book,
    persist, validate,
};

/// 导入配置
pub use config::ImportConfig;

// === 底层组件（高级用法） ===

/// 压缩包和容器组件
pub use epub::{Container, ContainerPointer, ContentDocument, EntrySource, RootFile, ZipSource};

/// OPF组件
pub use epub::{
    Creator, Identifier, ManifestItem, Metadata, MetadataTagConfig, MetadataTagConfigs, PackageDocument, SpineItem,
    UNKNOWN_AUTHOR, UNKNOWN_TITLE,
};

// === 库信息 ===

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库的描述
pub const DESCRIPTION: &str = "EPUB导入与Markdown笔记转换库";

// === 便捷函数 ===

/// 使用默认选项解析内存中的EPUB文件
///
/// 这是 `Epub::from_bytes(bytes)?.parse(&ParseOptions::default())` 的便捷包装函数。
///
/// # 示例
///
/// ```rust,no_run
/// let bytes = std::fs::read("book.epub")?;
/// let outcome = booknote::parse_epub(&bytes)?;
/// println!("书名: {}", outcome.book.metadata().title);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_epub(bytes: &[u8]) -> Result<ParseOutcome> {
    Epub::from_bytes(bytes)?.parse(&ParseOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_description() {
        assert!(!DESCRIPTION.is_empty());
    }

    #[test]
    fn test_parse_epub_rejects_garbage() {
        let err = parse_epub(b"not an epub").unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Archive));
    }
}
