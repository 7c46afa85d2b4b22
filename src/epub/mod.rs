pub mod archive;
pub mod book;
pub mod chapter;
pub mod container;
pub mod content;
pub mod error;
pub mod opf;
pub mod reader;
pub mod text;

// 重新导出错误处理
pub use error::{EpubError, Result, Stage};

// 重新导出压缩包和容器相关
pub use archive::{EntryError, EntrySource, ZipSource};
pub use container::{Container, ContainerPointer, RootFile};
pub use content::ContentDocument;

// 重新导出EPUB读取器和书籍模型
pub use book::{Book, BookMetadata, BookSummary, Chapter, ParseStats};
pub use chapter::{Extraction, SkipReason, SkippedEntry};
pub use reader::{Epub, ParseOptions, ParseOutcome};

// 重新导出OPF相关
pub use opf::{
    Creator, Identifier, ManifestItem, Metadata, MetadataTagConfig, MetadataTagConfigs, PackageDocument, SpineItem,
    UNKNOWN_AUTHOR, UNKNOWN_TITLE,
};
