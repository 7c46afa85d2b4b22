//! OPF（Open Packaging Format）文件解析模块
//!
//! 此模块提供EPUB文件中OPF包文件的解析功能，包括元数据、清单、脊柱等信息的提取。

mod config;
mod manifest;
mod metadata;
mod parser;
mod spine;

pub use config::{MetadataTagConfig, MetadataTagConfigs};
pub use manifest::ManifestItem;
pub use metadata::{Creator, Identifier, Metadata, MetadataValue, Refinement};
pub use parser::{PackageDocument, UNKNOWN_AUTHOR, UNKNOWN_TITLE, parse};
pub use spine::SpineItem;
