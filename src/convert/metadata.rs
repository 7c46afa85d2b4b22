use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::epub::BookMetadata;

/// 写入 `book.json` 的格式版本
pub const METADATA_VERSION: &str = "1.0.0";

/// `book.json` 的内容，字段顺序即输出顺序
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataDocument<'a> {
    title: &'a str,
    author: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_image: Option<&'a str>,
    import_time: String,
    version: &'static str,
}

/// 渲染元数据文件
///
/// 缺失的字段直接省略，不会输出 `null`。
pub fn render_metadata(metadata: &BookMetadata, import_time: DateTime<Utc>) -> String {
    let document = MetadataDocument {
        title: &metadata.title,
        author: &metadata.author,
        description: metadata.description.as_deref(),
        cover_image: metadata.cover_image_href.as_deref(),
        import_time: import_time.to_rfc3339_opts(SecondsFormat::Millis, true),
        version: METADATA_VERSION,
    };

    // 只包含字符串字段，序列化不会失败
    serde_json::to_string_pretty(&document).unwrap_or_default()
}
