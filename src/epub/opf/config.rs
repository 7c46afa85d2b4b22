//! 元数据标签配置模块
//!
//! 定义每种元数据对应哪些标签名，支持通过YAML覆盖。

use crate::epub::error::{EpubError, Result};
use serde::{Deserialize, Serialize};

/// 单个元数据类型的标签配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataTagConfig {
    /// 标签列表
    pub tags: Vec<String>,
    /// 可选的描述
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MetadataTagConfig {
    /// 创建新的标签配置
    pub fn new(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: None,
        }
    }

    /// 创建带描述的标签配置
    pub fn with_description(tags: &[&str], description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::new(tags)
        }
    }

    /// 标签是否属于此配置
    pub fn matches(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// 元数据标签配置，定义每种元数据类型对应的可能标签
///
/// 标签名使用去掉命名空间前缀的本地名称（`dc:title` 记为 `title`），
/// property形式的meta标签则保留完整的property值（如 `dcterms:modified`）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataTagConfigs {
    /// 标题标签配置
    pub title: MetadataTagConfig,
    /// 创建者标签配置
    pub creator: MetadataTagConfig,
    /// 语言标签配置
    pub language: MetadataTagConfig,
    /// 标识符标签配置
    pub identifier: MetadataTagConfig,
    /// 出版社标签配置
    pub publisher: MetadataTagConfig,
    /// 出版日期标签配置
    pub date: MetadataTagConfig,
    /// 描述标签配置
    pub description: MetadataTagConfig,
    /// 主题标签配置
    pub subject: MetadataTagConfig,
    /// 封面标签配置
    pub cover: MetadataTagConfig,
}

impl Default for MetadataTagConfigs {
    fn default() -> Self {
        Self {
            title: MetadataTagConfig::with_description(&["title"], "书籍标题"),
            creator: MetadataTagConfig::with_description(&["creator", "author"], "作者/创建者信息"),
            language: MetadataTagConfig::with_description(&["language"], "书籍语言"),
            identifier: MetadataTagConfig::with_description(&["identifier"], "书籍标识符（ISBN、UUID等）"),
            publisher: MetadataTagConfig::with_description(&["publisher"], "出版社信息"),
            date: MetadataTagConfig::with_description(&["date"], "出版日期"),
            description: MetadataTagConfig::with_description(&["description"], "书籍描述/简介"),
            subject: MetadataTagConfig::with_description(&["subject"], "书籍主题/分类"),
            cover: MetadataTagConfig::with_description(&["cover"], "封面图片信息"),
        }
    }
}

impl MetadataTagConfigs {
    /// 从YAML文本加载配置，缺省的字段使用默认值
    ///
    /// # 示例
    ///
    /// ```rust
    /// use booknote::MetadataTagConfigs;
    ///
    /// let configs = MetadataTagConfigs::from_yaml_str("title:\n  tags: [title, name]\n")?;
    /// assert!(configs.title.matches("name"));
    /// assert!(configs.creator.matches("creator"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yml::from_str(content)
            .map_err(|e| EpubError::Config(format!("元数据标签配置格式错误: {}", e)))
    }

    /// 序列化为YAML文本
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yml::to_string(self)
            .map_err(|e| EpubError::Config(format!("序列化元数据标签配置失败: {}", e)))
    }
}
