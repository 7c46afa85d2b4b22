//! 元数据处理模块
//!
//! 提供EPUB元数据的结构定义和处理功能。

use crate::epub::opf::config::{MetadataTagConfig, MetadataTagConfigs};
use std::collections::HashMap;

/// 元数据值枚举，表示不同来源的元数据
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// Dublin Core标签元数据
    DublinCore {
        /// 元素内容
        value: String,
        /// 元素属性（如 id, role, scheme等）
        attributes: HashMap<String, String>,
    },
    /// meta标签的内容，如 <meta name="cover" content="cover-image"/>
    /// 或 <meta property="dcterms:modified">2025-06-05T11:24:01Z</meta>
    Meta {
        content: String,
    },
}

impl MetadataValue {
    fn content(&self) -> &str {
        match self {
            MetadataValue::DublinCore { value, .. } => value,
            MetadataValue::Meta { content } => content,
        }
    }
}

/// 基于refines属性的关联元数据，如 <meta refines="#creator" property="role">aut</meta>
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    /// property属性值（如role、file-as、display-seq等）
    pub property: String,
    /// 标签内容
    pub content: String,
    /// scheme属性（可选，如marc:relators）
    pub scheme: Option<String>,
}

/// 创建者信息(作者、编辑者等)
#[derive(Debug, Clone, PartialEq)]
pub struct Creator {
    /// 创建者姓名
    pub name: String,
    /// 角色(如author、editor等)
    pub role: Option<String>,
    /// 显示顺序
    pub display_seq: Option<u32>,
    /// 元素ID（用于关联refines元数据）
    pub id: Option<String>,
}

impl Creator {
    /// 是否可以视为作者（未标注角色也算）
    pub fn is_author(&self) -> bool {
        matches!(self.role.as_deref(), None | Some("author"))
    }
}

/// 标识符信息
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// 标识符值
    pub value: String,
    /// 标识符类型(如ISBN、UUID等)
    pub scheme: Option<String>,
    /// 元素ID
    pub id: Option<String>,
}

/// OPF文件中的元数据信息
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// 原始元数据映射：key为标签名（如"title", "cover", "dcterms:modified"），value按出现顺序排列
    raw_metadata: HashMap<String, Vec<MetadataValue>>,
    /// 关联元数据映射：key为被精化的元素ID（不含#）
    refines_metadata: HashMap<String, Vec<Refinement>>,
    /// 元数据标签配置，用于查找对应的元数据
    tag_configs: MetadataTagConfigs,
}

impl Metadata {
    /// 使用默认标签配置创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定标签配置创建
    pub fn with_configs(tag_configs: MetadataTagConfigs) -> Self {
        Self {
            tag_configs,
            ..Self::default()
        }
    }

    /// 添加Dublin Core元数据
    pub fn add_dublin_core(&mut self, tag: impl Into<String>, value: impl Into<String>, attributes: HashMap<String, String>) {
        self.raw_metadata
            .entry(tag.into())
            .or_default()
            .push(MetadataValue::DublinCore {
                value: value.into(),
                attributes,
            });
    }

    /// 添加meta标签元数据（name或property形式）
    pub fn add_meta(&mut self, key: impl Into<String>, content: impl Into<String>) {
        self.raw_metadata
            .entry(key.into())
            .or_default()
            .push(MetadataValue::Meta {
                content: content.into(),
            });
    }

    /// 添加基于refines的meta元数据
    pub fn add_refinement(&mut self, refines_id: impl Into<String>, refinement: Refinement) {
        self.refines_metadata
            .entry(refines_id.into())
            .or_default()
            .push(refinement);
    }

    fn find_first(&self, config: &MetadataTagConfig) -> Option<String> {
        config
            .tags
            .iter()
            .filter_map(|tag| self.raw_metadata.get(tag))
            .flat_map(|values| values.iter())
            .map(|v| v.content().trim())
            .find(|content| !content.is_empty())
            .map(str::to_string)
    }

    fn find_all(&self, config: &MetadataTagConfig) -> Vec<&MetadataValue> {
        config
            .tags
            .iter()
            .filter_map(|tag| self.raw_metadata.get(tag))
            .flat_map(|values| values.iter())
            .collect()
    }

    /// 获取标题
    pub fn title(&self) -> Option<String> {
        self.find_first(&self.tag_configs.title)
    }

    /// 获取所有创建者，有display-seq的按顺序排在前面
    pub fn creators(&self) -> Vec<Creator> {
        let mut creators: Vec<Creator> = self
            .find_all(&self.tag_configs.creator)
            .into_iter()
            .map(|v| self.extract_creator(v))
            .filter(|c| !c.name.is_empty())
            .collect();
        creators.sort_by_key(|c| c.display_seq.unwrap_or(u32::MAX));
        creators
    }

    /// 获取语言
    pub fn language(&self) -> Option<String> {
        self.find_first(&self.tag_configs.language)
    }

    /// 获取所有标识符
    pub fn identifiers(&self) -> Vec<Identifier> {
        self.find_all(&self.tag_configs.identifier)
            .into_iter()
            .map(|v| match v {
                MetadataValue::DublinCore { value, attributes } => Identifier {
                    value: value.trim().to_string(),
                    scheme: attributes.get("scheme").cloned(),
                    id: attributes.get("id").cloned(),
                },
                MetadataValue::Meta { content } => Identifier {
                    value: content.trim().to_string(),
                    scheme: None,
                    id: None,
                },
            })
            .collect()
    }

    /// 获取出版社
    pub fn publisher(&self) -> Option<String> {
        self.find_first(&self.tag_configs.publisher)
    }

    /// 获取出版日期
    pub fn date(&self) -> Option<String> {
        self.find_first(&self.tag_configs.date)
    }

    /// 获取描述
    pub fn description(&self) -> Option<String> {
        self.find_first(&self.tag_configs.description)
    }

    /// 获取所有主题
    pub fn subjects(&self) -> Vec<String> {
        self.find_all(&self.tag_configs.subject)
            .into_iter()
            .map(|v| v.content().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// 获取封面信息（通常是清单项ID）
    pub fn cover(&self) -> Option<String> {
        self.find_first(&self.tag_configs.cover)
    }

    /// 根据标签名查找原始元数据
    pub fn find_raw_by_tag(&self, tag: &str) -> Option<&Vec<MetadataValue>> {
        self.raw_metadata.get(tag)
    }

    /// 获取关联到指定元素ID的refines元数据
    pub fn refinements(&self, id: &str) -> &[Refinement] {
        self.refines_metadata.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 从元数据值中提取创建者信息（支持EPUB3的refines关联）
    fn extract_creator(&self, entry: &MetadataValue) -> Creator {
        let MetadataValue::DublinCore { value, attributes } = entry else {
            return Creator {
                name: entry.content().trim().to_string(),
                role: None,
                display_seq: None,
                id: None,
            };
        };

        let mut creator = Creator {
            name: value.trim().to_string(),
            role: attributes.get("role").map(|r| relator_name(r)),
            display_seq: None,
            id: attributes.get("id").cloned(),
        };

        if let Some(id) = &creator.id {
            for refinement in self.refinements(id) {
                match refinement.property.as_str() {
                    "role" => creator.role = Some(relator_name(&refinement.content)),
                    "display-seq" => creator.display_seq = refinement.content.trim().parse().ok(),
                    _ => {}
                }
            }
        }

        creator
    }
}

/// 将MARC relator代码转换为可读角色名
fn relator_name(code: &str) -> String {
    match code.trim() {
        "aut" => "author".to_string(),
        "edt" => "editor".to_string(),
        "trl" => "translator".to_string(),
        "ill" => "illustrator".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_with_refines() {
        let mut metadata = Metadata::new();

        let mut attributes = HashMap::new();
        attributes.insert("id".to_string(), "creator1".to_string());
        metadata.add_dublin_core("creator", "J.K. Rowling", attributes);
        metadata.add_refinement(
            "creator1",
            Refinement {
                property: "role".to_string(),
                content: "aut".to_string(),
                scheme: Some("marc:relators".to_string()),
            },
        );
        metadata.add_refinement(
            "creator1",
            Refinement {
                property: "display-seq".to_string(),
                content: "1".to_string(),
                scheme: None,
            },
        );

        let creators = metadata.creators();
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].name, "J.K. Rowling");
        assert_eq!(creators[0].role, Some("author".to_string()));
        assert_eq!(creators[0].display_seq, Some(1));
        assert!(creators[0].is_author());
    }

    #[test]
    fn test_display_seq_ordering() {
        let mut metadata = Metadata::new();
        for (id, name, seq) in [("c1", "乙", "2"), ("c2", "甲", "1")] {
            let mut attributes = HashMap::new();
            attributes.insert("id".to_string(), id.to_string());
            metadata.add_dublin_core("creator", name, attributes);
            metadata.add_refinement(
                id,
                Refinement {
                    property: "display-seq".to_string(),
                    content: seq.to_string(),
                    scheme: None,
                },
            );
        }

        let names: Vec<_> = metadata.creators().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["甲", "乙"]);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let mut metadata = Metadata::new();
        metadata.add_dublin_core("title", "   ", HashMap::new());
        metadata.add_dublin_core("title", " 真正的标题 ", HashMap::new());
        assert_eq!(metadata.title(), Some("真正的标题".to_string()));
        assert_eq!(metadata.description(), None);
    }

    #[test]
    fn test_custom_tag_config() {
        let mut configs = MetadataTagConfigs::default();
        configs.title = MetadataTagConfig::new(&["name"]);
        let mut metadata = Metadata::with_configs(configs);
        metadata.add_meta("name", "配置标题");
        assert_eq!(metadata.title(), Some("配置标题".to_string()));
    }
}
