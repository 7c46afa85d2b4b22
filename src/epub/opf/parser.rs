//! OPF解析器模块
//!
//! 提供OPF（Open Packaging Format）文件的XML解析功能。任何格式错误都会让整本书的解析失败。

use crate::epub::archive::EntrySource;
use crate::epub::book::BookMetadata;
use crate::epub::container::ContainerPointer;
use crate::epub::error::{EpubError, Result, Stage};
use crate::epub::opf::{
    config::MetadataTagConfigs,
    manifest::ManifestItem,
    metadata::{Metadata, Refinement},
    spine::SpineItem,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use tracing::debug;

/// 缺少标题时使用的占位符
pub const UNKNOWN_TITLE: &str = "未知标题";
/// 缺少作者时使用的占位符
pub const UNKNOWN_AUTHOR: &str = "未知作者";

/// OPF文件解析结果
#[derive(Debug, Clone)]
pub struct PackageDocument {
    /// EPUB版本
    pub version: String,
    /// 元数据
    pub metadata: Metadata,
    /// 清单项(文件列表)，key为清单项ID
    pub manifest: HashMap<String, ManifestItem>,
    /// 脊柱(阅读顺序)
    pub spine: Vec<SpineItem>,
    /// 脊柱的目录引用
    pub spine_toc: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    Metadata,
    Manifest,
    Spine,
}

/// 正在等待文本内容的metadata子元素
enum PendingElement {
    DublinCore {
        tag: String,
        attributes: HashMap<String, String>,
    },
    Meta {
        property: String,
        refines: Option<String>,
        scheme: Option<String>,
    },
}

/// meta标签上的属性
#[derive(Default)]
struct MetaAttributes {
    name: Option<String>,
    content: Option<String>,
    property: Option<String>,
    refines: Option<String>,
    scheme: Option<String>,
}

fn package_error(reason: impl Into<String>) -> EpubError {
    EpubError::format(Stage::Package, reason)
}

fn xml_error(e: impl std::fmt::Display) -> EpubError {
    package_error(format!("XML解析错误: {}", e))
}

/// 收集元素的所有属性（使用本地名称作为key）
fn collect_attributes(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut attributes = HashMap::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr.unescape_value().map_err(xml_error)?.to_string();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

impl PackageDocument {
    /// 使用默认标签配置解析OPF文件内容
    pub fn parse_xml(xml_content: &str) -> Result<PackageDocument> {
        Self::parse_xml_with_config(xml_content, &MetadataTagConfigs::default())
    }

    /// 使用指定的标签配置解析OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    /// * `tag_configs` - 元数据标签配置
    ///
    /// # 返回值
    /// * `Result<PackageDocument>` - 任何XML格式错误都返回package阶段的格式错误
    pub fn parse_xml_with_config(xml_content: &str, tag_configs: &MetadataTagConfigs) -> Result<PackageDocument> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);

        let mut version = String::new();
        let mut metadata = Metadata::with_configs(tag_configs.clone());
        let mut manifest = HashMap::new();
        let mut spine = Vec::new();
        let mut spine_toc = None;
        let mut saw_package = false;

        let mut section = Section::None;
        let mut depth: usize = 0;
        let mut pending: Option<PendingElement> = None;
        let mut text_content = String::new();

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(ref e) => {
                    depth += 1;
                    let local_name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();

                    match (local_name.as_str(), section) {
                        ("package", _) => {
                            saw_package = true;
                            version = collect_attributes(e)?.remove("version").unwrap_or_default();
                        }
                        ("metadata", _) => section = Section::Metadata,
                        ("manifest", _) => section = Section::Manifest,
                        ("spine", _) => {
                            section = Section::Spine;
                            spine_toc = collect_attributes(e)?.remove("toc");
                        }
                        ("item", Section::Manifest) => Self::parse_manifest_item(e, &mut manifest)?,
                        ("itemref", Section::Spine) => Self::parse_spine_item(e, &mut spine)?,
                        ("meta", Section::Metadata) => {
                            pending = Self::handle_meta_tag(e, &mut metadata)?;
                            text_content.clear();
                        }
                        (tag, Section::Metadata) => {
                            pending = Some(PendingElement::DublinCore {
                                tag: tag.to_string(),
                                attributes: collect_attributes(e)?,
                            });
                            text_content.clear();
                        }
                        _ => {}
                    }
                }
                Event::Empty(ref e) => {
                    match (e.local_name().as_ref(), section) {
                        (b"package", _) => {
                            saw_package = true;
                            version = collect_attributes(e)?.remove("version").unwrap_or_default();
                        }
                        (b"meta", Section::Metadata) => {
                            // 空meta标签的内容只能来自content属性
                            Self::handle_meta_tag(e, &mut metadata)?;
                        }
                        (b"item", Section::Manifest) => Self::parse_manifest_item(e, &mut manifest)?,
                        (b"itemref", Section::Spine) => Self::parse_spine_item(e, &mut spine)?,
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    depth = depth.checked_sub(1).ok_or_else(|| package_error("多余的结束标签"))?;

                    match e.local_name().as_ref() {
                        b"metadata" | b"manifest" | b"spine" => section = Section::None,
                        _ if section == Section::Metadata => {
                            if let Some(element) = pending.take() {
                                Self::finish_metadata_element(element, text_content.trim(), &mut metadata);
                            }
                            text_content.clear();
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    if pending.is_some() {
                        text_content.push_str(&e.unescape().map_err(xml_error)?);
                    }
                }
                Event::CData(e) => {
                    if pending.is_some() {
                        text_content.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if depth != 0 {
            return Err(package_error(format!("文档结束时仍有 {} 个元素未闭合", depth)));
        }
        if !saw_package {
            return Err(package_error("缺少package根元素"));
        }

        Ok(PackageDocument {
            version,
            metadata,
            manifest,
            spine,
            spine_toc,
        })
    }

    /// 处理meta标签
    ///
    /// 内容在属性中的直接写入元数据；需要等待文本内容的返回待处理元素。
    fn handle_meta_tag(e: &BytesStart, metadata: &mut Metadata) -> Result<Option<PendingElement>> {
        let mut attrs = MetaAttributes::default();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(xml_error)?;
            let value = attr.unescape_value().map_err(xml_error)?.to_string();
            match attr.key.local_name().as_ref() {
                b"name" => attrs.name = Some(value),
                b"content" => attrs.content = Some(value),
                b"property" => attrs.property = Some(value),
                b"refines" => attrs.refines = Some(value.trim_start_matches('#').to_string()),
                b"scheme" => attrs.scheme = Some(value),
                _ => {}
            }
        }

        // EPUB2形式：<meta name="cover" content="cover-image"/>
        if let (Some(name), Some(content)) = (&attrs.name, &attrs.content) {
            metadata.add_meta(name.clone(), content.clone());
            return Ok(None);
        }

        let Some(property) = attrs.property else {
            return Ok(None);
        };

        // 少数生成器把property形式的值也放在content属性里
        if let Some(content) = attrs.content {
            Self::finish_metadata_element(
                PendingElement::Meta {
                    property,
                    refines: attrs.refines,
                    scheme: attrs.scheme,
                },
                content.trim(),
                metadata,
            );
            return Ok(None);
        }

        Ok(Some(PendingElement::Meta {
            property,
            refines: attrs.refines,
            scheme: attrs.scheme,
        }))
    }

    fn finish_metadata_element(element: PendingElement, text: &str, metadata: &mut Metadata) {
        match element {
            PendingElement::DublinCore { tag, attributes } => {
                if !text.is_empty() {
                    metadata.add_dublin_core(tag, text, attributes);
                }
            }
            PendingElement::Meta {
                property,
                refines: Some(refines_id),
                scheme,
            } => {
                metadata.add_refinement(
                    refines_id,
                    Refinement {
                        property,
                        content: text.to_string(),
                        scheme,
                    },
                );
            }
            PendingElement::Meta { property, refines: None, .. } => {
                metadata.add_meta(property, text);
            }
        }
    }

    /// 解析清单项
    fn parse_manifest_item(e: &BytesStart, manifest: &mut HashMap<String, ManifestItem>) -> Result<()> {
        let mut attributes = collect_attributes(e)?;
        let (Some(id), Some(href)) = (attributes.remove("id"), attributes.remove("href")) else {
            return Ok(());
        };
        if id.is_empty() || href.is_empty() {
            return Ok(());
        }

        let item = ManifestItem {
            id: id.clone(),
            href,
            media_type: attributes.remove("media-type").unwrap_or_default(),
            properties: attributes.remove("properties"),
        };
        manifest.insert(id, item);
        Ok(())
    }

    /// 解析脊柱项
    fn parse_spine_item(e: &BytesStart, spine: &mut Vec<SpineItem>) -> Result<()> {
        let attributes = collect_attributes(e)?;
        let Some(idref) = attributes.get("idref").filter(|id| !id.is_empty()) else {
            return Ok(());
        };

        spine.push(SpineItem {
            idref: idref.clone(),
            linear: attributes.get("linear").map(String::as_str) != Some("no"),
        });
        Ok(())
    }

    /// 获取导航文档的路径
    pub fn get_nav_path(&self) -> Option<String> {
        self.manifest
            .values()
            .find(|item| item.is_nav())
            .map(|item| item.href.clone())
    }

    /// 获取封面图片的路径
    ///
    /// 先找带cover-image属性的清单项，再按metadata中的cover信息查找清单，
    /// 都找不到时把cover值直接当作路径。
    pub fn get_cover_path(&self) -> Option<String> {
        if let Some(item) = self.manifest.values().find(|item| item.is_cover_image()) {
            return Some(item.href.clone());
        }

        let cover = self.metadata.cover()?;
        match self.manifest.get(&cover) {
            Some(item) => Some(item.href.clone()),
            None => Some(cover),
        }
    }

    /// 根据ID获取清单项
    pub fn get_manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.get(id)
    }

    /// 生成书籍元数据，缺失的标题和作者使用占位符
    pub fn book_metadata(&self) -> BookMetadata {
        let creators = self.metadata.creators();
        let mut authors: Vec<String> = creators
            .iter()
            .filter(|c| c.is_author())
            .map(|c| c.name.clone())
            .collect();
        if authors.is_empty() {
            authors = creators.into_iter().map(|c| c.name).collect();
        }

        let author = if authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            authors.join(", ")
        };

        BookMetadata {
            title: self.metadata.title().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author,
            description: self.metadata.description(),
            cover_image_href: self.get_cover_path(),
            language: self.metadata.language(),
            publisher: self.metadata.publisher(),
            identifier: self.metadata.identifiers().into_iter().map(|i| i.value).find(|v| !v.is_empty()),
            published: self.metadata.date(),
            subjects: self.metadata.subjects(),
        }
    }
}

/// 从压缩包中读取并解析根包文档
pub fn parse(archive: &dyn EntrySource, pointer: &ContainerPointer, tag_configs: &MetadataTagConfigs) -> Result<PackageDocument> {
    let content = archive.read_text(&pointer.package_path).map_err(|e| package_error(e.to_string()))?;
    let package = PackageDocument::parse_xml_with_config(&content, tag_configs)?;

    debug!(
        version = %package.version,
        manifest = package.manifest.len(),
        spine = package.spine.len(),
        "包文档解析完成"
    );
    Ok(package)
}
