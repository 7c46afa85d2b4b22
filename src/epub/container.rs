use crate::epub::archive::EntrySource;
use crate::epub::error::{EpubError, Result, Stage};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{debug, warn};

/// container.xml 的固定路径
pub const CONTAINER_PATH: &str = "META-INF/container.xml";
/// mimetype 标记文件
pub const MIMETYPE_PATH: &str = "mimetype";
/// EPUB 的 mimetype 内容
pub const EPUB_MIMETYPE: &str = "application/epub+zip";
/// OPF包文档的媒体类型
pub const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Container.xml中的rootfile信息
#[derive(Debug, Clone)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// Container.xml的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

/// 解析得到的包文档位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPointer {
    /// 包文档在压缩包中的完整路径
    pub package_path: String,
    /// 包文档所在目录，根目录时为空字符串
    pub base_dir: String,
}

impl ContainerPointer {
    pub fn new(package_path: impl Into<String>) -> Self {
        let package_path = package_path.into();
        let base_dir = match package_path.rfind('/') {
            Some(pos) => package_path[..pos].to_string(),
            None => String::new(),
        };
        Self { package_path, base_dir }
    }
}

impl Container {
    /// 解析container.xml内容
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container>` - XML损坏或没有rootfile时返回container阶段的格式错误
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);

        let xml_error = |e: &dyn std::fmt::Display| {
            EpubError::format(Stage::Container, format!("XML解析错误: {}", e))
        };

        let mut rootfiles = Vec::new();
        let mut in_rootfiles = false;

        loop {
            match reader.read_event().map_err(|e| xml_error(&e))? {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    match e.local_name().as_ref() {
                        b"rootfiles" => {
                            in_rootfiles = true;
                        }
                        b"rootfile" if in_rootfiles => {
                            let mut full_path = String::new();
                            let mut media_type = String::new();

                            for attr_result in e.attributes() {
                                let attr = attr_result.map_err(|e| xml_error(&e))?;
                                match attr.key.local_name().as_ref() {
                                    b"full-path" => {
                                        full_path = String::from_utf8_lossy(&attr.value).to_string();
                                    }
                                    b"media-type" => {
                                        media_type = String::from_utf8_lossy(&attr.value).to_string();
                                    }
                                    _ => {}
                                }
                            }

                            if !full_path.is_empty() {
                                rootfiles.push(RootFile { full_path, media_type });
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    if e.local_name().as_ref() == b"rootfiles" {
                        in_rootfiles = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if rootfiles.is_empty() {
            return Err(EpubError::format(Stage::Container, "没有找到任何rootfile条目"));
        }

        Ok(Container { rootfiles })
    }

    /// 获取主要的OPF文件路径
    ///
    /// 优先返回媒体类型为OPF的rootfile，否则返回第一个。
    pub fn get_opf_path(&self) -> Option<String> {
        self.rootfiles
            .iter()
            .find(|rf| rf.media_type == PACKAGE_MEDIA_TYPE)
            .or_else(|| self.rootfiles.first())
            .map(|rf| rf.full_path.clone())
    }
}

/// 定位压缩包中的根包文档
///
/// mimetype文件缺失或内容不符时只记录警告，不影响解析。
pub fn resolve(archive: &dyn EntrySource) -> Result<ContainerPointer> {
    check_mimetype(archive);

    let content = archive.read_text(CONTAINER_PATH).map_err(|e| {
        EpubError::format(Stage::Container, format!("无法读取{}: {}", CONTAINER_PATH, e))
    })?;

    let container = Container::parse_xml(&content)?;
    let package_path = container
        .get_opf_path()
        .ok_or_else(|| EpubError::format(Stage::Container, "container.xml中没有找到有效的rootfile"))?;

    debug!(package = %package_path, "找到包文档");
    Ok(ContainerPointer::new(package_path))
}

fn check_mimetype(archive: &dyn EntrySource) {
    match archive.read_text(MIMETYPE_PATH) {
        Ok(content) if content.trim() == EPUB_MIMETYPE => {}
        Ok(content) => {
            warn!(found = %content.trim(), expected = EPUB_MIMETYPE, "mimetype内容不符，继续解析");
        }
        Err(_) => {
            warn!("缺少mimetype文件，继续解析");
        }
    }
}
