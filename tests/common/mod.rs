#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// 测试用的章节
pub struct TestChapter {
    pub id: String,
    pub title: String,
    pub body: String,
    /// 为false时只写入清单，不写入文件
    pub present: bool,
    /// 完整的文档内容，设置后忽略title和body
    pub document: Option<String>,
}

impl TestChapter {
    pub fn new(id: &str, title: &str, body: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            present: true,
            document: None,
        }
    }

    pub fn with_document(id: &str, document: &str) -> Self {
        Self {
            document: Some(document.to_string()),
            ..Self::new(id, "", "")
        }
    }

    pub fn missing(id: &str) -> Self {
        Self {
            present: false,
            ..Self::new(id, "", "")
        }
    }

    fn xhtml(&self) -> String {
        if let Some(document) = &self.document {
            return document.clone();
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title>{}</title></head><body>{}</body></html>",
            self.title, self.body
        )
    }
}

/// 在内存中构建EPUB文件
pub struct EpubBuilder {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub chapters: Vec<TestChapter>,
    pub mimetype: bool,
    /// 替换生成的OPF内容
    pub package_override: Option<String>,
}

impl Default for EpubBuilder {
    fn default() -> Self {
        Self {
            title: Some("测试书籍".to_string()),
            author: Some("测试作者".to_string()),
            description: None,
            chapters: Vec::new(),
            mimetype: true,
            package_override: None,
        }
    }
}

impl EpubBuilder {
    pub fn chapter(mut self, chapter: TestChapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    pub fn package_xml(&self) -> String {
        if let Some(xml) = &self.package_override {
            return xml.clone();
        }

        let mut metadata = String::new();
        if let Some(title) = &self.title {
            metadata.push_str(&format!("<dc:title>{}</dc:title>", title));
        }
        if let Some(author) = &self.author {
            metadata.push_str(&format!("<dc:creator>{}</dc:creator>", author));
        }
        if let Some(description) = &self.description {
            metadata.push_str(&format!("<dc:description>{}</dc:description>", description));
        }

        let manifest: String = self
            .chapters
            .iter()
            .map(|c| format!("<item id=\"{0}\" href=\"text/{0}.xhtml\" media-type=\"application/xhtml+xml\"/>", c.id))
            .collect();
        let spine: String = self
            .chapters
            .iter()
            .map(|c| format!("<itemref idref=\"{}\"/>", c.id))
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="3.0" xmlns="http://www.idpf.org/2007/opf">
<metadata xmlns:dc="http://purl.org/dc/elements/1.1/">{}</metadata>
<manifest>{}</manifest>
<spine>{}</spine>
</package>"#,
            metadata, manifest, spine
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        if self.mimetype {
            zip.start_file("mimetype", options.compression_method(zip::CompressionMethod::Stored))
                .unwrap();
            zip.write_all(b"application/epub+zip").unwrap();
        }

        zip.start_file("META-INF/container.xml", options).unwrap();
        zip.write_all(CONTAINER_XML.as_bytes()).unwrap();

        zip.start_file("OEBPS/content.opf", options).unwrap();
        zip.write_all(self.package_xml().as_bytes()).unwrap();

        for chapter in self.chapters.iter().filter(|c| c.present) {
            zip.start_file(format!("OEBPS/text/{}.xhtml", chapter.id), options)
                .unwrap();
            zip.write_all(chapter.xhtml().as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}

/// 按XML规则转义文本
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// 三章的示例书
pub fn three_chapter_book() -> EpubBuilder {
    EpubBuilder::default()
        .chapter(TestChapter::new("c1", "开端", "<h1>开端</h1><p>故事从这里开始。</p>"))
        .chapter(TestChapter::new("c2", "发展", "<p>Hello world</p><p>中间&amp;过程</p>"))
        .chapter(TestChapter::new("c3", "结局", "<p>完</p>"))
}
