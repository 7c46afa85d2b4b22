//! 内容文档解析
//!
//! 内容文档按XHTML用quick-xml解析，不是良构XML时退回scraper的HTML5解析。
//! 两条路径都逐个遍历文本节点，实体在解析时解码一次，得到的正文不再含任何标记。

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use scraper::{ElementRef, Html};
use tracing::debug;

use crate::epub::text::{collapse_whitespace, to_paragraphs};

/// 解析后的内容文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDocument {
    /// `<title>` 优先，其次是第一个 `h1`-`h6`
    pub title: Option<String>,
    /// 纯文本正文，段落之间以空行分隔
    pub content: String,
}

impl ContentDocument {
    /// 解析单个内容文档
    ///
    /// 标记损坏时也会尽量提取文本，不会失败。
    pub fn parse(markup: &str) -> Self {
        let collector = match collect_xml(markup) {
            Some(collector) => collector,
            None => {
                debug!("内容文档不是良构XML，按HTML解析");
                collect_html(markup)
            }
        };
        collector.finish()
    }
}

/// 内容被整体忽略的元素
fn is_hidden(name: &str) -> bool {
    matches!(name, "head" | "script" | "style" | "noscript" | "template")
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// 开始和结束处断行的元素
fn is_block(name: &str) -> bool {
    is_heading(name)
        || matches!(
            name,
            "p" | "div"
                | "br"
                | "hr"
                | "li"
                | "ul"
                | "ol"
                | "dl"
                | "dt"
                | "dd"
                | "blockquote"
                | "pre"
                | "section"
                | "article"
                | "aside"
                | "header"
                | "footer"
                | "nav"
                | "table"
                | "tr"
                | "figure"
                | "figcaption"
                | "body"
        )
}

/// XHTML里常见但XML没有预定义的实体
fn resolve_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ensp" | "emsp" | "thinsp" => " ",
        "mdash" => "—",
        "ndash" => "–",
        "hellip" => "…",
        "middot" => "·",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "laquo" => "«",
        "raquo" => "»",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "shy" => "",
        _ => return None,
    };
    Some(value)
}

/// 遍历文档时收集标题和正文
#[derive(Default)]
struct TextCollector {
    text: String,
    title: Option<String>,
    heading: Option<String>,
    /// 正在读取的 `<title>` 文本
    title_buffer: Option<String>,
    /// 正在读取的第一个标题元素文本
    heading_buffer: Option<String>,
    heading_depth: usize,
    hidden_depth: usize,
}

impl TextCollector {
    fn open(&mut self, name: &str) {
        if name == "title" && self.title.is_none() {
            self.title_buffer = Some(String::new());
        }
        if is_hidden(name) {
            self.hidden_depth += 1;
        }
        if self.hidden_depth > 0 {
            return;
        }

        if is_heading(name) {
            if self.heading.is_none() && self.heading_depth == 0 {
                self.heading_buffer = Some(String::new());
            }
            self.heading_depth += 1;
        }
        if is_block(name) {
            self.break_line();
        }
    }

    fn close(&mut self, name: &str) {
        if name == "title" {
            if let Some(buffer) = self.title_buffer.take() {
                self.title = Some(collapse_whitespace(&buffer)).filter(|t| !t.is_empty());
            }
        }
        if is_hidden(name) {
            self.hidden_depth = self.hidden_depth.saturating_sub(1);
            return;
        }
        if self.hidden_depth > 0 {
            return;
        }

        if is_heading(name) && self.heading_depth > 0 {
            self.heading_depth -= 1;
            if self.heading_depth == 0 {
                if let Some(buffer) = self.heading_buffer.take() {
                    self.heading = Some(collapse_whitespace(&buffer)).filter(|t| !t.is_empty());
                }
            }
        }
        if is_block(name) {
            self.break_line();
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(buffer) = self.title_buffer.as_mut() {
            buffer.push_str(text);
            return;
        }
        if self.hidden_depth > 0 {
            return;
        }
        if let Some(buffer) = self.heading_buffer.as_mut() {
            buffer.push_str(text);
        }

        // 行内空白按HTML的方式折叠，断行只来自块级元素
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !self.text.is_empty() && !self.text.ends_with([' ', '\n']) {
                    self.text.push(' ');
                }
            } else {
                self.text.push(ch);
            }
        }
    }

    fn break_line(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }

    fn finish(self) -> ContentDocument {
        ContentDocument {
            title: self.title.or(self.heading),
            content: to_paragraphs(&self.text),
        }
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// 按XML解析，任何错误或未闭合的元素都返回None
fn collect_xml(markup: &str) -> Option<TextCollector> {
    let mut reader = Reader::from_str(markup);
    let mut collector = TextCollector::default();
    let mut open_elements: Vec<String> = Vec::new();

    loop {
        match reader.read_event().ok()? {
            Event::Start(ref e) => {
                let name = element_name(e.local_name().as_ref());
                collector.open(&name);
                open_elements.push(name);
            }
            Event::Empty(ref e) => {
                let name = element_name(e.local_name().as_ref());
                collector.open(&name);
                collector.close(&name);
            }
            Event::End(_) => {
                let name = open_elements.pop()?;
                collector.close(&name);
            }
            Event::Text(ref e) => {
                let text = e.unescape_with(resolve_entity).ok()?;
                collector.push_text(&text);
            }
            Event::CData(ref e) => {
                collector.push_text(&String::from_utf8_lossy(e));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    open_elements.is_empty().then_some(collector)
}

/// 按HTML5解析，永远成功
fn collect_html(markup: &str) -> TextCollector {
    let document = Html::parse_document(markup);
    let mut collector = TextCollector::default();
    walk_element(document.root_element(), &mut collector);
    collector
}

fn walk_element(element: ElementRef, collector: &mut TextCollector) {
    let name = element.value().name().to_ascii_lowercase();
    collector.open(&name);

    for node in element.children() {
        match node.value() {
            scraper::node::Node::Text(text) => collector.push_text(text),
            scraper::node::Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(node) {
                    walk_element(child, collector);
                }
            }
            _ => {}
        }
    }

    collector.close(&name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_closing_script_in_head() {
        let document = ContentDocument::parse(
            r#"<html><head><title>第一章</title><script type="text/javascript" src="a.js"/></head><body><p>正文内容在这里</p></body></html>"#,
        );
        assert_eq!(document.title.as_deref(), Some("第一章"));
        assert_eq!(document.content, "正文内容在这里");
    }

    #[test]
    fn test_empty_title_falls_back_to_heading() {
        let document =
            ContentDocument::parse("<html><head><title/></head><body><h1>真标题</h1><p>正文内容在这里</p></body></html>");
        assert_eq!(document.title.as_deref(), Some("真标题"));
        assert_eq!(document.content, "真标题\n\n正文内容在这里");
    }

    #[test]
    fn test_escaped_text_is_decoded_once() {
        let document = ContentDocument::parse(
            "<html><body><p>if x&lt;y and y&gt;z then ok</p><p>literal &amp;lt; stays</p></body></html>",
        );
        assert_eq!(document.content, "if x<y and y>z then ok\n\nliteral &lt; stays");
    }

    #[test]
    fn test_inline_whitespace_is_collapsed() {
        let document = ContentDocument::parse(
            "<html><body><h2>  第三章\n  结束 </h2><p>一行\n   <em>强调</em>&nbsp;继续</p>第二行<br/>第三行</body></html>",
        );
        assert_eq!(document.title.as_deref(), Some("第三章 结束"));
        assert_eq!(document.content, "第三章 结束\n\n一行 强调 继续\n\n第二行\n\n第三行");
    }

    #[test]
    fn test_hidden_elements_are_skipped() {
        let document = ContentDocument::parse(
            "<html><head><style>p { color: red; }</style></head><body><script>var a = 1 &lt; 2;</script><p>可见<!-- 注释 --></p><p><![CDATA[<原样>]]></p></body></html>",
        );
        assert_eq!(document.title, None);
        assert_eq!(document.content, "可见\n\n<原样>");
    }

    #[test]
    fn test_html_entities_in_xml() {
        let document = ContentDocument::parse("<html><body><p>他说&ldquo;好&rdquo;&hellip;&#x4E00;&#20108;</p></body></html>");
        assert_eq!(document.content, "他说“好”…一二");
    }

    #[test]
    fn test_malformed_markup_falls_back_to_html() {
        let document = ContentDocument::parse("<html><body><h1>残缺<p>段落一<p>段落二</div>");
        assert!(document.title.is_some_and(|t| t.starts_with("残缺")));
        assert!(document.content.contains("段落一"));
        assert!(document.content.contains("段落二"));
    }

    #[test]
    fn test_html_fallback_keeps_literal_angle_brackets() {
        // 未知实体让XML解析失败，走HTML路径
        let document = ContentDocument::parse("<html><body><p>a &lt; b</p><p>&unknown; x&gt;y</p></body></html>");
        assert_eq!(document.content, "a < b\n\n&unknown; x>y");
    }

    #[test]
    fn test_unclosed_document_falls_back_to_html() {
        let document = ContentDocument::parse("<html><head><title>未闭合</title></head><body><p>正文");
        assert_eq!(document.title.as_deref(), Some("未闭合"));
        assert_eq!(document.content, "正文");
    }
}
