use crate::convert::ConversionOptions;
use crate::epub::Chapter;
use crate::epub::text::to_paragraphs;

/// 章节末尾的分隔线
const SEPARATOR: &str = "\n---\n\n";

/// 章节标题文本
pub fn chapter_heading(chapter: &Chapter, options: &ConversionOptions) -> String {
    if options.number_chapters {
        format!("第{}章 {}", chapter.index + 1, chapter.title)
    } else {
        chapter.title.clone()
    }
}

/// 渲染单个章节
///
/// 正文已经是解码后的纯文本，不保留标记时只重新整理段落，不再做标签移除和实体解码。
/// 保留标记时优先使用原始标记，没有原始标记就原样输出正文。
pub fn render_chapter(chapter: &Chapter, options: &ConversionOptions) -> String {
    let mut output = String::new();

    output.push_str(&"#".repeat(options.heading_level()));
    output.push(' ');
    output.push_str(&chapter_heading(chapter, options));
    output.push_str("\n\n");

    let body = if options.preserve_markup {
        chapter
            .raw_markup
            .as_deref()
            .unwrap_or(&chapter.content)
            .trim()
            .to_string()
    } else {
        to_paragraphs(&chapter.content)
    };

    if !body.is_empty() {
        output.push_str(&body);
        output.push('\n');
    }

    if options.add_separators {
        output.push_str(SEPARATOR);
    }

    output
}
