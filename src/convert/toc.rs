//! 目录渲染

use crate::convert::filename::chapter_filename;
use crate::epub::Book;

/// 千位分组，如 `1234567` 变为 `1,234,567`
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// 渲染目录文件
///
/// 简介只在存在时输出。每个章节一行，链接到对应的章节文件并附上字数。
pub fn render_table_of_contents(book: &Book) -> String {
    let metadata = book.metadata();
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", metadata.title));
    output.push_str(&format!("**作者**: {}\n\n", metadata.author));

    if let Some(description) = metadata.description.as_deref().filter(|d| !d.trim().is_empty()) {
        output.push_str(&format!("**简介**: {}\n\n", description.trim()));
    }

    output.push_str(&format!("**章节数**: {}\n", book.chapter_count()));
    output.push_str(&format!("**总字数**: {}\n\n", group_thousands(book.total_word_count())));

    output.push_str("## 目录\n\n");
    for chapter in book.chapters() {
        output.push_str(&format!(
            "{}. [{}]({}) ({} 字)\n",
            chapter.index + 1,
            chapter.title,
            chapter_filename(chapter.index, &chapter.title),
            group_thousands(chapter.word_count)
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::book::tests::{sample_book, sample_metadata};
    use crate::epub::{Book, ParseStats};

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_render_table_of_contents() {
        let toc = render_table_of_contents(&sample_book());

        assert!(toc.starts_with("# 测试书籍\n\n**作者**: 测试作者\n\n**简介**: 一本用于测试的书\n"));
        assert!(toc.contains("**章节数**: 3\n"));
        assert!(toc.contains("**总字数**: 11\n"));
        assert!(toc.contains("1. [开端](001-开端.md) (6 字)\n"));
        assert!(toc.contains("2. [发展](002-发展.md) (4 字)\n"));
        assert!(toc.contains("3. [结局](003-结局.md) (1 字)\n"));
    }

    #[test]
    fn test_table_of_contents_layout() {
        assert_eq!(
            render_table_of_contents(&sample_book()),
            "# 测试书籍\n\n**作者**: 测试作者\n\n**简介**: 一本用于测试的书\n\n**章节数**: 3\n**总字数**: 11\n\n## 目录\n\n\
             1. [开端](001-开端.md) (6 字)\n2. [发展](002-发展.md) (4 字)\n3. [结局](003-结局.md) (1 字)\n"
        );
    }

    #[test]
    fn test_description_omitted_when_absent() {
        let mut metadata = sample_metadata();
        metadata.description = None;
        let book = Book::assemble(metadata, sample_book().chapters().to_vec(), ParseStats::default());

        let toc = render_table_of_contents(&book);
        assert!(!toc.contains("简介"));
    }
}
