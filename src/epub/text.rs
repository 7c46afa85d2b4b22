//! 文本处理模块
//!
//! 章节正文的标签移除、实体解码、段落整理和字数统计。
//! 这些函数都是纯函数，对已经是纯文本的输入不做任何改变。

use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("注释正则"));

static HIDDEN_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:script|style|head)\b[^>]*>.*?</(?:script|style|head)\s*>").expect("隐藏块正则")
});

static BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<br\b[^>]*>|</(?:p|div|h[1-6]|li|dt|dd|blockquote|pre|section|article|aside|header|footer|tr|table|figcaption)\s*>",
    )
    .expect("换行标签正则")
});

/// 只匹配形如标签的片段，`a < b` 这样的普通文本不受影响
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?[A-Za-z][^<>]*>|<![^<>]*>|<\?[^<>]*\?>").expect("标签正则")
});

/// 解码的实体，`&amp;` 必须最后处理，避免二次解码
const ENTITIES: [(&str, &str); 6] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
    ("&amp;", "&"),
];

/// 移除标记
///
/// 注释、`script`/`style`/`head` 块整体删除；块级元素的结束位置和 `<br>` 变为换行；
/// 其余标签直接删除。
pub fn strip_markup(markup: &str) -> String {
    let text = COMMENT_RE.replace_all(markup, "");
    let text = HIDDEN_BLOCK_RE.replace_all(&text, "");
    let text = BREAK_RE.replace_all(&text, "\n");
    TAG_RE.replace_all(&text, "").into_owned()
}

/// 解码固定的几个命名实体
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, replacement)| acc.replace(entity, replacement))
}

/// 整理段落：每行去掉首尾空白，丢弃空行，段落之间用空行分隔
pub fn to_paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 把标记文本整理成纯文本段落
pub fn clean_text(markup: &str) -> String {
    to_paragraphs(&decode_entities(&strip_markup(markup)))
}

/// 是否为CJK统一表意文字
pub fn is_cjk_ideograph(ch: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&ch)
}

/// 统计字数
///
/// 每个CJK统一表意文字算一个字，连续的拉丁字母算一个词，
/// 数字、标点和其他文字都不计数。
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for ch in text.chars() {
        if ch.is_ascii_alphabetic() {
            if !in_word {
                count += 1;
                in_word = true;
            }
            continue;
        }

        in_word = false;
        if is_cjk_ideograph(ch) {
            count += 1;
        }
    }

    count
}

/// 把连续空白压缩为单个空格
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
