//! 章节文件名规则

/// 文件名中不允许出现的字符
const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// 标题部分的最大长度（UTF-16码元）
pub const MAX_TITLE_UNITS: usize = 50;

/// 清理章节标题，使其可以用作文件名
///
/// 删除 `<>:"/\|?*`，连续空白变为一个 `-`，只保留字母、数字（含CJK文字）和 `-`，
/// 最后截断到50个UTF-16码元。代理对不会被拆开。
pub fn sanitize_title(title: &str) -> String {
    let mut sanitized = String::new();
    let mut units = 0;
    let mut in_whitespace = false;

    for ch in title.chars().filter(|ch| !FORBIDDEN_CHARS.contains(ch)) {
        let kept = if ch.is_whitespace() {
            if in_whitespace {
                continue;
            }
            in_whitespace = true;
            '-'
        } else {
            in_whitespace = false;
            if !(ch.is_alphanumeric() || ch == '-') {
                continue;
            }
            ch
        };

        units += kept.len_utf16();
        if units > MAX_TITLE_UNITS {
            break;
        }
        sanitized.push(kept);
    }

    sanitized
}

/// 章节文件名：`{序号:03}-{清理后的标题}.md`
///
/// 标题清理后为空时只用序号。
pub fn chapter_filename(index: usize, title: &str) -> String {
    let name = sanitize_title(title);
    if name.is_empty() {
        format!("{:03}.md", index + 1)
    } else {
        format!("{:03}-{}.md", index + 1, name)
    }
}
