//! 转换结果校验

use std::fmt;

use crate::convert::{ConversionResultSet, METADATA_FILE, TOC_FILE};

/// 校验发现的问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingTableOfContents,
    MissingMetadata,
    NoChapters,
    /// 内容去掉空白后为空的文件
    BlankFile(String),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingTableOfContents => write!(f, "缺少目录文件 {}", TOC_FILE),
            ValidationIssue::MissingMetadata => write!(f, "缺少元数据文件 {}", METADATA_FILE),
            ValidationIssue::NoChapters => f.write_str("没有任何章节文件"),
            ValidationIssue::BlankFile(name) => write!(f, "文件内容为空: {}", name),
        }
    }
}

fn is_chapter_file(name: &str) -> bool {
    name != TOC_FILE && name != METADATA_FILE && name.ends_with(".md")
}

/// 列出转换结果中的所有问题
pub fn check(result_set: &ConversionResultSet) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !result_set.contains_key(TOC_FILE) {
        issues.push(ValidationIssue::MissingTableOfContents);
    }
    if !result_set.contains_key(METADATA_FILE) {
        issues.push(ValidationIssue::MissingMetadata);
    }
    if !result_set.keys().any(|name| is_chapter_file(name)) {
        issues.push(ValidationIssue::NoChapters);
    }

    issues.extend(
        result_set
            .iter()
            .filter(|(_, content)| content.trim().is_empty())
            .map(|(name, _)| ValidationIssue::BlankFile(name.clone())),
    );

    issues
}

/// 转换结果是否完整
pub fn validate(result_set: &ConversionResultSet) -> bool {
    check(result_set).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_set() -> ConversionResultSet {
        let mut files = ConversionResultSet::new();
        files.insert(TOC_FILE.to_string(), "# 目录".to_string());
        files.insert(METADATA_FILE.to_string(), "{}".to_string());
        files.insert("001-开端.md".to_string(), "# 开端".to_string());
        files
    }

    #[test]
    fn test_complete_set_is_valid() {
        assert!(validate(&complete_set()));
        assert!(check(&complete_set()).is_empty());
    }

    #[test]
    fn test_missing_files() {
        let mut files = complete_set();
        files.remove(TOC_FILE);
        files.remove(METADATA_FILE);
        files.remove("001-开端.md");

        assert_eq!(
            check(&files),
            vec![
                ValidationIssue::MissingTableOfContents,
                ValidationIssue::MissingMetadata,
                ValidationIssue::NoChapters,
            ]
        );
        assert!(!validate(&files));
    }

    #[test]
    fn test_blank_file() {
        let mut files = complete_set();
        files.insert("002-空白.md".to_string(), " \n\t ".to_string());

        assert_eq!(check(&files), vec![ValidationIssue::BlankFile("002-空白.md".to_string())]);
        assert!(!validate(&files));
    }
}
