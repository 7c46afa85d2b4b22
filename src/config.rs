//! 导入配置
//!
//! 一个YAML文件可以同时配置解析选项、转换选项和元数据标签表，缺省的部分使用默认值。
//!
//! ```yaml
//! parse:
//!   keep_raw_markup: false
//!   parallel_threshold: 16
//! conversion:
//!   number_chapters: true
//!   title_level: 2
//! metadata_tags:
//!   title:
//!     tags: [title]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::convert::ConversionOptions;
use crate::epub::error::{EpubError, Result};
use crate::epub::{MetadataTagConfigs, ParseOptions};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub parse: ParseOptions,
    pub conversion: ConversionOptions,
    pub metadata_tags: MetadataTagConfigs,
}

impl ImportConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yml::from_str(content).map_err(|e| EpubError::Config(format!("导入配置格式错误: {}", e)))
    }

    /// 从文件加载配置
    ///
    /// 文件不存在或无法读取时返回 `Io` 错误，不会创建默认配置文件。
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), "已加载导入配置");
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yml::to_string(self).map_err(|e| EpubError::Config(format!("序列化导入配置失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = ImportConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ImportConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let yaml = "parse:\n  keep_raw_markup: true\nconversion:\n  title_level: 2\n  add_separators: false\n";
        let config = ImportConfig::from_yaml_str(yaml).unwrap();

        assert!(config.parse.keep_raw_markup);
        assert_eq!(config.parse.parallel_threshold, ParseOptions::default().parallel_threshold);
        assert_eq!(config.conversion.title_level, 2);
        assert!(!config.conversion.add_separators);
        assert!(config.conversion.number_chapters);
        assert_eq!(config.metadata_tags, MetadataTagConfigs::default());
    }

    #[test]
    fn test_roundtrip() {
        let mut config = ImportConfig::default();
        config.conversion.preserve_markup = true;
        config.parse.parallel_threshold = 0;

        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(ImportConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "conversion:\n  number_chapters: false").unwrap();

        let config = ImportConfig::from_file(file.path()).unwrap();
        assert!(!config.conversion.number_chapters);
    }

    #[test]
    fn test_missing_file_and_bad_yaml() {
        assert!(matches!(ImportConfig::from_file("/nonexistent/booknote.yaml"), Err(EpubError::Io(_))));
        assert!(matches!(ImportConfig::from_yaml_str("parse: ["), Err(EpubError::Config(_))));
    }
}
