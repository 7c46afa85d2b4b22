use std::fmt;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// 解析流程中会导致整体失败的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// 压缩包打开阶段
    Archive,
    /// container.xml解析阶段
    Container,
    /// OPF包文档解析阶段
    Package,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Archive => "archive",
            Stage::Container => "container",
            Stage::Package => "package",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Epub相关的错误类型
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("文件格式错误 [{stage}]: {reason}")]
    Format { stage: Stage, reason: String },

    #[error("解析完成但没有任何可用章节")]
    EmptyResult,

    #[error("章节索引越界: {index}, 章节总数: {count}")]
    IndexOutOfRange { index: isize, count: usize },

    #[error("配置文件错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(#[from] io::Error),
}

impl EpubError {
    /// 构造指定阶段的格式错误
    pub fn format(stage: Stage, reason: impl Into<String>) -> Self {
        EpubError::Format {
            stage,
            reason: reason.into(),
        }
    }

    /// 如果是格式错误，返回出错的阶段
    pub fn stage(&self) -> Option<Stage> {
        match self {
            EpubError::Format { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
