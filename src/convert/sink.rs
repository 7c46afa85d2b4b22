//! 笔记写入接口
//!
//! 转换结果通过 [`NoteSink`] 交给外部的笔记存储。命令行工具使用 [`DirectorySink`] 写入本地目录。

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::convert::ConversionResultSet;
use crate::epub::error::Result;

/// 笔记存储
pub trait NoteSink {
    /// 写入一个笔记文件，已存在时覆盖
    fn write_note(&mut self, relative_path: &str, content: &str) -> Result<()>;
}

/// 写入本地目录的笔记存储
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl NoteSink for DirectorySink {
    fn write_note(&mut self, relative_path: &str, content: &str) -> Result<()> {
        let relative = Path::new(relative_path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("笔记路径必须是相对路径: {}", relative_path),
            )
            .into());
        }

        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;

        debug!(path = %path.display(), bytes = content.len(), "笔记已写入");
        Ok(())
    }
}

/// 把转换结果写入笔记存储
///
/// # 参数
/// * `result_set` - 转换结果
/// * `sink` - 目标存储
/// * `base_path` - 存储内的目录，为空时直接写在根目录
///
/// # 返回值
/// * `Result<usize>` - 写入的文件数，遇到第一个写入错误即返回
pub fn persist(result_set: &ConversionResultSet, sink: &mut dyn NoteSink, base_path: &str) -> Result<usize> {
    let base = base_path.trim_matches('/');

    for (name, content) in result_set {
        let path = if base.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", base, name)
        };
        sink.write_note(&path, content)?;
    }

    Ok(result_set.len())
}
