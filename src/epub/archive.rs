//! 压缩包读取模块
//!
//! 通过 [`EntrySource`] 能力接口访问EPUB压缩包中的条目，
//! 解析流程的其余部分不直接依赖任何zip库的类型。

use std::io::{Cursor, Read};

use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

use crate::epub::error::{EpubError, Result, Stage};

/// 本地文件头签名
const LOCAL_HEADER_SIGNATURE: &[u8] = b"PK\x03\x04";
/// 空压缩包只包含中央目录结束记录
const EMPTY_ARCHIVE_SIGNATURE: &[u8] = b"PK\x05\x06";

/// 读取单个条目时的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("条目不存在: {0}")]
    NotFound(String),

    #[error("无法读取条目 {path}: {detail}")]
    Unreadable { path: String, detail: String },
}

/// 压缩包条目的只读访问接口
///
/// 实现必须允许多个线程同时读取不同条目。
pub trait EntrySource: Sync {
    /// 条目是否存在
    fn exists(&self, path: &str) -> bool;

    /// 读取条目的二进制内容
    fn read_bytes(&self, path: &str) -> std::result::Result<Vec<u8>, EntryError>;

    /// 读取条目的文本内容
    ///
    /// 会去掉UTF-8的BOM，非法字节按替换字符处理。
    fn read_text(&self, path: &str) -> std::result::Result<String, EntryError> {
        let bytes = self.read_bytes(path)?;
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// 列出所有条目名
    fn entry_names(&self) -> Vec<String>;
}

/// 基于内存字节缓冲区的zip压缩包
#[derive(Debug, Clone)]
pub struct ZipSource<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> ZipSource<'a> {
    /// 打开内存中的压缩包
    ///
    /// # 参数
    /// * `bytes` - 完整的EPUB文件内容
    ///
    /// # 返回值
    /// * `Result<ZipSource>` - 缓冲区为空、签名不对或中央目录损坏时返回archive阶段的格式错误
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(EpubError::format(Stage::Archive, "输入为空"));
        }
        if !bytes.starts_with(LOCAL_HEADER_SIGNATURE) && !bytes.starts_with(EMPTY_ARCHIVE_SIGNATURE) {
            return Err(EpubError::format(Stage::Archive, "不是zip压缩包"));
        }

        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| EpubError::format(Stage::Archive, format!("无法读取压缩包目录: {}", e)))?;

        debug!(entries = archive.len(), size = bytes.len(), "压缩包已打开");
        Ok(Self { archive })
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }
}

impl EntrySource for ZipSource<'_> {
    fn exists(&self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }

    fn read_bytes(&self, path: &str) -> std::result::Result<Vec<u8>, EntryError> {
        let unreadable = |detail: String| EntryError::Unreadable {
            path: path.to_string(),
            detail,
        };

        // 克隆只复制游标，中央目录是共享的，所以每次读取互不干扰
        let mut archive = self.archive.clone();
        let mut file = match archive.by_name(path) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Err(EntryError::NotFound(path.to_string())),
            Err(e) => return Err(unreadable(e.to_string())),
        };

        let mut buffer = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buffer)
            .map_err(|e| unreadable(e.to_string()))?;
        Ok(buffer)
    }

    fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }
}
