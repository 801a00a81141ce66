// 源文件读写
// 读取时容忍非法编码字节，写入时先写临时文件再原子替换

use crate::error::{CoreError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 待标注的源文件内容；`has_bom` 记录原文件是否以 UTF-8 BOM 开头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub text: String,
    pub has_bom: bool,
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn decode(path: &Path, bytes: &[u8]) -> String {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        log::warn!(
            "{} contains invalid UTF-8; undecodable bytes were replaced",
            path.display()
        );
    }
    text.into_owned()
}

/// 读取文本，去掉 BOM，非法 UTF-8 字节替换为 U+FFFD
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = read_bytes(path)?;
    Ok(decode(path, &bytes))
}

/// 读取源文件，同时记住 BOM 以便原样写回
pub fn read_source(path: &Path) -> Result<SourceText> {
    let bytes = read_bytes(path)?;
    Ok(SourceText {
        has_bom: bytes.starts_with(UTF8_BOM),
        text: decode(path, &bytes),
    })
}

/// 原子写入：同目录临时文件 + rename，读者看不到写了一半的内容
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    write_bytes(path, &[text.as_bytes()])
}

/// 写回源文件，原文件带 BOM 时保留
pub fn write_source(path: &Path, text: &str, has_bom: bool) -> Result<()> {
    let bom: &[u8] = if has_bom { UTF8_BOM } else { b"" };
    write_bytes(path, &[bom, text.as_bytes()])
}

fn write_bytes(path: &Path, chunks: &[&[u8]]) -> Result<()> {
    let write_err = |source: std::io::Error| CoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    for chunk in chunks {
        tmp.write_all(chunk).map_err(write_err)?;
    }
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// 按行切分并保留行尾，拼接后与原文完全一致
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// 行尾（"\r\n"、"\n" 或空）
pub fn line_ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// 行首缩进
pub fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}
