//! 归档读取
//!
//! 通过 zip 中央目录列出条目名，读取 stored 和 deflate 条目的内容，
//! 并用 CRC-32 校验解压后的数据。
//!
//! ```text
//! ┌──────────────────────────┐
//! │ local header + data  ... │
//! ├──────────────────────────┤
//! │ central directory        │  每个条目 46 字节 + 名字/扩展/注释
//! ├──────────────────────────┤
//! │ end of central directory │  22 字节 + 注释
//! └──────────────────────────┘
//! ```

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use thiserror::Error;

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_RECORD_SIGNATURE: u32 = 0x0605_4b50;
const LOCAL_HEADER_SIZE: usize = 30;
const CENTRAL_HEADER_SIZE: usize = 46;
const END_RECORD_SIZE: usize = 22;
const MAX_COMMENT_SIZE: usize = u16::MAX as usize;

/// 压缩方式
pub const METHOD_STORED: u16 = 0;
pub const METHOD_DEFLATED: u16 = 8;

/// 归档读取错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("data too short")]
    TooShort,
    #[error("end of central directory not found")]
    MissingEndRecord,
    #[error("invalid offset {0}")]
    InvalidOffset(usize),
    #[error("bad signature at offset {0}")]
    BadSignature(usize),
    #[error("entry name is not valid UTF-8")]
    InvalidName,
    #[error("entry not found: {0}")]
    EntryNotFound(String),
    #[error("entry {name} uses unsupported compression method {method}")]
    UnsupportedCompression { name: String, method: u16 },
    #[error("checksum mismatch for {0}")]
    ChecksumMismatch(String),
    #[error("cannot inflate {name}: {message}")]
    Inflate { name: String, message: String },
}

/// 中央目录条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub size: u32,
    local_offset: u32,
}

impl ArchiveEntry {
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// 归档读取器
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    data: Vec<u8>,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveReader {
    /// 从字节数组创建读取器
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ArchiveError> {
        if data.len() < END_RECORD_SIZE {
            return Err(ArchiveError::TooShort);
        }

        let end = find_end_record(&data).ok_or(ArchiveError::MissingEndRecord)?;
        let count = read_u16(&data, end + 10)? as usize;
        let directory_offset = read_u32(&data, end + 16)? as usize;

        let mut entries = Vec::with_capacity(count);
        let mut offset = directory_offset;
        for _ in 0..count {
            if read_u32(&data, offset)? != CENTRAL_HEADER_SIGNATURE {
                return Err(ArchiveError::BadSignature(offset));
            }
            let name_len = read_u16(&data, offset + 28)? as usize;
            let extra_len = read_u16(&data, offset + 30)? as usize;
            let comment_len = read_u16(&data, offset + 32)? as usize;
            let name_start = offset + CENTRAL_HEADER_SIZE;
            let name_bytes = slice(&data, name_start, name_len)?;
            let name = std::str::from_utf8(name_bytes)
                .map_err(|_| ArchiveError::InvalidName)?
                .to_string();

            entries.push(ArchiveEntry {
                name,
                method: read_u16(&data, offset + 10)?,
                crc32: read_u32(&data, offset + 16)?,
                compressed_size: read_u32(&data, offset + 20)?,
                size: read_u32(&data, offset + 24)?,
                local_offset: read_u32(&data, offset + 42)?,
            });
            offset = name_start + name_len + extra_len + comment_len;
        }

        Ok(Self { data, entries })
    }

    /// 中央目录顺序的全部条目
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// 读取条目内容，deflate 条目先解压
    pub fn read(&self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let entry = self
            .find(name)
            .ok_or_else(|| ArchiveError::EntryNotFound(name.to_string()))?;

        let offset = entry.local_offset as usize;
        if read_u32(&self.data, offset)? != LOCAL_HEADER_SIGNATURE {
            return Err(ArchiveError::BadSignature(offset));
        }
        let name_len = read_u16(&self.data, offset + 26)? as usize;
        let extra_len = read_u16(&self.data, offset + 28)? as usize;
        let start = offset + LOCAL_HEADER_SIZE + name_len + extra_len;
        let raw = slice(&self.data, start, entry.compressed_size as usize)?;

        let content = match entry.method {
            METHOD_STORED => raw.to_vec(),
            METHOD_DEFLATED => {
                let mut inflated = Vec::with_capacity(entry.size as usize);
                DeflateDecoder::new(raw)
                    .read_to_end(&mut inflated)
                    .map_err(|e| ArchiveError::Inflate {
                        name: entry.name.clone(),
                        message: e.to_string(),
                    })?;
                inflated
            }
            method => {
                return Err(ArchiveError::UnsupportedCompression {
                    name: entry.name.clone(),
                    method,
                })
            }
        };

        if crc32fast::hash(&content) != entry.crc32 {
            return Err(ArchiveError::ChecksumMismatch(entry.name.clone()));
        }
        Ok(content)
    }
}

/// 从尾部向前查找结束记录
fn find_end_record(data: &[u8]) -> Option<usize> {
    let last = data.len() - END_RECORD_SIZE;
    let first = last.saturating_sub(MAX_COMMENT_SIZE);
    (first..=last)
        .rev()
        .find(|&offset| read_u32(data, offset).ok() == Some(END_RECORD_SIGNATURE))
}

fn slice(data: &[u8], start: usize, len: usize) -> Result<&[u8], ArchiveError> {
    let end = start
        .checked_add(len)
        .ok_or(ArchiveError::InvalidOffset(start))?;
    data.get(start..end).ok_or(ArchiveError::InvalidOffset(start))
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, ArchiveError> {
    let bytes = slice(data, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, ArchiveError> {
    let bytes = slice(data, offset, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// 归档写入器
#[derive(Debug, Default)]
pub struct ArchiveWriter {
    data: Vec<u8>,
    directory: Vec<u8>,
    count: u16,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个 stored 条目；以 `/` 结尾的名字为目录条目
    pub fn add(&mut self, name: &str, content: &[u8]) -> &mut Self {
        self.push_entry(name, METHOD_STORED, content, content)
    }

    /// 追加一个 deflate 条目
    pub fn add_deflated(&mut self, name: &str, content: &[u8]) -> std::io::Result<&mut Self> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content)?;
        let compressed = encoder.finish()?;
        Ok(self.push_entry(name, METHOD_DEFLATED, content, &compressed))
    }

    fn push_entry(&mut self, name: &str, method: u16, content: &[u8], stored: &[u8]) -> &mut Self {
        let offset = self.data.len() as u32;
        let crc = crc32fast::hash(content);
        let size = content.len() as u32;
        let compressed_size = stored.len() as u32;
        let name_len = name.len() as u16;

        self.data.extend_from_slice(&LOCAL_HEADER_SIGNATURE.to_le_bytes());
        self.data.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.data.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.data.extend_from_slice(&method.to_le_bytes());
        self.data.extend_from_slice(&[0; 4]); // time, date
        self.data.extend_from_slice(&crc.to_le_bytes());
        self.data.extend_from_slice(&compressed_size.to_le_bytes());
        self.data.extend_from_slice(&size.to_le_bytes());
        self.data.extend_from_slice(&name_len.to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes());
        self.data.extend_from_slice(name.as_bytes());
        self.data.extend_from_slice(stored);

        let d = &mut self.directory;
        d.extend_from_slice(&CENTRAL_HEADER_SIGNATURE.to_le_bytes());
        d.extend_from_slice(&20u16.to_le_bytes()); // version made by
        d.extend_from_slice(&20u16.to_le_bytes()); // version needed
        d.extend_from_slice(&0u16.to_le_bytes());
        d.extend_from_slice(&method.to_le_bytes());
        d.extend_from_slice(&[0; 4]);
        d.extend_from_slice(&crc.to_le_bytes());
        d.extend_from_slice(&compressed_size.to_le_bytes());
        d.extend_from_slice(&size.to_le_bytes());
        d.extend_from_slice(&name_len.to_le_bytes());
        d.extend_from_slice(&[0; 12]); // extra, comment, disk, attributes
        d.extend_from_slice(&offset.to_le_bytes());
        d.extend_from_slice(name.as_bytes());

        self.count += 1;
        self
    }

    /// 写出完整归档
    pub fn finish(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        let directory_offset = out.len() as u32;
        out.extend_from_slice(&self.directory);
        out.extend_from_slice(&END_RECORD_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&[0; 4]); // disk numbers
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&(self.directory.len() as u32).to_le_bytes());
        out.extend_from_slice(&directory_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        ArchiveWriter::new()
            .add("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n")
            .add("api/", b"")
            .add("api/Api.class", b"\xCA\xFE\xBA\xBE")
            .add("module-info.java", b"module m1 { }")
            .finish()
    }

    #[test]
    fn test_list_entries() {
        let reader = ArchiveReader::from_bytes(sample()).unwrap();
        let names: Vec<_> = reader.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["META-INF/MANIFEST.MF", "api/", "api/Api.class", "module-info.java"]
        );
        assert!(reader.entries()[1].is_dir());
        assert!(reader.contains("api/Api.class"));
    }

    #[test]
    fn test_read_stored_entry() {
        let reader = ArchiveReader::from_bytes(sample()).unwrap();
        assert_eq!(reader.read("module-info.java").unwrap(), b"module m1 { }");
        assert_eq!(
            reader.read("missing").unwrap_err(),
            ArchiveError::EntryNotFound("missing".to_string())
        );
    }

    #[test]
    fn test_read_deflated_entry() {
        let source = "module lib {\n    exports lib.api;\n}\n".repeat(4);
        let mut writer = ArchiveWriter::new();
        writer.add("lib/api/Api.class", b"");
        writer.add_deflated("module-info.java", source.as_bytes()).unwrap();
        let reader = ArchiveReader::from_bytes(writer.finish()).unwrap();

        let entry = reader.find("module-info.java").unwrap();
        assert_eq!(entry.method, METHOD_DEFLATED);
        assert!(entry.compressed_size < entry.size);
        assert_eq!(reader.read("module-info.java").unwrap(), source.as_bytes());
    }

    #[test]
    fn test_unknown_method_cannot_be_read() {
        let mut data = sample();
        // 把中央目录中第一个条目的压缩方式改为 bzip2
        let directory = data.len() - END_RECORD_SIZE;
        let offset = read_u32(&data, directory + 16).unwrap() as usize;
        data[offset + 10] = 12;

        let reader = ArchiveReader::from_bytes(data).unwrap();
        assert!(matches!(
            reader.read("META-INF/MANIFEST.MF"),
            Err(ArchiveError::UnsupportedCompression { method: 12, .. })
        ));
    }

    #[test]
    fn test_corrupt_deflate_stream() {
        let mut writer = ArchiveWriter::new();
        writer.push_entry("module-info.java", METHOD_DEFLATED, b"module m {}", &[0xFF; 8]);
        let reader = ArchiveReader::from_bytes(writer.finish()).unwrap();
        assert!(reader.read("module-info.java").is_err());
    }

    #[test]
    fn test_corrupt_data() {
        assert_eq!(ArchiveReader::from_bytes(vec![0; 4]).unwrap_err(), ArchiveError::TooShort);
        assert_eq!(
            ArchiveReader::from_bytes(vec![0; 64]).unwrap_err(),
            ArchiveError::MissingEndRecord
        );

        let mut data = sample();
        let len = data.len();
        data.truncate(len - END_RECORD_SIZE - 10);
        assert!(ArchiveReader::from_bytes(data).is_err());
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut data = sample();
        // 篡改 module-info.java 内容的最后一个字节
        let reader = ArchiveReader::from_bytes(data.clone()).unwrap();
        let entry = reader.find("module-info.java").unwrap().clone();
        let start = entry.local_offset as usize + LOCAL_HEADER_SIZE + entry.name.len();
        data[start + entry.size as usize - 1] = b'x';

        let reader = ArchiveReader::from_bytes(data).unwrap();
        assert_eq!(
            reader.read("module-info.java").unwrap_err(),
            ArchiveError::ChecksumMismatch("module-info.java".to_string())
        );
    }
}
