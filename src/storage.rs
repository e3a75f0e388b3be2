// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! On-disk layout of a descriptor's data files.
//!
//! The verification pass addresses content by global offset into the
//! concatenated data stream; [`FileLayout`] maps those offsets onto the
//! single-file or multi-file layout a descriptor declares.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

use crate::errors::StorageError;
use crate::metainfo::Info;

#[derive(Debug, Clone)]
pub struct FileSpan {
    /// Full path of the file on disk.
    pub path: PathBuf,
    /// File length in bytes.
    pub length: u64,
    /// Offset of the file's first byte within the data stream.
    pub global_offset: u64,
}

/// Data-stream view over a descriptor's files rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileLayout {
    pub files: Vec<FileSpan>,
    pub total_size: u64,
}

impl FileLayout {
    /// Lays the descriptor's files out under `root_dir`. Single-file
    /// descriptors place one file named after the descriptor; multi-file
    /// descriptors nest their declared paths below the root.
    pub fn from_info(root_dir: &Path, info: &Info) -> Self {
        if info.files.is_empty() {
            let length = info.length.max(0) as u64;
            return FileLayout {
                files: vec![FileSpan {
                    path: root_dir.join(&info.name),
                    length,
                    global_offset: 0,
                }],
                total_size: length,
            };
        }

        let mut files = Vec::with_capacity(info.files.len());
        let mut offset = 0;
        for file in &info.files {
            let mut path = root_dir.to_path_buf();
            for component in &file.path {
                path.push(component);
            }
            let length = file.length.max(0) as u64;
            files.push(FileSpan {
                path,
                length,
                global_offset: offset,
            });
            offset += length;
        }
        FileLayout {
            files,
            total_size: offset,
        }
    }

    /// Reads `len` bytes starting at `global_offset`, crossing file
    /// boundaries as needed. Short layouts surface as an error.
    pub async fn read_at(&self, global_offset: u64, len: usize) -> Result<Vec<u8>, StorageError> {
        if len == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = Vec::with_capacity(len);
        let mut bytes_read = 0;

        for span in &self.files {
            let span_end = span.global_offset + span.length;
            let read_start = global_offset + bytes_read as u64;

            if read_start < span_end && global_offset < span_end {
                let local_offset = read_start.saturating_sub(span.global_offset);
                let chunk = std::cmp::min((len - bytes_read) as u64, span.length - local_offset)
                    as usize;

                if chunk > 0 {
                    let mut file = File::open(&span.path).await?;
                    file.seek(SeekFrom::Start(local_offset)).await?;

                    let mut chunk_buf = vec![0; chunk];
                    file.read_exact(&mut chunk_buf).await?;
                    buffer.extend_from_slice(&chunk_buf);

                    bytes_read += chunk;
                }

                if bytes_read == len {
                    return Ok(buffer);
                }
            }
        }

        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "read past the end of the declared layout",
        )))
    }
}
