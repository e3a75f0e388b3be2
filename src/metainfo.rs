// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Descriptor files, content hashes, and magnet-style references.
//!
//! A descriptor file is the on-disk bencoded form of a [`Metainfo`]. The
//! content hash identifying a transfer is the SHA-1 of the bencoded `info`
//! dictionary, so parsing re-encodes that dictionary byte-exactly and keeps
//! it around for hashing.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_bencode::de;
use serde_bencode::value::Value;
use sha1::{Digest, Sha1};

/// Length in bytes of a content hash and of each entry in `pieces`.
pub const HASH_LEN: usize = 20;

#[derive(Debug)]
pub enum ParseError {
    Io(std::io::Error),
    Bencode(serde_bencode::Error),
    MissingInfoDict,
    InvalidHash,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "descriptor file I/O error: {}", e),
            ParseError::Bencode(e) => write!(f, "bencode error: {}", e),
            ParseError::MissingInfoDict => {
                write!(f, "missing 'info' dictionary in descriptor file")
            }
            ParseError::InvalidHash => write!(f, "invalid content hash"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<serde_bencode::Error> for ParseError {
    fn from(e: serde_bencode::Error) -> Self {
        ParseError::Bencode(e)
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// SHA-1 of a descriptor's bencoded info dictionary; the unique key for one
/// unit of distributable content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfoHash(pub [u8; HASH_LEN]);

impl InfoHash {
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InfoHash({})", hex::encode(self.0))
    }
}

impl FromStr for InfoHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| ParseError::InvalidHash)?;
        let hash: [u8; HASH_LEN] = bytes.try_into().map_err(|_| ParseError::InvalidHash)?;
        Ok(InfoHash(hash))
    }
}

/// One distributable content unit: the info dictionary plus announce tiers.
///
/// Field order matches bencode key order so serialization is canonical.
/// `info_bytes` is the bencoded info dictionary captured at parse time (or
/// produced by [`Metainfo::from_info`]) and is what the content hash covers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Metainfo {
    #[serde(skip)]
    pub info_bytes: Vec<u8>,

    #[serde(default)]
    pub announce: Option<String>,

    #[serde(rename = "announce-list", default)]
    pub announce_list: Vec<Vec<String>>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(rename = "created by", default)]
    pub created_by: Option<String>,

    #[serde(rename = "creation date", default)]
    pub creation_date: Option<i64>,

    pub info: Info,
}

impl Metainfo {
    /// Builds a descriptor around an already-known info dictionary.
    pub fn from_info(info: Info, announce_list: Vec<Vec<String>>) -> Result<Self, ParseError> {
        let info_bytes = serde_bencode::to_bytes(&info)?;
        Ok(Metainfo {
            info_bytes,
            announce: None,
            announce_list,
            comment: None,
            created_by: None,
            creation_date: None,
            info,
        })
    }

    pub fn info_hash(&self) -> InfoHash {
        let mut hasher = Sha1::new();
        hasher.update(&self.info_bytes);
        InfoHash(hasher.finalize().into())
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        // Pull the raw info dictionary out first and re-encode it, so the
        // hash covers the file's own bytes even if the dictionary carries
        // keys the typed struct does not model.
        let raw: Value = de::from_bytes(data)?;
        let info_value = if let Value::Dict(mut top_level) = raw {
            top_level
                .remove("info".as_bytes())
                .ok_or(ParseError::MissingInfoDict)?
        } else {
            return Err(ParseError::MissingInfoDict);
        };
        let info_bytes = serde_bencode::to_bytes(&info_value)?;

        let mut metainfo: Metainfo = de::from_bytes(data)?;
        metainfo.info_bytes = info_bytes;
        Ok(metainfo)
    }

    pub async fn load_from_file(path: &Path) -> Result<Self, ParseError> {
        let data = tokio::fs::read(path).await?;
        Self::from_bytes(&data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ParseError> {
        Ok(serde_bencode::to_bytes(self)?)
    }
}

/// The info dictionary: name, piece layout, and file lengths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Info {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<InfoFile>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub length: i64,

    pub name: String,

    #[serde(rename = "piece length")]
    pub piece_length: i64,

    /// Concatenated 20-byte SHA-1 piece hashes.
    #[serde(with = "serde_bytes")]
    #[serde(default)]
    pub pieces: Vec<u8>,
}

impl Info {
    /// Declared length across the single-file and multi-file layouts.
    pub fn total_length(&self) -> i64 {
        if self.length > 0 {
            return self.length;
        }
        self.files.iter().map(|f| f.length).sum()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len() / HASH_LEN
    }

    /// Declared hash of one piece; `None` past the end of `pieces`.
    pub fn piece_hash(&self, index: usize) -> Option<&[u8]> {
        let start = index * HASH_LEN;
        let end = start + HASH_LEN;
        if end <= self.pieces.len() {
            Some(&self.pieces[start..end])
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InfoFile {
    pub length: i64,
    pub path: Vec<String>,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Hash-only transfer reference: the content hash plus announce endpoints,
/// rendered in magnet URI form for engines that take one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetRef {
    pub info_hash: InfoHash,
    pub trackers: Vec<String>,
}

impl MagnetRef {
    /// Flattens announce tiers into the single tracker list magnets carry.
    pub fn new(info_hash: InfoHash, announce_tiers: &[Vec<String>]) -> Self {
        let trackers = announce_tiers.iter().flatten().cloned().collect();
        MagnetRef {
            info_hash,
            trackers,
        }
    }
}

impl fmt::Display for MagnetRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "magnet:?xt=urn:btih:{}", self.info_hash)?;
        for tracker in &self.trackers {
            write!(f, "&tr={}", urlencoding::encode(tracker))?;
        }
        Ok(())
    }
}
