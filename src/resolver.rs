// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconciliation between the descriptor directory, the expected
//! content set and the engine's registered transfers.
//!
//! Two passes run at startup: [`add_metainfo_files`] registers every
//! descriptor already on disk, then [`resolve_absent`] fills the gaps
//! from content hashes alone and waits for the swarm to produce the
//! missing metadata. Both are idempotent, so a restart simply walks the
//! same ground again.

use std::path::{Path, PathBuf};

use tokio::sync::broadcast;

use crate::engine::{SwarmEngine, TransferHandle};
use crate::errors::ResolveError;
use crate::metainfo::{InfoHash, MagnetRef, Metainfo};
use crate::shutdown;

pub const DESCRIPTOR_EXT: &str = "torrent";

/// Descriptor files under `dir`, sorted by path.
pub async fn all_metainfo_paths(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == DESCRIPTOR_EXT) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Registers every descriptor file under `dir` with the engine. The
/// announce list of each descriptor is replaced with `trackers` so all
/// transfers announce to the same place regardless of who cut the
/// descriptor. Fails on the first unreadable descriptor.
pub async fn add_metainfo_files<E: SwarmEngine>(
    engine: &E,
    dir: &Path,
    trackers: &[Vec<String>],
) -> Result<(), ResolveError> {
    let paths = all_metainfo_paths(dir).await.map_err(ResolveError::List)?;
    for path in paths {
        let mut metainfo = Metainfo::load_from_file(&path)
            .await
            .map_err(|source| ResolveError::Load {
                path: path.clone(),
                source,
            })?;
        metainfo.announce_list = trackers.to_vec();
        if engine.transfer(&metainfo.info_hash()).is_some() {
            continue;
        }
        engine.add_metainfo(metainfo)?;
    }
    Ok(())
}

/// Brings the engine's transfer set up to `expected`. Hashes without a
/// registered transfer are added as magnets with data flow enabled,
/// then the call blocks until every transfer has metadata, persisting a
/// descriptor file for each one that lacks it on disk.
pub async fn resolve_absent<E: SwarmEngine>(
    engine: &E,
    expected: &[InfoHash],
    dir: &Path,
    trackers: &[Vec<String>],
    shutdown_rx: &mut broadcast::Receiver<()>,
) -> Result<(), ResolveError> {
    for hash in expected {
        if shutdown::interrupted(shutdown_rx) {
            return Err(ResolveError::Cancelled);
        }
        if engine.transfer(hash).is_some() {
            continue;
        }
        let transfer = engine.add_magnet(&MagnetRef::new(*hash, trackers))?;
        transfer.allow_data_download();
        transfer.allow_data_upload();
    }

    for transfer in engine.transfers() {
        let mut ready = transfer.metadata_ready();
        tokio::select! {
            _ = shutdown_rx.recv() => return Err(ResolveError::Cancelled),
            result = ready.wait_for(|ready| *ready) => {
                // A dead channel means the engine dropped the transfer
                // underneath us; nothing left to persist for it.
                if result.is_err() {
                    continue;
                }
            }
        }
        if let Some(metainfo) = transfer.metainfo() {
            write_metainfo_if_absent(dir, &metainfo).await?;
        }
    }
    Ok(())
}

/// Writes `metainfo` to `<name>.torrent` under `dir` unless a file of
/// that name already exists. Returns the path when a file was written.
pub async fn write_metainfo_if_absent(
    dir: &Path,
    metainfo: &Metainfo,
) -> Result<Option<PathBuf>, ResolveError> {
    let path = dir.join(format!("{}.{}", metainfo.info.name, DESCRIPTOR_EXT));
    match tokio::fs::try_exists(&path).await {
        Ok(true) => return Ok(None),
        Ok(false) => {}
        Err(source) => {
            return Err(ResolveError::Persist {
                path,
                source: source.into(),
            });
        }
    }
    let bytes = metainfo.to_bytes().map_err(|source| ResolveError::Persist {
        path: path.clone(),
        source,
    })?;
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| ResolveError::Persist {
            path: path.clone(),
            source: source.into(),
        })?;
    Ok(Some(path))
}
