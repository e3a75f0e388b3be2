// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Piece-hash verification of the data files on disk.
//!
//! Descriptors are walked in path order and every piece is re-hashed
//! against the descriptor. The first mismatch aborts the whole run;
//! nothing after it is looked at, the bad file is left in place for
//! operators to replace.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use sha1::{Digest, Sha1};
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::errors::VerifyError;
use crate::metainfo::{Info, Metainfo};
use crate::resolver::all_metainfo_paths;
use crate::shutdown;
use crate::storage::FileLayout;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Verifies every descriptor under `dir` against its data files.
pub async fn verify_data_files(
    dir: &Path,
    shutdown_rx: &mut broadcast::Receiver<()>,
) -> Result<(), VerifyError> {
    let paths = all_metainfo_paths(dir).await.map_err(VerifyError::List)?;
    let mut descriptors: Vec<(PathBuf, Metainfo)> = Vec::with_capacity(paths.len());
    let mut total_pieces: u64 = 0;
    for path in paths {
        let metainfo = Metainfo::load_from_file(&path)
            .await
            .map_err(|source| VerifyError::Load {
                path: path.clone(),
                source,
            })?;
        total_pieces += metainfo.info.piece_count() as u64;
        descriptors.push((path, metainfo));
    }

    let mut verified: u64 = 0;
    let mut last_report = Instant::now();

    for (path, metainfo) in &descriptors {
        let layout = FileLayout::from_info(dir, &metainfo.info);
        verify_pieces(&metainfo.info, &layout, &mut |piece, good| {
            verified += 1;
            if !good {
                error!(piece, file = %path.display(), "Piece hash mismatch");
                return Err(VerifyError::Mismatch {
                    piece,
                    path: path.clone(),
                });
            }
            if shutdown::interrupted(shutdown_rx) {
                return Err(VerifyError::Cancelled);
            }
            if last_report.elapsed() >= PROGRESS_INTERVAL {
                last_report = Instant::now();
                let progress = 100.0 * verified as f64 / total_pieces as f64;
                info!(progress = %format!("{progress:.2}%"), "Verifying");
            }
            Ok(())
        })
        .await?;
    }

    info!("Verify succeeded");
    Ok(())
}

/// Hashes each piece of one descriptor in index order and reports the
/// outcome through `on_piece`, stopping at its first error.
async fn verify_pieces(
    info: &Info,
    layout: &FileLayout,
    on_piece: &mut impl FnMut(u32, bool) -> Result<(), VerifyError>,
) -> Result<(), VerifyError> {
    let piece_length = info.piece_length.max(0) as u64;
    if piece_length == 0 {
        return Ok(());
    }
    let total = info.total_length().max(0) as u64;

    for index in 0..info.piece_count() {
        let offset = index as u64 * piece_length;
        let len = piece_length.min(total.saturating_sub(offset)) as usize;
        let data = layout.read_at(offset, len).await?;

        let mut hasher = Sha1::new();
        hasher.update(&data);
        let digest = hasher.finalize();
        let good = info.piece_hash(index) == Some(&digest[..]);
        on_piece(index as u32, good)?;
    }
    Ok(())
}
