// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Aggregate transfer statistics.

use std::collections::HashSet;
use std::time::Duration;

use crate::engine::{SwarmEngine, TransferHandle};

/// One snapshot of swarm-wide totals. Rates are derived from the
/// previous snapshot, so snapshots form a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggStats {
    pub read_bytes_per_sec: u64,
    pub write_bytes_per_sec: u64,
    pub peers_count: usize,
    /// Percent of expected bytes on disk. NaN when nothing is expected.
    pub progress: f32,
    pub transfers_count: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Aggregates counters across every live transfer and derives rates
/// against `prev` over `interval`. Wire and payload counters both count
/// toward the totals; peers are deduplicated by id across transfers.
pub fn calc_stats<E: SwarmEngine>(prev: &AggStats, interval: Duration, engine: &E) -> AggStats {
    let mut bytes_read = 0u64;
    let mut bytes_written = 0u64;
    let mut bytes_completed = 0u64;
    let mut bytes_total = 0u64;
    let mut peers = HashSet::new();

    let transfers = engine.transfers();
    for transfer in &transfers {
        let counters = transfer.counters();
        bytes_read += counters.bytes_read + counters.bytes_read_data;
        bytes_written += counters.bytes_written + counters.bytes_written_data;
        bytes_completed += transfer.bytes_completed();
        bytes_total += transfer.total_length();
        peers.extend(transfer.connected_peers());
    }

    let secs = interval.as_secs().max(1);
    AggStats {
        read_bytes_per_sec: bytes_read.saturating_sub(prev.bytes_read) / secs,
        write_bytes_per_sec: bytes_written.saturating_sub(prev.bytes_written) / secs,
        peers_count: peers.len(),
        progress: (100.0 * (bytes_completed as f64 / bytes_total as f64)) as f32,
        transfers_count: transfers.len(),
        bytes_read,
        bytes_written,
    }
}
