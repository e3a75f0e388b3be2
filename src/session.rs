// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Long-running session loop.
//!
//! Ticks every [`STATUS_INTERVAL`], keeps paused transfers moving and
//! reports one line of swarm state per tick until shut down.

use std::time::Duration;

use sysinfo::{ProcessesToUpdate, System};
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::engine::{SwarmEngine, TransferHandle};
use crate::formatters::{format_bytes, format_rate};
use crate::stats::{calc_stats, AggStats};

pub const STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// Drives the engine until the shutdown signal fires.
pub async fn run<E: SwarmEngine>(engine: &E, shutdown_tx: &broadcast::Sender<()>) {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut ticker = tokio::time::interval(STATUS_INTERVAL);
    let mut sys = System::new();
    let mut stats = AggStats::default();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => return,
            _ = ticker.tick() => {
                stats = status_tick(engine, &mut sys, &stats);
            }
        }
    }
}

/// One status pass. Returns the snapshot the next tick should diff
/// against; while metadata is still missing the previous snapshot is
/// carried forward unchanged.
fn status_tick<E: SwarmEngine>(engine: &E, sys: &mut System, prev: &AggStats) -> AggStats {
    let transfers = engine.transfers();
    let mut got_metadata = 0;
    let mut all_complete = true;

    for transfer in &transfers {
        if *transfer.metadata_ready().borrow() {
            got_metadata += 1;
            all_complete &= transfer.is_complete();
        } else {
            // Engines keep data flow paused while metadata is missing;
            // nudge it back on every tick.
            transfer.allow_data_download();
            transfer.allow_data_upload();
            all_complete = false;
        }
    }

    if got_metadata < transfers.len() {
        info!(
            got = got_metadata,
            total = transfers.len(),
            "Waiting for transfers metadata"
        );
        return *prev;
    }

    let stats = calc_stats(prev, STATUS_INTERVAL, engine);
    let (resident, virt) = process_memory(sys);

    if all_complete {
        info!(
            download = %format_rate(stats.read_bytes_per_sec),
            upload = %format_rate(stats.write_bytes_per_sec),
            peers = stats.peers_count,
            transfers = stats.transfers_count,
            mem = %format_bytes(resident),
            vmem = %format_bytes(virt),
            "Seeding"
        );
        return stats;
    }

    info!(
        progress = %format!("{:.2}%", stats.progress),
        download = %format_rate(stats.read_bytes_per_sec),
        upload = %format_rate(stats.write_bytes_per_sec),
        peers = stats.peers_count,
        transfers = stats.transfers_count,
        mem = %format_bytes(resident),
        vmem = %format_bytes(virt),
        "Downloading"
    );

    if stats.peers_count == 0 {
        let banned = engine.banned_peer_addrs();
        if !banned.is_empty() {
            info!(banned = ?banned, "No connected peers");
        }
    }
    stats
}

fn process_memory(sys: &mut System) -> (u64, u64) {
    let pid = match sysinfo::get_current_pid() {
        Ok(pid) => pid,
        Err(e) => {
            error!("failed to get current process id: {e}");
            return (0, 0);
        }
    };
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    match sys.process(pid) {
        Some(process) => (process.memory(), process.virtual_memory()),
        None => (0, 0),
    }
}
