// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Engine configuration.
//!
//! [`default_engine_config`] is the conservative baseline profile;
//! [`engine_config`] layers the caller's deployment settings on top.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::PeerId;
use crate::token_bucket::TokenBucket;

/// Piece size used when cutting new descriptors.
pub const DEFAULT_PIECE_SIZE: u64 = 2 * 1024 * 1024;

/// How the engine should back transfer data on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Mmap,
    FileIo,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub listen_port: u16,
    pub seed: bool,
    /// Identity to announce with. `None` lets the engine mint one.
    pub peer_id: Option<PeerId>,
    pub upnp_id: String,
    pub verbosity: tracing::Level,
    pub debug: bool,
    pub dht: bool,
    pub min_dial_timeout: Duration,
    pub nominal_dial_timeout: Duration,
    pub handshake_timeout: Duration,
    pub established_conns_per_transfer: usize,
    pub transfer_peers_high_water: usize,
    pub transfer_peers_low_water: usize,
    pub half_open_conns_per_transfer: usize,
    pub total_half_open_conns: usize,
    pub download_limiter: Arc<TokenBucket>,
    pub upload_limiter: Arc<TokenBucket>,
    pub storage: StorageBackend,
}

/// Baseline profile: tracker-only discovery, generous dial timeouts for
/// nodes on commodity networks with ephemeral ports, and a small socket
/// footprint since snapshot swarms are a few large transfers.
pub fn default_engine_config() -> EngineConfig {
    EngineConfig {
        data_dir: PathBuf::new(),
        listen_port: 0,
        seed: false,
        peer_id: None,
        upnp_id: "snapswarm".to_string(),
        verbosity: tracing::Level::INFO,
        debug: false,
        dht: false,
        min_dial_timeout: Duration::from_secs(6),
        nominal_dial_timeout: Duration::from_secs(20),
        handshake_timeout: Duration::from_secs(8),
        established_conns_per_transfer: 5,
        transfer_peers_high_water: 10,
        transfer_peers_low_water: 5,
        half_open_conns_per_transfer: 5,
        total_half_open_conns: 10,
        download_limiter: Arc::new(TokenBucket::unlimited()),
        upload_limiter: Arc::new(TokenBucket::unlimited()),
        storage: StorageBackend::Mmap,
    }
}

/// Deployment configuration on top of the baseline. Rates are bytes per
/// second; zero means unlimited.
pub fn engine_config(
    data_dir: &Path,
    seed: bool,
    verbosity: tracing::Level,
    download_rate: u64,
    upload_rate: u64,
    listen_port: u16,
) -> EngineConfig {
    let mut config = default_engine_config();
    config.data_dir = data_dir.to_path_buf();
    config.listen_port = listen_port;
    config.seed = seed;
    config.upnp_id = format!("{} leecher", config.upnp_id);
    config.verbosity = verbosity;
    config.debug = verbosity == tracing::Level::DEBUG;
    config.download_limiter = Arc::new(rate_limiter(download_rate));
    config.upload_limiter = Arc::new(rate_limiter(upload_rate));
    config
}

fn rate_limiter(rate: u64) -> TokenBucket {
    if rate == 0 {
        return TokenBucket::unlimited();
    }
    // The engine overshoots configured rates by roughly 2x, so hand it
    // half of what the caller asked for.
    TokenBucket::new(rate / 2, 2 * DEFAULT_PIECE_SIZE)
}
