// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Swarm session management for bulk snapshot distribution.
//!
//! A node that serves or fetches large immutable snapshot files over a
//! BitTorrent-style swarm. The crate owns everything around the wire
//! protocol rather than the protocol itself: persistent node identity,
//! reconciling the descriptor directory against an expected content
//! set, resolving missing metadata from the swarm, a periodic status
//! loop, piece-hash verification of what landed on disk, and orderly
//! teardown. The engine sits behind the [`engine::SwarmEngine`] trait,
//! so any backend that speaks the protocol can be driven by it.

pub mod client;
pub mod config;
pub mod engine;
pub mod errors;
pub mod formatters;
pub mod identity;
pub mod metainfo;
pub mod resolver;
pub mod session;
pub mod shutdown;
pub mod stats;
pub mod storage;
pub mod token_bucket;
pub mod trackers;
pub mod verify;

pub use client::SwarmClient;
pub use config::{
    default_engine_config, engine_config, EngineConfig, StorageBackend, DEFAULT_PIECE_SIZE,
};
pub use engine::{PeerId, SwarmEngine, TransferCounters, TransferHandle, PEER_ID_LEN};
pub use errors::{
    ClientError, EngineError, IdentityError, ResolveError, StorageError, VerifyError,
};
pub use identity::IdentityStore;
pub use metainfo::{Info, InfoFile, InfoHash, MagnetRef, Metainfo, ParseError, HASH_LEN};
pub use stats::{calc_stats, AggStats};
pub use token_bucket::TokenBucket;
