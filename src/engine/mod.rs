// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Swarm engine abstraction.
//!
//! The session layer never touches a concrete BitTorrent implementation
//! directly; it drives whatever sits behind [`SwarmEngine`]. That keeps
//! reconciliation, stats and teardown testable against an in-memory
//! engine and leaves the wire protocol to the backend.

use std::fmt;
use std::net::IpAddr;

use tokio::sync::watch;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::metainfo::{InfoHash, MagnetRef, Metainfo};

#[cfg(test)]
pub(crate) mod sim;

pub const PEER_ID_LEN: usize = 20;

/// Identity of a node in the swarm.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub [u8; PEER_ID_LEN]);

impl PeerId {
    pub fn as_bytes(&self) -> &[u8; PEER_ID_LEN] {
        &self.0
    }

    /// Returns `None` unless `bytes` is exactly [`PEER_ID_LEN`] long.
    pub fn try_from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; PEER_ID_LEN] = bytes.try_into().ok()?;
        Some(PeerId(arr))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PeerId({})", hex::encode(self.0))
    }
}

/// Cumulative transfer counters as the engine reports them. The wire
/// counters include protocol chatter; the data counters only payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferCounters {
    pub bytes_read: u64,
    pub bytes_read_data: u64,
    pub bytes_written: u64,
    pub bytes_written_data: u64,
}

/// A running swarm backend holding any number of transfers.
///
/// Registration is additive: adding content the engine already tracks
/// hands back the existing transfer instead of failing.
pub trait SwarmEngine: Sized {
    type Transfer: TransferHandle;

    fn start(config: EngineConfig) -> Result<Self, EngineError>;

    /// The peer id this engine announces with.
    fn peer_id(&self) -> PeerId;

    /// Registers a transfer from a full descriptor. Metadata is known
    /// up front, so the transfer starts metadata-ready.
    fn add_metainfo(&self, metainfo: Metainfo) -> Result<Self::Transfer, EngineError>;

    /// Registers a transfer from a content hash alone. Metadata arrives
    /// later from the swarm; watch [`TransferHandle::metadata_ready`].
    fn add_magnet(&self, magnet: &MagnetRef) -> Result<Self::Transfer, EngineError>;

    /// All live transfers, in registration order.
    fn transfers(&self) -> Vec<Self::Transfer>;

    /// Looks up a live transfer by content hash.
    fn transfer(&self, hash: &InfoHash) -> Option<Self::Transfer>;

    /// Peer addresses the engine has banned for misbehavior.
    fn banned_peer_addrs(&self) -> Vec<IpAddr>;

    /// Stops the engine. Transfers are expected to be shut down first.
    fn close(&self);
}

/// One transfer inside an engine. Handles are cheap to clone and stay
/// valid observers after the transfer is shut down.
pub trait TransferHandle: Clone {
    fn info_hash(&self) -> InfoHash;

    /// Full metadata, once known. `None` for an unresolved magnet.
    fn metainfo(&self) -> Option<Metainfo>;

    /// Flips to `true` when metadata becomes available and stays there.
    fn metadata_ready(&self) -> watch::Receiver<bool>;

    fn counters(&self) -> TransferCounters;

    fn bytes_completed(&self) -> u64;

    fn total_length(&self) -> u64;

    fn connected_peers(&self) -> Vec<PeerId>;

    fn is_complete(&self) -> bool;

    fn allow_data_download(&self);

    fn allow_data_upload(&self);

    /// Asks the engine to drop the transfer. Teardown finishes in the
    /// background; [`TransferHandle::closed`] signals completion.
    fn shut_down(&self);

    /// Flips to `true` once the engine has fully released the transfer.
    fn closed(&self) -> watch::Receiver<bool>;
}
