// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory engine used to exercise the session layer in tests.
//!
//! Behaves like a real backend at the trait surface (additive
//! registration, watch-signalled metadata and teardown) while exposing
//! knobs to script swarm events: metadata arrival, counter movement,
//! peer churn and deferred teardown.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rand::RngCore;
use tokio::sync::watch;

use super::{PeerId, SwarmEngine, TransferCounters, TransferHandle, PEER_ID_LEN};
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::metainfo::{InfoHash, MagnetRef, Metainfo};

pub(crate) struct SimEngine {
    peer_id: PeerId,
    transfers: Mutex<Vec<SimTransfer>>,
    banned: Mutex<Vec<IpAddr>>,
    closed: AtomicBool,
    manual_teardown: AtomicBool,
}

#[derive(Clone)]
pub(crate) struct SimTransfer {
    shared: Arc<SimShared>,
}

struct SimShared {
    hash: InfoHash,
    // When set, shut_down leaves the closed signal to confirm_teardown.
    manual_teardown: bool,
    state: Mutex<SimState>,
    ready_tx: watch::Sender<bool>,
    closed_tx: watch::Sender<bool>,
}

#[derive(Default)]
struct SimState {
    metainfo: Option<Metainfo>,
    counters: TransferCounters,
    completed: u64,
    length: u64,
    peers: Vec<PeerId>,
    complete: bool,
    dropped: bool,
    download_enables: u32,
    upload_enables: u32,
}

impl SimTransfer {
    fn new(hash: InfoHash, metainfo: Option<Metainfo>, manual_teardown: bool) -> Self {
        let length = metainfo
            .as_ref()
            .map(|m| m.info.total_length().max(0) as u64)
            .unwrap_or(0);
        let ready = metainfo.is_some();
        let state = SimState {
            metainfo,
            length,
            ..SimState::default()
        };
        SimTransfer {
            shared: Arc::new(SimShared {
                hash,
                manual_teardown,
                state: Mutex::new(state),
                ready_tx: watch::channel(ready).0,
                closed_tx: watch::channel(false).0,
            }),
        }
    }

    fn is_dropped(&self) -> bool {
        self.shared.state.lock().unwrap().dropped
    }
}

impl TransferHandle for SimTransfer {
    fn info_hash(&self) -> InfoHash {
        self.shared.hash
    }

    fn metainfo(&self) -> Option<Metainfo> {
        self.shared.state.lock().unwrap().metainfo.clone()
    }

    fn metadata_ready(&self) -> watch::Receiver<bool> {
        self.shared.ready_tx.subscribe()
    }

    fn counters(&self) -> TransferCounters {
        self.shared.state.lock().unwrap().counters
    }

    fn bytes_completed(&self) -> u64 {
        self.shared.state.lock().unwrap().completed
    }

    fn total_length(&self) -> u64 {
        self.shared.state.lock().unwrap().length
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        self.shared.state.lock().unwrap().peers.clone()
    }

    fn is_complete(&self) -> bool {
        self.shared.state.lock().unwrap().complete
    }

    fn allow_data_download(&self) {
        self.shared.state.lock().unwrap().download_enables += 1;
    }

    fn allow_data_upload(&self) {
        self.shared.state.lock().unwrap().upload_enables += 1;
    }

    fn shut_down(&self) {
        self.shared.state.lock().unwrap().dropped = true;
        if !self.shared.manual_teardown {
            self.shared.closed_tx.send_replace(true);
        }
    }

    fn closed(&self) -> watch::Receiver<bool> {
        self.shared.closed_tx.subscribe()
    }
}

impl SwarmEngine for SimEngine {
    type Transfer = SimTransfer;

    fn start(config: EngineConfig) -> Result<Self, EngineError> {
        let peer_id = config.peer_id.unwrap_or_else(|| {
            let mut bytes = [0u8; PEER_ID_LEN];
            rand::rng().fill_bytes(&mut bytes);
            PeerId(bytes)
        });
        Ok(SimEngine {
            peer_id,
            transfers: Mutex::new(Vec::new()),
            banned: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            manual_teardown: AtomicBool::new(false),
        })
    }

    fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    fn add_metainfo(&self, metainfo: Metainfo) -> Result<SimTransfer, EngineError> {
        let hash = metainfo.info_hash();
        let mut transfers = self.transfers.lock().unwrap();
        if let Some(existing) = transfers
            .iter()
            .find(|t| t.info_hash() == hash && !t.is_dropped())
        {
            return Ok(existing.clone());
        }
        let transfer = SimTransfer::new(
            hash,
            Some(metainfo),
            self.manual_teardown.load(Ordering::SeqCst),
        );
        transfers.push(transfer.clone());
        Ok(transfer)
    }

    fn add_magnet(&self, magnet: &MagnetRef) -> Result<SimTransfer, EngineError> {
        let mut transfers = self.transfers.lock().unwrap();
        if let Some(existing) = transfers
            .iter()
            .find(|t| t.info_hash() == magnet.info_hash && !t.is_dropped())
        {
            return Ok(existing.clone());
        }
        let transfer = SimTransfer::new(
            magnet.info_hash,
            None,
            self.manual_teardown.load(Ordering::SeqCst),
        );
        transfers.push(transfer.clone());
        Ok(transfer)
    }

    fn transfers(&self) -> Vec<SimTransfer> {
        self.transfers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.is_dropped())
            .cloned()
            .collect()
    }

    fn transfer(&self, hash: &InfoHash) -> Option<SimTransfer> {
        self.transfers
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.info_hash() == *hash && !t.is_dropped())
            .cloned()
    }

    fn banned_peer_addrs(&self) -> Vec<IpAddr> {
        self.banned.lock().unwrap().clone()
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// Tests that hand an engine to a client or a spawned task keep a second
// handle through this impl.
impl SwarmEngine for Arc<SimEngine> {
    type Transfer = SimTransfer;

    fn start(config: EngineConfig) -> Result<Self, EngineError> {
        SimEngine::start(config).map(Arc::new)
    }

    fn peer_id(&self) -> PeerId {
        (**self).peer_id()
    }

    fn add_metainfo(&self, metainfo: Metainfo) -> Result<SimTransfer, EngineError> {
        (**self).add_metainfo(metainfo)
    }

    fn add_magnet(&self, magnet: &MagnetRef) -> Result<SimTransfer, EngineError> {
        (**self).add_magnet(magnet)
    }

    fn transfers(&self) -> Vec<SimTransfer> {
        (**self).transfers()
    }

    fn transfer(&self, hash: &InfoHash) -> Option<SimTransfer> {
        (**self).transfer(hash)
    }

    fn banned_peer_addrs(&self) -> Vec<IpAddr> {
        (**self).banned_peer_addrs()
    }

    fn close(&self) {
        (**self).close()
    }
}

impl SimEngine {
    /// Transfers registered from now on only signal closed once
    /// [`SimEngine::confirm_teardown`] runs.
    pub(crate) fn set_manual_teardown(&self, on: bool) {
        self.manual_teardown.store(on, Ordering::SeqCst);
    }

    pub(crate) fn confirm_teardown(&self, hash: &InfoHash) {
        let transfer = self.find_any(hash);
        transfer.shared.closed_tx.send_replace(true);
    }

    pub(crate) fn deliver_metainfo(&self, hash: &InfoHash, metainfo: Metainfo) {
        let transfer = self.find_any(hash);
        {
            let mut state = transfer.shared.state.lock().unwrap();
            state.length = metainfo.info.total_length().max(0) as u64;
            state.metainfo = Some(metainfo);
        }
        transfer.shared.ready_tx.send_replace(true);
    }

    pub(crate) fn set_counters(&self, hash: &InfoHash, counters: TransferCounters) {
        self.find_any(hash).shared.state.lock().unwrap().counters = counters;
    }

    pub(crate) fn set_progress(&self, hash: &InfoHash, completed: u64, length: u64) {
        let transfer = self.find_any(hash);
        let mut state = transfer.shared.state.lock().unwrap();
        state.completed = completed;
        state.length = length;
    }

    pub(crate) fn mark_complete(&self, hash: &InfoHash) {
        let transfer = self.find_any(hash);
        let mut state = transfer.shared.state.lock().unwrap();
        state.complete = true;
        state.completed = state.length;
    }

    pub(crate) fn add_peer(&self, hash: &InfoHash, peer: PeerId) {
        self.find_any(hash).shared.state.lock().unwrap().peers.push(peer);
    }

    pub(crate) fn ban_addr(&self, addr: IpAddr) {
        self.banned.lock().unwrap().push(addr);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn download_enables(&self, hash: &InfoHash) -> u32 {
        self.find_any(hash).shared.state.lock().unwrap().download_enables
    }

    pub(crate) fn upload_enables(&self, hash: &InfoHash) -> u32 {
        self.find_any(hash).shared.state.lock().unwrap().upload_enables
    }

    // Lookup that still sees dropped transfers.
    fn find_any(&self, hash: &InfoHash) -> SimTransfer {
        self.transfers
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.info_hash() == *hash)
            .cloned()
            .expect("transfer not registered")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_engine_config;

    #[test]
    fn registration_is_additive() {
        let engine = SimEngine::start(default_engine_config()).unwrap();
        let hash = InfoHash([3u8; 20]);
        let magnet = MagnetRef::new(hash, &[]);

        let first = engine.add_magnet(&magnet).unwrap();
        let second = engine.add_magnet(&magnet).unwrap();
        first.allow_data_download();
        assert_eq!(second.shared.state.lock().unwrap().download_enables, 1);
        assert_eq!(engine.transfers().len(), 1);
    }

    #[test]
    fn manual_teardown_defers_the_closed_signal() {
        let engine = SimEngine::start(default_engine_config()).unwrap();
        engine.set_manual_teardown(true);
        let hash = InfoHash([4u8; 20]);
        let transfer = engine.add_magnet(&MagnetRef::new(hash, &[])).unwrap();

        transfer.shut_down();
        assert!(!*transfer.closed().borrow());
        assert!(engine.transfer(&hash).is_none());

        engine.confirm_teardown(&hash);
        assert!(*transfer.closed().borrow());
    }

    #[test]
    fn immediate_teardown_signals_closed() {
        let engine = SimEngine::start(default_engine_config()).unwrap();
        let hash = InfoHash([5u8; 20]);
        let transfer = engine.add_magnet(&MagnetRef::new(hash, &[])).unwrap();

        transfer.shut_down();
        assert!(*transfer.closed().borrow());
    }
}
