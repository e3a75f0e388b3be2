// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Client lifecycle around a swarm engine.

use crate::config::EngineConfig;
use crate::engine::{PeerId, SwarmEngine, TransferHandle};
use crate::errors::ClientError;
use crate::identity::IdentityStore;
use crate::metainfo::InfoHash;

/// Owns a running engine and ties it to the persistent node identity.
pub struct SwarmClient<E: SwarmEngine> {
    engine: E,
}

impl<E: SwarmEngine> SwarmClient<E> {
    /// Starts the engine under the identity pinned in `identity`. On a
    /// first run the engine mints an id and it is persisted here, so
    /// every later start announces as the same node.
    pub fn new(mut config: EngineConfig, identity: &IdentityStore) -> Result<Self, ClientError> {
        let stored = identity.read()?;
        config.peer_id = stored;
        let engine = E::start(config).map_err(ClientError::EngineStart)?;
        if stored.is_none() {
            identity.save(&engine.peer_id())?;
        }
        Ok(SwarmClient { engine })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn peer_id(&self) -> PeerId {
        self.engine.peer_id()
    }

    /// Drops one transfer and blocks until the engine confirms the
    /// teardown. Unknown hashes are a no-op.
    pub async fn stop_seeding(&self, hash: &InfoHash) {
        let Some(transfer) = self.engine.transfer(hash) else {
            return;
        };
        let mut closed = transfer.closed();
        transfer.shut_down();
        // Err means the engine dropped the channel, teardown included.
        let _ = closed.wait_for(|closed| *closed).await;
    }

    /// Shuts down every transfer, then the engine itself.
    pub fn close(self) {
        for transfer in self.engine.transfers() {
            transfer.shut_down();
        }
        self.engine.close();
    }
}
