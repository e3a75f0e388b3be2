// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persistent node identity.
//!
//! The engine's peer id is minted on first start and pinned in a small
//! embedded database so the node keeps one identity across restarts.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::engine::PeerId;
use crate::errors::IdentityError;

const IDENTITY_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("bittorrent_info");
const PEER_ID_KEY: &str = "peer_id";

pub struct IdentityStore {
    db: Database,
}

impl IdentityStore {
    /// Opens (or creates) the identity database at `path`.
    pub fn open(path: &Path) -> Result<Self, IdentityError> {
        let db = Database::create(path).map_err(|e| IdentityError::Open(e.into()))?;
        let txn = db
            .begin_write()
            .map_err(|e| IdentityError::Open(e.into()))?;
        {
            txn.open_table(IDENTITY_TABLE)
                .map_err(|e| IdentityError::Open(e.into()))?;
        }
        txn.commit().map_err(|e| IdentityError::Open(e.into()))?;
        Ok(IdentityStore { db })
    }

    /// Returns the stored peer id, or `None` when no usable id is
    /// present. A value of the wrong length counts as absent.
    pub fn read(&self) -> Result<Option<PeerId>, IdentityError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| IdentityError::Read(e.into()))?;
        let table = txn
            .open_table(IDENTITY_TABLE)
            .map_err(|e| IdentityError::Read(e.into()))?;
        let Some(guard) = table
            .get(PEER_ID_KEY)
            .map_err(|e| IdentityError::Read(e.into()))?
        else {
            return Ok(None);
        };
        Ok(PeerId::try_from_slice(guard.value()))
    }

    pub fn save(&self, peer_id: &PeerId) -> Result<(), IdentityError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| IdentityError::Save(e.into()))?;
        {
            let mut table = txn
                .open_table(IDENTITY_TABLE)
                .map_err(|e| IdentityError::Save(e.into()))?;
            table
                .insert(PEER_ID_KEY, peer_id.as_bytes().as_slice())
                .map_err(|e| IdentityError::Save(e.into()))?;
        }
        txn.commit().map_err(|e| IdentityError::Save(e.into()))?;
        Ok(())
    }
}
