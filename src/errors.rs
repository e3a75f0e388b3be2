// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use thiserror::Error;

use crate::metainfo::ParseError;

/// Errors raised by the on-disk file layout used for verification reads.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by a swarm engine implementation behind the
/// [`SwarmEngine`](crate::engine::SwarmEngine) trait.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("engine start failed: {0}")]
    Start(String),
    #[error("transfer registration failed: {0}")]
    Registration(String),
}

/// Errors from the persistent peer identity store. Each variant carries the
/// operation that failed against the underlying database.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("open peer id store: {0}")]
    Open(#[source] redb::Error),
    #[error("get peer id: {0}")]
    Read(#[source] redb::Error),
    #[error("save peer id: {0}")]
    Save(#[source] redb::Error),
}

/// Startup errors from [`SwarmClient::new`](crate::client::SwarmClient::new).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("start swarm engine: {0}")]
    EngineStart(#[source] EngineError),
}

/// Errors from the transfer resolver. `Cancelled` is returned promptly when
/// the shutdown signal fires inside one of the resolver loops.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("list descriptor files: {0}")]
    List(#[source] std::io::Error),
    #[error("load descriptor file {}: {source}", path.display())]
    Load { path: PathBuf, source: ParseError },
    #[error("write descriptor file {}: {source}", path.display())]
    Persist { path: PathBuf, source: ParseError },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("resolve interrupted")]
    Cancelled,
}

/// Errors from the verification pass. A `Mismatch` is terminal: one bad
/// piece invalidates the whole run and is left for external remediation.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("list descriptor files: {0}")]
    List(#[source] std::io::Error),
    #[error("load descriptor file {}: {source}", path.display())]
    Load { path: PathBuf, source: ParseError },
    #[error("piece {piece} of {} failed hash check", path.display())]
    Mismatch { piece: u32, path: PathBuf },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("verification interrupted")]
    Cancelled,
}
