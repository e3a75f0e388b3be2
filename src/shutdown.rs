// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cooperative shutdown signalling.
//!
//! Long-running operations subscribe to one broadcast channel and either
//! select on `recv()` at suspension points or poll [`interrupted`] inside
//! tight loops.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// Non-blocking shutdown check for poll-style loops. Any message on the
/// channel, a lagged subscription, and a dropped sender all count as
/// shutdown.
pub fn interrupted(shutdown_rx: &mut broadcast::Receiver<()>) -> bool {
    match shutdown_rx.try_recv() {
        Ok(()) => true,
        Err(TryRecvError::Closed | TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) => false,
    }
}
