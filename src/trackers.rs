// SPDX-FileCopyrightText: 2026 The snapswarm Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Canonical announce endpoints for snapshot swarms.

/// Announce tiers applied to every transfer this node registers, replacing
/// whatever a descriptor file carries. Callers thread this (or a substitute)
/// through the resolver explicitly; nothing reads it implicitly.
pub fn default_trackers() -> Vec<Vec<String>> {
    vec![
        vec![
            "udp://tracker.opentrackr.org:1337/announce".to_string(),
            "udp://tracker.openbittorrent.com:6969/announce".to_string(),
        ],
        vec![
            "udp://tracker.torrent.eu.org:451/announce".to_string(),
            "udp://open.stealth.si:80/announce".to_string(),
        ],
    ]
}
