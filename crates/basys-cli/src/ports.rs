// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Free-port probing for the development session.
//!
//! The configured ports are starting points, not reservations: if another
//! process holds one, the session takes the next free port and patches the
//! resolved configuration in place.

use std::io;
use std::net::TcpListener;

/// How many consecutive ports to try before giving up.
const PROBE_RANGE: u16 = 1000;

/// Finds the first free port at or above `start` on `host`.
pub fn find_free_port(host: &str, start: u16) -> io::Result<u16> {
    let end = start.saturating_add(PROBE_RANGE);
    for port in start..=end {
        if TcpListener::bind((host, port)).is_ok() {
            return Ok(port);
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AddrInUse,
        format!("no free port between {start} and {end} on {host}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_start_when_free() {
        // Bind to an ephemeral port first so we know a concrete free one.
        let probe = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let free = probe.local_addr().unwrap().port();
        drop(probe);

        assert_eq!(find_free_port("127.0.0.1", free).unwrap(), free);
    }

    #[test]
    fn test_skips_occupied_port() {
        let held = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let taken = held.local_addr().unwrap().port();

        let found = find_free_port("127.0.0.1", taken).unwrap();
        assert!(found > taken);
    }
}
