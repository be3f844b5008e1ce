// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port allocation within a fixed range, shared across spawns by a single
//! mutex. Bookkeeping alone can't guarantee a port is bindable (something
//! outside the supervisor's own tracking may already hold it), so
//! `allocate` narrows the TOCTOU window with a bind-then-close probe on
//! loopback before handing a port out; a bind refusal there just moves on
//! to the next candidate rather than failing the whole call. The child
//! itself can still lose a race after that — callers treat a subsequent
//! bind failure as an ordinary spawn failure and retry with a fresh port.

use crate::error::SpawnError;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::net::TcpListener;
use std::ops::RangeInclusive;

pub struct PortAllocator {
    range: RangeInclusive<u16>,
    taken: Mutex<BTreeSet<u16>>,
}

impl PortAllocator {
    pub fn new(range: RangeInclusive<u16>) -> Self {
        Self { range, taken: Mutex::new(BTreeSet::new()) }
    }

    pub fn allocate(&self) -> Result<u16, SpawnError> {
        let mut taken = self.taken.lock();
        for port in self.range.clone() {
            if taken.contains(&port) {
                continue;
            }
            if probe_bindable(port) {
                taken.insert(port);
                return Ok(port);
            }
        }
        Err(SpawnError::PortsExhausted)
    }

    pub fn release(&self, port: u16) {
        self.taken.lock().remove(&port);
    }

    /// Whether any port in the range is administratively free, without
    /// actually reserving one. Used by the manager to fail a `Launch` with
    /// `ResourceExhausted` up front rather than quietly queuing a retry
    /// loop against a range that has no capacity at all.
    pub fn has_capacity(&self) -> bool {
        let taken = self.taken.lock();
        self.range.clone().any(|port| !taken.contains(&port))
    }
}

fn probe_bindable(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_distinct_ports_in_range() {
        let allocator = PortAllocator::new(50100..=50102);
        let a = allocator.allocate().unwrap();
        let b = allocator.allocate().unwrap();
        let c = allocator.allocate().unwrap();
        assert_eq!([a, b, c].iter().collect::<std::collections::HashSet<_>>().len(), 3);
    }

    #[test]
    fn exhausts_and_recovers_after_release() {
        let allocator = PortAllocator::new(50100..=50100);
        let a = allocator.allocate().unwrap();
        assert!(allocator.allocate().is_err());
        allocator.release(a);
        assert!(allocator.allocate().is_ok());
    }
}
