//! # Register Leases
//!
//! Per-register mutual exclusion for the read-modify-write a committing
//! operation performs against the store.
//!
//! A [`RegisterLease`] is a capability: holding one proves exclusive access
//! to every address it covers. Leases are acquired all-at-once (a caller
//! waits until none of the requested addresses is held) so two transactions
//! touching overlapping register sets can never deadlock. Dropping the lease
//! releases every address and wakes waiters.

use parking_lot::{Condvar, Mutex};
use shared_types::Address;
use std::collections::{BTreeSet, HashSet};
use tracing::trace;

/// Grants [`RegisterLease`]s.
#[derive(Debug, Default)]
pub struct LeaseManager {
    held: Mutex<HashSet<Address>>,
    released: Condvar,
}

impl LeaseManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire every address in `addresses`, blocking until all are free.
    pub fn acquire<I>(&self, addresses: I) -> RegisterLease<'_>
    where
        I: IntoIterator<Item = Address>,
    {
        let addresses: BTreeSet<Address> = addresses.into_iter().collect();
        let mut held = self.held.lock();
        while addresses.iter().any(|address| held.contains(address)) {
            self.released.wait(&mut held);
        }
        held.extend(addresses.iter().copied());
        trace!(count = addresses.len(), "register lease acquired");

        RegisterLease {
            manager: self,
            addresses,
        }
    }

    /// Acquire every address in `addresses` only if all are free right now.
    pub fn try_acquire<I>(&self, addresses: I) -> Option<RegisterLease<'_>>
    where
        I: IntoIterator<Item = Address>,
    {
        let addresses: BTreeSet<Address> = addresses.into_iter().collect();
        let mut held = self.held.lock();
        if addresses.iter().any(|address| held.contains(address)) {
            return None;
        }
        held.extend(addresses.iter().copied());

        Some(RegisterLease {
            manager: self,
            addresses,
        })
    }

    pub fn is_held(&self, address: &Address) -> bool {
        self.held.lock().contains(address)
    }

    /// Number of addresses currently leased.
    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }

    fn release(&self, addresses: &BTreeSet<Address>) {
        let mut held = self.held.lock();
        for address in addresses {
            held.remove(address);
        }
        drop(held);
        self.released.notify_all();
        trace!(count = addresses.len(), "register lease released");
    }
}

/// Exclusive access to a set of register addresses, released on drop.
#[derive(Debug)]
pub struct RegisterLease<'a> {
    manager: &'a LeaseManager,
    addresses: BTreeSet<Address>,
}

impl RegisterLease<'_> {
    /// True if this lease grants exclusive access to `address`.
    pub fn covers(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.addresses.iter()
    }
}

impl Drop for RegisterLease<'_> {
    fn drop(&mut self) {
        self.manager.release(&self.addresses);
    }
}
