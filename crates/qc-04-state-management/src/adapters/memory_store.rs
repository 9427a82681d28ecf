use crate::domain::{RegisterState, StoreError};
use crate::ports::RegisterStore;
use parking_lot::RwLock;
use shared_types::Address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// In-memory implementation of [`RegisterStore`] for testing and tooling.
///
/// Counts reads and writes so callers can assert which paths touched the
/// store, and can be told to fail writes to exercise error propagation.
#[derive(Debug, Default)]
pub struct InMemoryRegisterStore {
    registers: RwLock<HashMap<Address, RegisterState>>,
    reads: AtomicU64,
    writes: AtomicU64,
    fail_writes: AtomicBool,
}

impl InMemoryRegisterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a register without counting a write.
    pub fn insert(&self, address: Address, state: RegisterState) {
        self.registers.write().insert(address, state);
    }

    /// Current state without counting a read.
    pub fn get(&self, address: &Address) -> Option<RegisterState> {
        self.registers.read().get(address).cloned()
    }

    pub fn len(&self) -> usize {
        self.registers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.read().is_empty()
    }

    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Make every subsequent write fail with [`StoreError::Unavailable`].
    pub fn set_write_failure(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }
}

impl RegisterStore for InMemoryRegisterStore {
    fn read(&self, address: &Address) -> Result<Option<RegisterState>, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.registers.read().get(address).cloned())
    }

    fn write(&self, address: &Address, state: &RegisterState) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable);
        }
        self.registers.write().insert(*address, state.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
