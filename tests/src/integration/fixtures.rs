//! Shared genesis state and helpers.

use qc_04_state_management::{
    Account, InMemoryRegisterStore, RegisterObject, RegisterState, RegisterStore,
};
use qc_11_register_operations::prelude::*;
use shared_types::{Address, AddressKind, Timestamp};

pub const ALICE_KEY: Address = Address::new([0xA1; 32]);
pub const BOB_KEY: Address = Address::new([0xB2; 32]);
pub const GENESIS_TIME: Timestamp = 1_700_000_000;

/// Account register address derived from a one-byte seed.
pub fn account_address(seed: u8) -> Address {
    Address::tagged(AddressKind::Account, [seed; 32]).unwrap_or(Address::ZERO)
}

pub fn alice_account() -> Address {
    account_address(0x01)
}

pub fn alice_savings() -> Address {
    account_address(0x02)
}

pub fn bob_account() -> Address {
    account_address(0x03)
}

pub fn account_state(owner: Address, balance: u64) -> RegisterState {
    let object = RegisterObject::from(Account {
        token: Address::ZERO,
        balance,
    });
    match RegisterState::new(owner, GENESIS_TIME, &object) {
        Ok(state) => state,
        Err(err) => panic!("genesis account must encode: {err}"),
    }
}

/// Genesis: Alice holds 1000 in her account and 0 in savings, Bob holds 500.
pub fn genesis() -> Vec<(Address, RegisterState)> {
    vec![
        (alice_account(), account_state(ALICE_KEY, 1_000)),
        (alice_savings(), account_state(ALICE_KEY, 0)),
        (bob_account(), account_state(BOB_KEY, 500)),
    ]
}

/// Write genesis through the store port.
pub fn seed<S: RegisterStore>(store: &S) {
    for (address, state) in genesis() {
        if let Err(err) = store.write(&address, &state) {
            panic!("seeding genesis failed: {err}");
        }
    }
}

/// A node: a service over an in-memory store holding genesis. Seeding is
/// not counted as a write.
pub fn node() -> RegisterOperationService<InMemoryRegisterStore> {
    let store = InMemoryRegisterStore::new();
    for (address, state) in genesis() {
        store.insert(address, state);
    }
    match RegisterOperationService::new(store, ServiceConfig::default()) {
        Ok(service) => service,
        Err(err) => panic!("default configuration must be valid: {err}"),
    }
}

pub fn balance_of<S: RegisterStore>(
    service: &RegisterOperationService<S>,
    address: Address,
) -> u64 {
    service
        .controller()
        .store()
        .read(&address)
        .ok()
        .flatten()
        .and_then(|state| state.object().ok())
        .and_then(|object| object.balance())
        .unwrap_or_default()
}

/// Alice moves `amount` from her account to her savings.
pub fn alice_saves(amount: u64, timestamp: Timestamp) -> Transaction {
    Transaction::new(ALICE_KEY, timestamp)
        .with_operation(Operation::debit(alice_account(), alice_savings(), amount))
        .with_operation(Operation::credit(alice_savings(), alice_account(), amount))
}

/// Bob debits `amount` from his account.
pub fn bob_spends(amount: u64, timestamp: Timestamp) -> Transaction {
    Transaction::new(BOB_KEY, timestamp)
        .with_operation(Operation::debit(bob_account(), alice_account(), amount))
}

/// Install a quiet subscriber so `RUST_LOG=debug` shows controller events.
pub fn init_test_logging() {
    let config = LoggingConfig {
        log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        ..LoggingConfig::default()
    };
    let _ = init_logging(&config);
}
