//! # Register Operations Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | checksum | canonical encode + BLAKE3 of one account state |
//! | build | BUILD pass: store read, debit, embed pre-state and checksum |
//! | check | MEMPOOL pass over a built stream |
//! | commit | leased pre-pass + WRITE pass |
//! | batch | `check_transactions`, sequential vs. rayon |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qc_04_state_management::{Account, InMemoryRegisterStore, RegisterObject, RegisterState};
use qc_11_register_operations::prelude::*;
use shared_types::{Address, AddressKind};
use std::time::Duration;

const OWNER: Address = Address::new([0xA1; 32]);

fn account_address(seed: u8) -> Address {
    Address::tagged(AddressKind::Account, [seed; 32]).unwrap()
}

fn account(balance: u64) -> RegisterState {
    RegisterState::new(
        OWNER,
        1,
        &RegisterObject::from(Account {
            token: Address::ZERO,
            balance,
        }),
    )
    .unwrap()
}

fn service(registers: u8) -> RegisterOperationService<InMemoryRegisterStore> {
    let service = create_test_service();
    for seed in 0..registers {
        service
            .controller()
            .store()
            .insert(account_address(seed), account(u64::MAX / 2));
    }
    service
}

fn debits(operations: u8, timestamp: u64) -> Transaction {
    (0..operations).fold(Transaction::new(OWNER, timestamp), |tx, seed| {
        tx.with_operation(Operation::debit(account_address(seed), Address::ZERO, 1))
    })
}

fn bench_checksum(c: &mut Criterion) {
    let state = account(1_000);
    c.bench_function("register_state_checksum", |b| {
        b.iter(|| black_box(state.checksum().unwrap()))
    });
}

fn bench_transaction_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11-register-operations");
    group.measurement_time(Duration::from_secs(5));

    for operations in [1u8, 8, 32] {
        let service = service(operations);
        group.throughput(Throughput::Elements(u64::from(operations)));

        group.bench_with_input(BenchmarkId::new("build", operations), &operations, |b, &n| {
            b.iter(|| {
                let mut tx = debits(n, 2);
                service.build_transaction(&mut tx).unwrap();
                black_box(tx)
            })
        });

        let mut built = debits(operations, 2);
        service.build_transaction(&mut built).unwrap();

        group.bench_with_input(BenchmarkId::new("check", operations), &built, |b, tx| {
            b.iter(|| service.check_transaction(black_box(tx)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("commit", operations), &operations, |b, &n| {
            let mut timestamp = 2;
            b.iter(|| {
                // Each commit supersedes the last, so rebuild on current state.
                timestamp += 1;
                let mut tx = debits(n, timestamp);
                service.build_transaction(&mut tx).unwrap();
                service.commit_transaction(&tx).unwrap();
            })
        });
    }
    group.finish();
}

fn bench_mempool_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("mempool-batch");
    let service = service(4);
    let batch: Vec<Transaction> = (0..256)
        .map(|i| {
            let mut tx = debits(4, i + 2);
            service.build_transaction(&mut tx).unwrap();
            tx
        })
        .collect();

    group.throughput(Throughput::Elements(batch.len() as u64));
    group.bench_function("sequential", |b| {
        b.iter(|| {
            for tx in &batch {
                service.check_transaction(black_box(tx)).unwrap();
            }
        })
    });
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(service.check_transactions(&batch)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_checksum,
    bench_transaction_paths,
    bench_mempool_batch
);
criterion_main!(benches);
